//! In-memory GPIO backend that records every write instead of driving hardware.
//!
//! Used by the test suites and by the dry-run mode of the demo. Claim rules are the same as for
//! [GpiodDriver](crate::gpiod::GpiodDriver), so pin conflicts surface the same way.
use crate::lcd::hd44780::{BusWord, LcdPins};
use crate::{GpioDriver, GpioError, GpioOutput, GpioResult};
use bitvec::vec::BitVec;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::AtomicU8;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A single recorded level change, in program order.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PinWrite {
    pub pin: usize,
    pub level: bool,
}

pub struct MockGpioDriver {
    lines: usize,
    used_pins: BitVec<AtomicU8>,
    log: Mutex<Vec<PinWrite>>,
}

impl MockGpioDriver {
    pub fn new(lines: usize) -> Self {
        Self {
            lines,
            used_pins: BitVec::repeat(false, lines),
            log: Mutex::new(Vec::new()),
        }
    }

    fn log(&self) -> MutexGuard<'_, Vec<PinWrite>> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a snapshot of every write recorded so far.
    pub fn writes(&self) -> Vec<PinWrite> {
        self.log().clone()
    }

    /// Forgets all recorded writes. Claimed pins stay claimed.
    pub fn clear(&self) {
        self.log().clear();
    }

    /// Last level written to the pin, if it was ever written.
    pub fn level(&self, pin: usize) -> Option<bool> {
        self.log()
            .iter()
            .rev()
            .find(|write| write.pin == pin)
            .map(|write| write.level)
    }

    /// Replays the log and returns the bus word latched on every rising edge of the enable pin.
    pub fn transactions(&self, pins: &LcdPins) -> Vec<BusWord> {
        let mut levels = vec![false; self.lines];
        let mut words = Vec::new();

        for write in self.log().iter() {
            let rising = write.pin == pins.e && write.level && !levels[write.pin];
            levels[write.pin] = write.level;
            if !rising {
                continue;
            }

            let mut data = 0u8;
            for (bit, &pin) in pins.data.iter().enumerate() {
                if levels[pin] {
                    data |= 1 << bit;
                }
            }
            words.push(BusWord {
                register_select: levels[pins.rs],
                read_write: levels[pins.rw],
                data,
            });
        }

        words
    }
}

impl Debug for MockGpioDriver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "MockGpioDriver({})", self.lines)
    }
}

impl GpioDriver for MockGpioDriver {
    fn count(&self) -> GpioResult<usize> {
        Ok(self.lines)
    }

    fn get_output(&self, index: usize) -> GpioResult<Box<dyn GpioOutput + '_>> {
        if index >= self.lines {
            return Err(GpioError::InvalidArgument);
        }

        if self.used_pins[index] {
            return Err(GpioError::AlreadyInUse);
        }

        self.used_pins.set_aliased(index, true);

        Ok(Box::new(MockOutput {
            driver: self,
            pin_index: index,
        }))
    }
}

struct MockOutput<'a> {
    driver: &'a MockGpioDriver,
    pin_index: usize,
}

impl Debug for MockOutput<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}[{}][output]", self.driver, self.pin_index)
    }
}

impl GpioOutput for MockOutput<'_> {
    fn write(&self, value: bool) -> GpioResult<()> {
        self.driver.log().push(PinWrite {
            pin: self.pin_index,
            level: value,
        });
        Ok(())
    }
}

impl Drop for MockOutput<'_> {
    fn drop(&mut self) {
        self.driver.used_pins.set_aliased(self.pin_index, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_are_exclusive_until_dropped() {
        let gpio = MockGpioDriver::new(4);
        let out = gpio.get_output(2).unwrap();
        assert_eq!(gpio.get_output(2).unwrap_err(), GpioError::AlreadyInUse);
        drop(out);
        assert!(gpio.get_output(2).is_ok());
    }

    #[test]
    fn out_of_range_pin_is_rejected() {
        let gpio = MockGpioDriver::new(4);
        assert_eq!(gpio.get_output(4).unwrap_err(), GpioError::InvalidArgument);
    }

    #[test]
    fn records_writes_in_order() {
        let gpio = MockGpioDriver::new(4);
        let a = gpio.get_output(0).unwrap();
        let b = gpio.get_output(3).unwrap();
        a.write(true).unwrap();
        b.write(true).unwrap();
        a.write(false).unwrap();

        assert_eq!(
            gpio.writes(),
            vec![
                PinWrite { pin: 0, level: true },
                PinWrite { pin: 3, level: true },
                PinWrite { pin: 0, level: false },
            ]
        );
        assert_eq!(gpio.level(0), Some(false));
        assert_eq!(gpio.level(3), Some(true));
        assert_eq!(gpio.level(1), None);

        gpio.clear();
        assert!(gpio.writes().is_empty());
    }

    #[test]
    fn transactions_latch_on_rising_enable() {
        let pins = LcdPins {
            rs: 0,
            rw: 1,
            e: 2,
            data: [3, 4, 5, 6, 7, 8, 9, 10],
        };
        let gpio = MockGpioDriver::new(11);
        let outputs: Vec<_> = (0..11).map(|i| gpio.get_output(i).unwrap()).collect();

        // RS high, db0 and db6 high: 0x41
        outputs[0].write(true).unwrap();
        outputs[3].write(true).unwrap();
        outputs[9].write(true).unwrap();
        outputs[2].write(true).unwrap();
        // Holding enable high latches nothing new
        outputs[2].write(true).unwrap();
        outputs[2].write(false).unwrap();

        assert_eq!(gpio.transactions(&pins), vec![BusWord::data(0x41)]);
    }
}
