use crate::lcd::hd44780::driver::{HD44780Driver, Timing};
use crate::lcd::hd44780::{BusWord, LcdResult};
use crate::{GpioDriver, GpioError, GpioOutput, GpioResult};
use log::{debug, trace};
use std::thread::sleep;
use std::time::Duration;

/// Pin numbers of the eleven bus lines.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LcdPins {
    pub rs: usize,
    pub rw: usize,
    pub e: usize,
    /// DB0 first.
    pub data: [usize; 8],
}

impl LcdPins {
    /// Every pin, in the order RS, R/W, E, DB0..DB7.
    pub fn all(&self) -> [usize; 11] {
        let mut pins = [self.rs, self.rw, self.e, 0, 0, 0, 0, 0, 0, 0, 0];
        pins[3..].copy_from_slice(&self.data);
        pins
    }

    /// Checks that no pin number is used twice.
    pub fn validate(&self) -> GpioResult<()> {
        let pins = self.all();
        if pins.iter().enumerate().any(|(i, pin)| pins[..i].contains(pin)) {
            return Err(GpioError::InvalidArgument);
        }
        Ok(())
    }
}

/// HD44780 driver bit-banging an 8-bit parallel bus over GPIO pins.
///
/// All eleven lines are owned by the driver. RS, R/W and the data lines are set before every E
/// pulse, which lasts [Timing::enable_pulse] and is followed by the instruction's settle time.
#[derive(Debug)]
pub struct GpioHD44780Driver<'a> {
    pin_rs: Box<dyn GpioOutput + 'a>,
    pin_rw: Box<dyn GpioOutput + 'a>,
    pin_e: Box<dyn GpioOutput + 'a>,
    /// DB0 first.
    data_bus: [Box<dyn GpioOutput + 'a>; 8],
    timing: Timing,
}

impl<'a> GpioHD44780Driver<'a> {
    /// Claims the pins from `gpio` and configures them as outputs.
    ///
    /// # Errors
    /// - `GpioError::InvalidArgument` if a pin number repeats or is out of range.
    /// - `GpioError::AlreadyInUse` if a pin is claimed elsewhere.
    ///
    /// Pins claimed before a failure are released again.
    pub fn new(gpio: &'a dyn GpioDriver, pins: LcdPins) -> LcdResult<Self> {
        pins.validate()?;

        let pin_rs = gpio.get_output(pins.rs)?;
        let pin_rw = gpio.get_output(pins.rw)?;
        let pin_e = gpio.get_output(pins.e)?;
        let data_bus: Vec<_> = pins
            .data
            .iter()
            .map(|&index| gpio.get_output(index))
            .collect::<GpioResult<_>>()?;
        let data_bus: [_; 8] = data_bus
            .try_into()
            .map_err(|_| GpioError::InvalidArgument)?;

        // E idles low so the first strobe is a clean rising edge.
        pin_e.write(false)?;

        debug!("HD44780 on {:?} @ {:?}", gpio, pins);

        Ok(GpioHD44780Driver {
            pin_rs,
            pin_rw,
            pin_e,
            data_bus,
            timing: Timing::default(),
        })
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    fn pulse_e(&self, settle: Duration) -> GpioResult<()> {
        self.pin_e.write(true)?;
        sleep(self.timing.enable_pulse);
        self.pin_e.write(false)?;
        sleep(settle);
        Ok(())
    }
}

impl HD44780Driver for GpioHD44780Driver<'_> {
    fn transmit(&mut self, word: BusWord, settle: Duration) -> LcdResult<()> {
        trace!("Sending data: {:08b}, RS: {}", word.data, word.register_select);

        self.pin_rs.write(word.register_select)?;
        self.pin_rw.write(word.read_write)?;
        for (pin, level) in self.data_bus.iter().rev().zip(word.data_lines()) {
            pin.write(level)?;
        }

        self.pulse_e(settle)?;
        Ok(())
    }

    fn timing(&self) -> &Timing {
        &self.timing
    }
}
