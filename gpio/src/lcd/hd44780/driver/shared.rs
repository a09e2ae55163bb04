use crate::lcd::hd44780::driver::HD44780Driver;
use crate::lcd::hd44780::LcdResult;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// An [HD44780Driver] behind a mutex, for displays written from more than one thread.
///
/// Each call holds the lock for the whole operation, so the bus words of two `write_text` calls
/// never interleave. Use [Self::lock] to run several operations as one unit.
#[derive(Debug)]
pub struct SharedHD44780<D: HD44780Driver> {
    driver: Mutex<D>,
}

impl<D: HD44780Driver> SharedHD44780<D> {
    pub fn new(driver: D) -> Self {
        SharedHD44780 {
            driver: Mutex::new(driver),
        }
    }

    /// Locks the driver. A panic in another holder does not leave the bus half-written, since
    /// every line is set again before each strobe, so a poisoned lock is recovered.
    pub fn lock(&self) -> MutexGuard<'_, D> {
        self.driver.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn into_inner(self) -> D {
        self.driver
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn clear_display(&self) -> LcdResult<()> {
        self.lock().clear_display()
    }

    pub fn return_home(&self) -> LcdResult<()> {
        self.lock().return_home()
    }

    pub fn entry_mode_set(&self, decrement: bool, display_shift: bool) -> LcdResult<()> {
        self.lock().entry_mode_set(decrement, display_shift)
    }

    pub fn display_control(
        &self,
        display_on: bool,
        cursor_on: bool,
        blink_on: bool,
    ) -> LcdResult<()> {
        self.lock().display_control(display_on, cursor_on, blink_on)
    }

    pub fn function_set(
        &self,
        data_length_8bit: bool,
        two_line: bool,
        font_5x10: bool,
    ) -> LcdResult<()> {
        self.lock().function_set(data_length_8bit, two_line, font_5x10)
    }

    pub fn set_ddram_address(&self, address: u8) -> LcdResult<()> {
        self.lock().set_ddram_address(address)
    }

    pub fn write_data(&self, data: u8) -> LcdResult<()> {
        self.lock().write_data(data)
    }

    pub fn write_text(&self, text: &str, two_line: bool) -> LcdResult<()> {
        self.lock().write_text(text, two_line)
    }
}
