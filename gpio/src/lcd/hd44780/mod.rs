//! HD44780 LCD module.
//!
//! Write-only driver for HD44780-family character LCDs wired in 8-bit parallel mode, such as the
//! GFC1602AI 16x2 module. The driver never reads the busy flag, so every command is followed by
//! a fixed settle time (see [driver::Timing]).
//!
//! - [instruction] encodes commands into the bytes latched on the bus.
//! - [charset] maps characters to the code points of the controller's Western European character ROM.
//! - [driver] sequences the bus lines and exposes the high-level operations.

pub mod charset;
pub mod driver;
pub mod instruction;

use crate::GpioError;
pub use driver::*;
pub use instruction::*;
use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum LcdError {
    #[error("DDRAM address {0:#04x} is out of range (0x00..=0x7f)")]
    AddressOutOfRange(u8),
    #[error("character {0:?} has no code point in the character ROM")]
    UnmappedCharacter(char),
    #[error("two-line text output is not implemented")]
    TwoLineNotImplemented,
    #[error("GPIO error: {0}")]
    Gpio(#[from] GpioError),
}

pub type LcdResult<T> = Result<T, LcdError>;
