mod gpio;
mod shared;

use crate::lcd::hd44780::charset;
use crate::lcd::hd44780::{BusWord, CursorDirection, Instruction, LcdError, LcdResult};
pub use gpio::*;
use log::{debug, warn};
pub use shared::*;
use std::fmt::Debug;
use std::time::Duration;

/// Delays used in place of busy flag polling.
///
/// The defaults are well above the worst case in the HD44780 datasheet (37 us per instruction,
/// 1.52 ms for clear and home at 270 kHz), so slow clones work too.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Timing {
    /// How long E is held high.
    pub enable_pulse: Duration,
    /// Settle time after a regular instruction or data write.
    pub instruction: Duration,
    /// Settle time after clear display and return home.
    pub clear_home: Duration,
    /// Wait after the first synchronisation word in [HD44780Driver::init].
    pub power_on: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            enable_pulse: Duration::from_micros(1),
            instruction: Duration::from_millis(1),
            clear_home: Duration::from_millis(2),
            power_on: Duration::from_millis(5),
        }
    }
}

/// Write-only interface to an HD44780 controller.
///
/// Implementations provide [Self::transmit]; every other operation is built on it. Arguments are
/// validated before anything is sent, so a failed call leaves the bus untouched.
pub trait HD44780Driver: Debug {
    /// Asserts RS, R/W and the data lines from `word`, strobes E to latch them and then waits
    /// `settle` before returning.
    fn transmit(&mut self, word: BusWord, settle: Duration) -> LcdResult<()>;

    fn timing(&self) -> &Timing;

    /// Sends an instruction and waits for the controller to execute it.
    fn send_instruction(&mut self, instruction: Instruction) -> LcdResult<()> {
        let settle = instruction.execution_time(self.timing());
        self.transmit(BusWord::instruction(instruction.encode()), settle)
    }

    /// Runs the 8-bit initialization by instruction sequence, for modules whose internal reset
    /// circuit did not run because of a slow power supply rise.
    ///
    /// Leaves the display on, cleared, in one-line 5x8 mode with an incrementing cursor.
    fn init(&mut self) -> LcdResult<()> {
        debug!("Initializing HD44780 in 8-bit mode");
        let sync = BusWord::instruction(
            Instruction::FunctionSet {
                data_length_8bit: true,
                two_line: false,
                font_5x10: false,
            }
            .encode(),
        );
        let timing = *self.timing();
        self.transmit(sync, timing.power_on)?;
        self.transmit(sync, timing.instruction)?;
        self.transmit(sync, timing.instruction)?;

        self.function_set(true, false, false)?;
        self.display_control(false, false, false)?;
        self.clear_display()?;
        self.entry_mode_set(false, false)?;
        self.display_control(true, false, false)
    }

    /// Clears the display and sets the cursor to the home position.
    fn clear_display(&mut self) -> LcdResult<()> {
        self.send_instruction(Instruction::ClearDisplay)
    }

    /// Sets the cursor to the home position and undoes any display shift.
    fn return_home(&mut self) -> LcdResult<()> {
        self.send_instruction(Instruction::ReturnHome)
    }

    /// Sets the cursor movement direction and whether the display shifts on each write.
    fn entry_mode_set(&mut self, decrement: bool, display_shift: bool) -> LcdResult<()> {
        self.send_instruction(Instruction::EntryModeSet {
            decrement,
            display_shift,
        })
    }

    /// Sets the display on/off, cursor on/off, and blinking on/off.
    fn display_control(
        &mut self,
        display_on: bool,
        cursor_on: bool,
        blink_on: bool,
    ) -> LcdResult<()> {
        self.send_instruction(Instruction::DisplayControl {
            display_on,
            cursor_on,
            blink_on,
        })
    }

    /// Moves the cursor or shifts the display.
    fn cursor_shift(&mut self, display_shift: bool, direction: CursorDirection) -> LcdResult<()> {
        self.send_instruction(Instruction::CursorShift {
            display_shift,
            direction,
        })
    }

    /// Sets the interface data length, number of display lines and font.
    fn function_set(
        &mut self,
        data_length_8bit: bool,
        two_line: bool,
        font_5x10: bool,
    ) -> LcdResult<()> {
        self.send_instruction(Instruction::FunctionSet {
            data_length_8bit,
            two_line,
            font_5x10,
        })
    }

    /// Sets the DDRAM address.
    ///
    /// # Errors
    /// - `LcdError::AddressOutOfRange` if `address` is above `0x7f`. Nothing is sent.
    fn set_ddram_address(&mut self, address: u8) -> LcdResult<()> {
        let instruction = Instruction::set_ddram_address(address)
            .inspect_err(|_| warn!("Rejected DDRAM address {:#04x}", address))?;
        self.send_instruction(instruction)
    }

    /// Writes a code point to DDRAM at the current address.
    fn write_data(&mut self, data: u8) -> LcdResult<()> {
        let settle = self.timing().instruction;
        self.transmit(BusWord::data(data), settle)
    }

    /// Clears the display and writes `text` from the first position.
    ///
    /// Every character is resolved before anything is sent, so an unmapped character leaves the
    /// display as it was.
    ///
    /// # Errors
    /// - `LcdError::TwoLineNotImplemented` if `two_line` is set.
    /// - `LcdError::UnmappedCharacter` for the first character without a code point.
    fn write_text(&mut self, text: &str, two_line: bool) -> LcdResult<()> {
        if two_line {
            warn!("Rejected two-line text {:?}", text);
            return Err(LcdError::TwoLineNotImplemented);
        }

        let codes = charset::resolve_str(text)?;
        debug!("Writing {:?} ({} characters)", text, codes.len());

        self.clear_display()?;
        self.set_ddram_address(0)?;
        self.function_set(true, false, false)?;
        self.display_control(true, false, false)?;
        self.entry_mode_set(false, false)?;

        for code in codes {
            self.write_data(code)?;
        }
        Ok(())
    }
}
