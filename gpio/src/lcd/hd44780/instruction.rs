//! HD44780 instruction set and the bus word that carries it.
//!
//! Commands are written as a byte on DB7..DB0 with RS low. In the bit layouts below, fixed bits
//! are `0`/`1` and the letters are the instruction's flags.

use crate::lcd::hd44780::driver::Timing;
use crate::lcd::hd44780::{LcdError, LcdResult};
use std::time::Duration;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CursorDirection {
    /// Moves the cursor to the left after writing data.
    Left,
    /// Moves the cursor to the right after writing data.
    Right,
}

/// A DDRAM address, guaranteed to fit the 7-bit address field.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DdramAddress(u8);

impl DdramAddress {
    pub const MAX: u8 = 0b01111111;

    /// # Errors
    /// - `LcdError::AddressOutOfRange` if `address` is above `0x7f`.
    pub fn new(address: u8) -> LcdResult<Self> {
        if address > Self::MAX {
            return Err(LcdError::AddressOutOfRange(address));
        }
        Ok(DdramAddress(address))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for DdramAddress {
    type Error = LcdError;

    fn try_from(address: u8) -> LcdResult<Self> {
        DdramAddress::new(address)
    }
}

/// Instructions this driver can send to the controller.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Instruction {
    /// Command: `00000001`.
    ClearDisplay,
    /// Command: `0000001?`.
    ReturnHome,
    /// Command: `000001IS`.
    /// `I` is `1` when the address counter increments, i.e. it is the inverse of `decrement`.
    EntryModeSet { decrement: bool, display_shift: bool },
    /// Command: `00001DCB`.
    DisplayControl {
        display_on: bool,
        cursor_on: bool,
        blink_on: bool,
    },
    /// Command: `0001SR??`.
    CursorShift {
        display_shift: bool,
        direction: CursorDirection,
    },
    /// Command: `001DNF??`.
    FunctionSet {
        data_length_8bit: bool,
        two_line: bool,
        font_5x10: bool,
    },
    /// Command: `1AAAAAAA`.
    SetDdramAddress(DdramAddress),
}

impl Instruction {
    /// Builds a DDRAM address instruction, validating the address first.
    pub fn set_ddram_address(address: u8) -> LcdResult<Self> {
        Ok(Instruction::SetDdramAddress(DdramAddress::new(address)?))
    }

    pub fn encode(&self) -> u8 {
        match *self {
            Instruction::ClearDisplay => 0b00000001,
            Instruction::ReturnHome => 0b00000010,
            Instruction::EntryModeSet {
                decrement,
                display_shift,
            } => {
                let mut command = 0b00000100;
                if !decrement {
                    command |= 0b00000010;
                }
                if display_shift {
                    command |= 0b00000001;
                }
                command
            }
            Instruction::DisplayControl {
                display_on,
                cursor_on,
                blink_on,
            } => {
                let mut command = 0b00001000;
                if display_on {
                    command |= 0b00000100;
                }
                if cursor_on {
                    command |= 0b00000010;
                }
                if blink_on {
                    command |= 0b00000001;
                }
                command
            }
            Instruction::CursorShift {
                display_shift,
                direction,
            } => {
                let mut command = 0b00010000;
                if display_shift {
                    command |= 0b00001000;
                }
                if direction == CursorDirection::Right {
                    command |= 0b00000100;
                }
                command
            }
            Instruction::FunctionSet {
                data_length_8bit,
                two_line,
                font_5x10,
            } => {
                let mut command = 0b00100000;
                if data_length_8bit {
                    command |= 0b00010000;
                }
                if two_line {
                    command |= 0b00001000;
                }
                if font_5x10 {
                    command |= 0b00000100;
                }
                command
            }
            Instruction::SetDdramAddress(address) => 0b10000000 | address.get(),
        }
    }

    /// Decodes a command byte back into the instruction that produced it.
    ///
    /// Don't-care bits are ignored. Returns `None` for `0x00` and for CGRAM address commands,
    /// which this driver never sends.
    pub fn decode(command: u8) -> Option<Self> {
        let bit = |mask: u8| command & mask != 0;

        // The highest set bit selects the instruction.
        let instruction = match command.leading_zeros() {
            7 => Instruction::ClearDisplay,
            6 => Instruction::ReturnHome,
            5 => Instruction::EntryModeSet {
                decrement: !bit(0b00000010),
                display_shift: bit(0b00000001),
            },
            4 => Instruction::DisplayControl {
                display_on: bit(0b00000100),
                cursor_on: bit(0b00000010),
                blink_on: bit(0b00000001),
            },
            3 => Instruction::CursorShift {
                display_shift: bit(0b00001000),
                direction: if bit(0b00000100) {
                    CursorDirection::Right
                } else {
                    CursorDirection::Left
                },
            },
            2 => Instruction::FunctionSet {
                data_length_8bit: bit(0b00010000),
                two_line: bit(0b00001000),
                font_5x10: bit(0b00000100),
            },
            0 => Instruction::SetDdramAddress(DdramAddress(command & DdramAddress::MAX)),
            _ => return None,
        };
        Some(instruction)
    }

    /// How long the controller needs before it accepts the next transfer.
    pub fn execution_time(&self, timing: &Timing) -> Duration {
        match self {
            Instruction::ClearDisplay | Instruction::ReturnHome => timing.clear_home,
            _ => timing.instruction,
        }
    }
}

/// The state of every bus line except E, fully determined before E is strobed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BusWord {
    /// `false` selects the instruction register, `true` the data register.
    pub register_select: bool,
    /// `false` for write. This driver never reads.
    pub read_write: bool,
    pub data: u8,
}

impl BusWord {
    pub fn instruction(command: u8) -> Self {
        BusWord {
            register_select: false,
            read_write: false,
            data: command,
        }
    }

    pub fn data(data: u8) -> Self {
        BusWord {
            register_select: true,
            read_write: false,
            data,
        }
    }

    /// Levels of the data lines, DB7 first.
    pub fn data_lines(&self) -> [bool; 8] {
        std::array::from_fn(|i| self.data & (0b10000000 >> i) != 0)
    }

    /// The instruction carried by this word, if it targets the instruction register.
    pub fn as_instruction(&self) -> Option<Instruction> {
        if self.register_select {
            return None;
        }
        Instruction::decode(self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_commands() {
        assert_eq!(Instruction::ClearDisplay.encode(), 0b00000001);
        assert_eq!(Instruction::ReturnHome.encode(), 0b00000010);
    }

    #[test]
    fn entry_mode_increment_bit_is_inverted() {
        let encode = |decrement, display_shift| {
            Instruction::EntryModeSet {
                decrement,
                display_shift,
            }
            .encode()
        };
        assert_eq!(encode(false, false), 0b00000110);
        assert_eq!(encode(true, true), 0b00000101);
        assert_eq!(encode(true, false), 0b00000100);
        assert_eq!(encode(false, true), 0b00000111);
    }

    #[test]
    fn display_control_flags() {
        let command = Instruction::DisplayControl {
            display_on: true,
            cursor_on: false,
            blink_on: true,
        };
        assert_eq!(command.encode(), 0b00001101);
    }

    #[test]
    fn function_set_flags() {
        let encode = |data_length_8bit, two_line, font_5x10| {
            Instruction::FunctionSet {
                data_length_8bit,
                two_line,
                font_5x10,
            }
            .encode()
        };
        assert_eq!(encode(true, false, false), 0b00110000);
        assert_eq!(encode(true, true, false), 0b00111000);
        assert_eq!(encode(false, false, false), 0b00100000);
        assert_eq!(encode(false, true, false), 0b00101000);
        assert_eq!(encode(false, false, true), 0b00100100);
    }

    #[test]
    fn cursor_shift_flags() {
        let command = Instruction::CursorShift {
            display_shift: true,
            direction: CursorDirection::Right,
        };
        assert_eq!(command.encode(), 0b00011100);
    }

    #[test]
    fn ddram_address_range() {
        for address in 0..=127u8 {
            let command = Instruction::set_ddram_address(address).unwrap().encode();
            assert_eq!(command & 0b10000000, 0b10000000);
            assert_eq!(command & 0b01111111, address);
        }
        for address in 128..=255u8 {
            assert_eq!(
                Instruction::set_ddram_address(address),
                Err(LcdError::AddressOutOfRange(address))
            );
        }
    }

    #[test]
    fn decode_recovers_flags() {
        let mut instructions = vec![Instruction::ClearDisplay, Instruction::ReturnHome];
        for flags in 0..8u8 {
            let (a, b, c) = (flags & 4 != 0, flags & 2 != 0, flags & 1 != 0);
            instructions.push(Instruction::EntryModeSet {
                decrement: a,
                display_shift: b,
            });
            instructions.push(Instruction::DisplayControl {
                display_on: a,
                cursor_on: b,
                blink_on: c,
            });
            instructions.push(Instruction::FunctionSet {
                data_length_8bit: a,
                two_line: b,
                font_5x10: c,
            });
            instructions.push(Instruction::CursorShift {
                display_shift: a,
                direction: if b {
                    CursorDirection::Right
                } else {
                    CursorDirection::Left
                },
            });
        }
        instructions.push(Instruction::set_ddram_address(0x40).unwrap());

        for instruction in instructions {
            assert_eq!(Instruction::decode(instruction.encode()), Some(instruction));
        }
    }

    #[test]
    fn decode_ignores_dont_care_bits() {
        assert_eq!(Instruction::decode(0b00000011), Some(Instruction::ReturnHome));
        assert_eq!(
            Instruction::decode(0b00110011),
            Some(Instruction::FunctionSet {
                data_length_8bit: true,
                two_line: false,
                font_5x10: false,
            })
        );
        assert_eq!(Instruction::decode(0), None);
        assert_eq!(Instruction::decode(0b01000000), None);
    }

    #[test]
    fn clear_and_home_get_long_settle() {
        let timing = Timing::default();
        assert_eq!(Instruction::ClearDisplay.execution_time(&timing), timing.clear_home);
        assert_eq!(Instruction::ReturnHome.execution_time(&timing), timing.clear_home);
        assert_eq!(
            Instruction::set_ddram_address(0).unwrap().execution_time(&timing),
            timing.instruction
        );
    }

    #[test]
    fn bus_word_lines_are_msb_first() {
        let word = BusWord::data(0b10100001);
        assert!(word.register_select);
        assert!(!word.read_write);
        assert_eq!(
            word.data_lines(),
            [true, false, true, false, false, false, false, true]
        );

        let word = BusWord::instruction(Instruction::ClearDisplay.encode());
        assert!(!word.register_select);
        assert_eq!(word.as_instruction(), Some(Instruction::ClearDisplay));
        assert_eq!(BusWord::data(0x01).as_instruction(), None);
    }
}
