// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Host command protocol.
//!
//! The host is the SPI master and every exchange is one byte each way. A request is an opcode byte,
//! optionally followed by one argument byte. Every reply is [`REPLY_LEN`] bytes, MSB first.
//!
//! | Opcode | Name                | Arg | Reply                          |
//! | ------ | ------------------- | --- | ------------------------------ |
//! | `0x01` | `GET_READING`       | 1   | packed reading                 |
//! | `0x02` | `GET_POWER`         | 0   | current (mA) / voltage (mV)    |
//! | `0x03` | `ENTER_SLEEP_MODE`  | 0   | `00 00 00`                     |
//! | `0x04` | `ENTER_NORMAL_MODE` | 0   | `00 00 00`                     |
//! | `0x05` | `GET_STATUS`        | 0   | `[status, 0, 0]`, then cleared |

use crate::registry::{Mode, WellIndex};

// Opcodes
pub const GET_READING: u8 = 0x01;
pub const GET_POWER: u8 = 0x02;
pub const ENTER_SLEEP_MODE: u8 = 0x03;
pub const ENTER_NORMAL_MODE: u8 = 0x04;
pub const GET_STATUS: u8 = 0x05;

/// Length of every reply, in bytes.
pub const REPLY_LEN: usize = 3;

/// GET_READING argument: well index.
pub const ARG_WELL_MASK: u8 = 0x1F;
/// GET_READING argument: set for fluorescence, clear for optical density.
pub const ARG_MODE_BIT: u8 = 0x20;

/// Status byte: some error occurred.
pub const STATUS_ERROR: u8 = 0x80;
/// Status byte: an unknown opcode was received.
pub const STATUS_INVALID_COMMAND: u8 = 0x40;

/// Known opcodes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Opcode {
    GetReading,
    GetPower,
    EnterSleepMode,
    EnterNormalMode,
    GetStatus,
}

impl Opcode {
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            GET_READING => Some(Opcode::GetReading),
            GET_POWER => Some(Opcode::GetPower),
            ENTER_SLEEP_MODE => Some(Opcode::EnterSleepMode),
            ENTER_NORMAL_MODE => Some(Opcode::EnterNormalMode),
            GET_STATUS => Some(Opcode::GetStatus),
            _ => None,
        }
    }

    pub const fn byte(self) -> u8 {
        match self {
            Opcode::GetReading => GET_READING,
            Opcode::GetPower => GET_POWER,
            Opcode::EnterSleepMode => ENTER_SLEEP_MODE,
            Opcode::EnterNormalMode => ENTER_NORMAL_MODE,
            Opcode::GetStatus => GET_STATUS,
        }
    }

    /// Number of argument bytes following the opcode.
    pub const fn arg_len(self) -> usize {
        match self {
            Opcode::GetReading => 1,
            _ => 0,
        }
    }

    /// Whether the foreground loop has to run this opcode. The rest are answered from the ISR.
    pub const fn is_deferred(self) -> bool {
        !matches!(self, Opcode::GetStatus)
    }
}

/// Work handed from the ISR to the foreground loop.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    GetReading { well: WellIndex, mode: Mode },
    GetPower,
    EnterSleepMode,
    EnterNormalMode,
}

impl Command {
    /// Build the command for a deferred opcode. `arg` is ignored when the opcode takes none.
    pub const fn decode(opcode: Opcode, arg: u8) -> Option<Self> {
        match opcode {
            Opcode::GetReading => Some(Command::GetReading {
                well: WellIndex::from_low_bits(arg & ARG_WELL_MASK),
                mode: Mode::from_bit(arg & ARG_MODE_BIT != 0),
            }),
            Opcode::GetPower => Some(Command::GetPower),
            Opcode::EnterSleepMode => Some(Command::EnterSleepMode),
            Opcode::EnterNormalMode => Some(Command::EnterNormalMode),
            Opcode::GetStatus => None,
        }
    }

    pub const fn opcode(self) -> Opcode {
        match self {
            Command::GetReading { .. } => Opcode::GetReading,
            Command::GetPower => Opcode::GetPower,
            Command::EnterSleepMode => Opcode::EnterSleepMode,
            Command::EnterNormalMode => Opcode::EnterNormalMode,
        }
    }
}

/// Fixed-length reply frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Reply([u8; REPLY_LEN]);

impl Reply {
    pub const ZERO: Self = Self([0; REPLY_LEN]);

    /// Low 24 bits of `value`, MSB first.
    pub const fn from_u24(value: u32) -> Self {
        Self([(value >> 16) as u8, (value >> 8) as u8, value as u8])
    }

    /// `[status, 0, 0]`
    pub const fn status(status: u8) -> Self {
        Self([status, 0, 0])
    }

    /// Every byte set to `byte`.
    pub const fn filled(byte: u8) -> Self {
        Self([byte; REPLY_LEN])
    }

    #[inline]
    pub const fn bytes(&self) -> &[u8; REPLY_LEN] {
        &self.0
    }

    /// Byte `index`, or 0 past the end.
    #[inline]
    pub fn byte(&self, index: usize) -> u8 {
        self.0.get(index).copied().unwrap_or(0)
    }
}

/// Sticky status flags, cleared on read.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Status(u8);

impl Status {
    pub const fn new() -> Self {
        Self(0)
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn flag_invalid_command(&mut self) {
        self.0 |= STATUS_ERROR | STATUS_INVALID_COMMAND;
    }

    /// Return the flags and clear them.
    pub fn take(&mut self) -> u8 {
        core::mem::take(&mut self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_table() {
        for b in 0x01..=0x05 {
            let op = Opcode::from_byte(b).unwrap();
            assert_eq!(op.byte(), b);
        }
        assert_eq!(Opcode::from_byte(0x00), None);
        assert_eq!(Opcode::from_byte(0x06), None);
        assert_eq!(Opcode::GetReading.arg_len(), 1);
        assert_eq!(Opcode::GetPower.arg_len(), 0);
        assert!(!Opcode::GetStatus.is_deferred());
        for op in [
            Opcode::GetReading,
            Opcode::GetPower,
            Opcode::EnterSleepMode,
            Opcode::EnterNormalMode,
        ] {
            assert!(op.is_deferred(), "{:?}", op);
        }
    }

    #[test]
    fn reading_argument_layout() {
        let cmd = Command::decode(Opcode::GetReading, 0x25).unwrap();
        assert_eq!(
            cmd,
            Command::GetReading {
                well: WellIndex::from_low_bits(5),
                mode: Mode::Fluorescence
            }
        );
        assert_eq!(cmd.opcode(), Opcode::GetReading);

        // bits 7..6 ignored
        let cmd = Command::decode(Opcode::GetReading, 0xDF).unwrap();
        assert_eq!(
            cmd,
            Command::GetReading {
                well: WellIndex::from_low_bits(31),
                mode: Mode::OpticalDensity
            }
        );
    }

    #[test]
    fn status_is_not_a_command() {
        assert_eq!(Command::decode(Opcode::GetStatus, 0), None);
        assert_eq!(Command::decode(Opcode::GetPower, 0xAA), Some(Command::GetPower));
        assert_eq!(Command::GetPower.opcode(), Opcode::GetPower);
    }

    #[test]
    fn reply_is_msb_first() {
        assert_eq!(Reply::from_u24(0xFF83_1234).bytes(), &[0x83, 0x12, 0x34]);
        assert_eq!(Reply::status(0xC0).byte(0), 0xC0);
        assert_eq!(Reply::filled(0x5A).bytes(), &[0x5A; 3]);
        assert_eq!(Reply::ZERO.byte(7), 0);
    }

    #[test]
    fn status_flags_are_sticky_until_taken() {
        let mut s = Status::new();
        s.flag_invalid_command();
        s.flag_invalid_command();
        assert_eq!(s.bits(), 0xC0);
        assert_eq!(s.take(), 0xC0);
        assert_eq!(s.bits(), 0);
    }
}
