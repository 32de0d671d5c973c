// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Packed 24-bit reading word.
//!
//! | Bits   | Field                 |
//! | ------ | --------------------- |
//! | 23..22 | gain code             |
//! | 18..16 | integration-time code |
//! | 15..0  | raw CH0 count         |
//!
//! Every other bit is zero. The low 24 bits go out on the wire MSB first.

use crate::drivers::tsl2591::{Gain, IntegrationTime};

const GAIN_SHIFT: u32 = 22;
const GAIN_MASK: u32 = 0b11;
const TIME_SHIFT: u32 = 16;
const TIME_MASK: u32 = 0b111;
const RAW_MASK: u32 = 0xFFFF;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct PackedReading(u32);

impl PackedReading {
    pub const ZERO: Self = Self(0);

    pub const fn pack(gain: Gain, time: IntegrationTime, raw: u16) -> Self {
        Self(
            ((gain.code() as u32) << GAIN_SHIFT)
                | ((time.code() as u32) << TIME_SHIFT)
                | raw as u32,
        )
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    pub fn gain(self) -> Gain {
        match (self.0 >> GAIN_SHIFT) & GAIN_MASK {
            0 => Gain::Low,
            1 => Gain::Medium,
            2 => Gain::High,
            _ => Gain::Max,
        }
    }

    pub fn integration_time(self) -> IntegrationTime {
        IntegrationTime::from_code(((self.0 >> TIME_SHIFT) & TIME_MASK) as u8)
            .unwrap_or(IntegrationTime::MIN)
    }

    #[inline]
    pub fn raw(self) -> u16 {
        (self.0 & RAW_MASK) as u16
    }

    /// (gain, integration time, raw count)
    pub fn unpack(self) -> (Gain, IntegrationTime, u16) {
        (self.gain(), self.integration_time(), self.raw())
    }

    /// Low 24 bits, most significant byte first.
    pub fn to_be_bytes(self) -> [u8; 3] {
        let [_, b2, b1, b0] = self.0.to_be_bytes();
        [b2, b1, b0]
    }
}
