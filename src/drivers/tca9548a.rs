// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! TCA9548A 8-channel I2C multiplexer.
//!
//! The device has a single control register: bit `n` connects downstream channel `n` to the
//! upstream bus. Writing the register is a one-byte write to the device address.

use embedded_hal::i2c::I2c;

use crate::error::Error;

/// Base 7-bit address; the low three bits come from the A2..A0 straps.
pub const BASE_ADDRESS: u8 = 0x70;

/// Number of downstream channels.
pub const CHANNELS: u8 = 8;

/// One multiplexer on the shared bus.
#[derive(Copy, Clone, Debug)]
pub struct Tca9548a {
    address: u8,
}

impl Tca9548a {
    /// Build a handle from the hardware address straps (A2..A0).
    pub const fn new(hw_addr: u8) -> Self {
        Self {
            address: BASE_ADDRESS | (hw_addr & 0x07),
        }
    }

    #[inline]
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Write the raw channel mask.
    pub fn set_channels<I2C: I2c>(&self, i2c: &mut I2C, mask: u8) -> Result<(), Error<I2C::Error>> {
        i2c.write(self.address, &[mask])?;
        Ok(())
    }

    /// Read back the channel mask.
    pub fn channels<I2C: I2c>(&self, i2c: &mut I2C) -> Result<u8, Error<I2C::Error>> {
        let mut buf = [0u8; 1];
        i2c.read(self.address, &mut buf)?;
        Ok(buf[0])
    }

    /// Enable exactly one channel (0..=7), disconnecting all others.
    pub fn select<I2C: I2c>(&self, i2c: &mut I2C, channel: u8) -> Result<(), Error<I2C::Error>> {
        self.set_channels(i2c, 1 << (channel % CHANNELS))
    }

    /// Disconnect every downstream channel.
    pub fn disable_all<I2C: I2c>(&self, i2c: &mut I2C) -> Result<(), Error<I2C::Error>> {
        self.set_channels(i2c, 0x00)
    }
}
