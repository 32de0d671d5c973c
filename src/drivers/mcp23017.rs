// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! MCP23017 16-bit I2C port expander.
//!
//! Only the pieces the LED banks need: all sixteen pins as outputs and read-modify-write access to
//! the GPIO latch. The device runs with IOCON.BANK = 0, so every A register is immediately followed
//! by its B twin and a two-byte transfer covers both (A first).

use embedded_hal::i2c::I2c;

use crate::error::Error;

/// Base 7-bit address; the low three bits come from the A2..A0 straps.
pub const BASE_ADDRESS: u8 = 0x20;

/// Number of GPIO pins (GPA0..7 then GPB0..7).
pub const PINS: u8 = 16;

// Register addresses (IOCON.BANK = 0)
pub mod reg {
    pub const IODIRA: u8 = 0x00;
    pub const IODIRB: u8 = 0x01;
    pub const IOCON: u8 = 0x0A;
    pub const GPIOA: u8 = 0x12;
    pub const GPIOB: u8 = 0x13;
    pub const OLATA: u8 = 0x14;
}

/// IOCON: sequential addressing on, hardware address pins enabled (HAEN).
pub const IOCON_DEFAULT: u8 = 0x08;

#[derive(Copy, Clone, Debug)]
pub struct Mcp23017 {
    address: u8,
}

impl Mcp23017 {
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

    pub fn write_reg<I2C: I2c>(
        &self,
        i2c: &mut I2C,
        reg: u8,
        value: u8,
    ) -> Result<(), Error<I2C::Error>> {
        i2c.write(self.address, &[reg, value])?;
        Ok(())
    }

    pub fn read_reg<I2C: I2c>(&self, i2c: &mut I2C, reg: u8) -> Result<u8, Error<I2C::Error>> {
        let mut buf = [0u8; 1];
        i2c.write_read(self.address, &[reg], &mut buf)?;
        Ok(buf[0])
    }

    /// Read an A/B register pair as one 16-bit value (A in the low byte).
    pub fn bank_pair<I2C: I2c>(&self, i2c: &mut I2C, reg_a: u8) -> Result<u16, Error<I2C::Error>> {
        let mut buf = [0u8; 2];
        i2c.write_read(self.address, &[reg_a], &mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Write an A/B register pair in one transaction (A in the low byte).
    pub fn set_bank_pair<I2C: I2c>(
        &self,
        i2c: &mut I2C,
        reg_a: u8,
        value: u16,
    ) -> Result<(), Error<I2C::Error>> {
        let [lo, hi] = value.to_le_bytes();
        i2c.write(self.address, &[reg_a, lo, hi])?;
        Ok(())
    }

    /// Configure IOCON, drive all pins low, then switch every pin to output.
    ///
    /// The latch is cleared before IODIR so no LED flashes on during bring-up.
    pub fn init_outputs_low<I2C: I2c>(&self, i2c: &mut I2C) -> Result<(), Error<I2C::Error>> {
        self.write_reg(i2c, reg::IOCON, IOCON_DEFAULT)?;
        self.set_bank_pair(i2c, reg::GPIOA, 0x0000)?;
        self.set_bank_pair(i2c, reg::IODIRA, 0x0000)
    }

    /// Current state of the sixteen GPIO pins.
    #[inline]
    pub fn outputs<I2C: I2c>(&self, i2c: &mut I2C) -> Result<u16, Error<I2C::Error>> {
        self.bank_pair(i2c, reg::GPIOA)
    }

    #[inline]
    pub fn set_outputs<I2C: I2c>(&self, i2c: &mut I2C, value: u16) -> Result<(), Error<I2C::Error>> {
        self.set_bank_pair(i2c, reg::GPIOA, value)
    }

    /// Read-modify-write a single output pin (0..=15).
    pub fn set_pin<I2C: I2c>(
        &self,
        i2c: &mut I2C,
        pin: u8,
        high: bool,
    ) -> Result<(), Error<I2C::Error>> {
        let mask = 1u16 << (pin % PINS);
        let current = self.outputs(i2c)?;
        let next = if high { current | mask } else { current & !mask };
        self.set_outputs(i2c, next)
    }

    pub fn pin<I2C: I2c>(&self, i2c: &mut I2C, pin: u8) -> Result<bool, Error<I2C::Error>> {
        Ok(self.outputs(i2c)? & (1u16 << (pin % PINS)) != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};

    #[test]
    fn init_clears_latch_before_direction() {
        let expectations = [
            Transaction::write(0x21, vec![reg::IOCON, IOCON_DEFAULT]),
            Transaction::write(0x21, vec![reg::GPIOA, 0x00, 0x00]),
            Transaction::write(0x21, vec![reg::IODIRA, 0x00, 0x00]),
        ];
        let mut i2c = I2cMock::new(&expectations);

        Mcp23017::new(0b001).init_outputs_low(&mut i2c).unwrap();

        i2c.done();
    }

    #[test]
    fn set_pin_preserves_other_outputs() {
        let expectations = [
            // GPA1 and GPB7 already high; raise GPB2 (pin 10)
            Transaction::write_read(0x24, vec![reg::GPIOA], vec![0x02, 0x80]),
            Transaction::write(0x24, vec![reg::GPIOA, 0x02, 0x84]),
            // drop GPA1
            Transaction::write_read(0x24, vec![reg::GPIOA], vec![0x02, 0x84]),
            Transaction::write(0x24, vec![reg::GPIOA, 0x00, 0x84]),
        ];
        let mut i2c = I2cMock::new(&expectations);

        let exp = Mcp23017::new(0b100);
        exp.set_pin(&mut i2c, 10, true).unwrap();
        exp.set_pin(&mut i2c, 1, false).unwrap();

        i2c.done();
    }

    #[test]
    fn pin_reads_back_the_latch() {
        let expectations = [Transaction::write_read(0x22, vec![reg::GPIOA], vec![0x00, 0x01])];
        let mut i2c = I2cMock::new(&expectations);

        assert!(Mcp23017::new(0b010).pin(&mut i2c, 8).unwrap());

        i2c.done();
    }
}
