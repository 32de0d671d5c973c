// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! TSL2591 ambient light sensor.
//!
//! Register access over I2C plus a small handle that mirrors the device's enable state, gain,
//! integration time and the last pair of channel counts. The bus is passed in as `&mut` to each
//! call so every sensor on the board can share the single I2C peripheral behind the multiplexers.

use embedded_hal::{delay::DelayNs, i2c::I2c};

use crate::error::Error;
use crate::timeout::spin_until;

/// Fixed 7-bit bus address.
pub const ADDRESS: u8 = 0x29;

/// Command bit plus "normal operation" transaction type; OR'd with the register address.
pub const COMMAND: u8 = 0xA0;

/// Value of the ID register.
pub const DEVICE_ID: u8 = 0x50;

// Register addresses
pub mod reg {
    pub const ENABLE: u8 = 0x00;
    pub const CONTROL: u8 = 0x01;
    pub const PID: u8 = 0x11;
    pub const ID: u8 = 0x12;
    pub const STATUS: u8 = 0x13;
    pub const C0DATAL: u8 = 0x14;
    pub const C1DATAL: u8 = 0x16;
}

/// ENABLE: power on (PON) and ALS enable (AEN).
pub const ENABLE_PON_AEN: u8 = 0x03;
/// ENABLE: everything off.
pub const ENABLE_OFF: u8 = 0x00;
/// STATUS: ALS data valid.
pub const STATUS_AVALID: u8 = 0x01;

const AGAIN_SHIFT: u8 = 4;
const AGAIN_MASK: u8 = 0x30;
const ATIME_MASK: u8 = 0x07;

/// Analog gain, ordered from least to most sensitive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Gain {
    Low,
    Medium,
    High,
    Max,
}

impl Gain {
    pub const ALL: [Gain; 4] = [Gain::Low, Gain::Medium, Gain::High, Gain::Max];

    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Gain::Low),
            1 => Some(Gain::Medium),
            2 => Some(Gain::High),
            3 => Some(Gain::Max),
            _ => None,
        }
    }

    /// Typical gain relative to `Low`.
    pub const fn multiplier(self) -> f32 {
        match self {
            Gain::Low => 1.0,
            Gain::Medium => 25.0,
            Gain::High => 428.0,
            Gain::Max => 9876.0,
        }
    }

    /// Next more sensitive step, if any.
    pub const fn up(self) -> Option<Self> {
        Self::from_code(self.code() + 1)
    }

    /// Next less sensitive step, if any.
    pub const fn down(self) -> Option<Self> {
        match self.code() {
            0 => None,
            c => Self::from_code(c - 1),
        }
    }
}

/// ADC integration time, 100 ms to 600 ms in 100 ms steps.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum IntegrationTime {
    Ms100,
    Ms200,
    Ms300,
    Ms400,
    Ms500,
    Ms600,
}

impl IntegrationTime {
    pub const MIN: Self = IntegrationTime::Ms100;
    pub const MAX: Self = IntegrationTime::Ms600;

    pub const ALL: [IntegrationTime; 6] = [
        IntegrationTime::Ms100,
        IntegrationTime::Ms200,
        IntegrationTime::Ms300,
        IntegrationTime::Ms400,
        IntegrationTime::Ms500,
        IntegrationTime::Ms600,
    ];

    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(IntegrationTime::Ms100),
            1 => Some(IntegrationTime::Ms200),
            2 => Some(IntegrationTime::Ms300),
            3 => Some(IntegrationTime::Ms400),
            4 => Some(IntegrationTime::Ms500),
            5 => Some(IntegrationTime::Ms600),
            _ => None,
        }
    }

    #[inline]
    pub const fn millis(self) -> u32 {
        (self.code() as u32 + 1) * 100
    }

    pub const fn up(self) -> Option<Self> {
        Self::from_code(self.code() + 1)
    }

    pub const fn down(self) -> Option<Self> {
        match self.code() {
            0 => None,
            c => Self::from_code(c - 1),
        }
    }
}

/// CONTROL register value for the given settings.
#[inline]
pub const fn control_bits(gain: Gain, time: IntegrationTime) -> u8 {
    ((gain.code() << AGAIN_SHIFT) & AGAIN_MASK) | (time.code() & ATIME_MASK)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PowerState {
    Disabled,
    Enabled,
}

/// Driver handle for one TSL2591.
#[derive(Copy, Clone, Debug)]
pub struct Tsl2591 {
    state: PowerState,
    gain: Gain,
    time: IntegrationTime,
    ch0: u16,
    ch1: u16,
}

impl Tsl2591 {
    /// Handle in the power-on reset state, set up for (Low, 200 ms).
    pub const NEW: Self = Self {
        state: PowerState::Disabled,
        gain: Gain::Low,
        time: IntegrationTime::Ms200,
        ch0: 0,
        ch1: 0,
    };

    pub const fn new() -> Self {
        Self::NEW
    }

    #[inline]
    pub fn state(&self) -> PowerState {
        self.state
    }

    #[inline]
    pub fn gain(&self) -> Gain {
        self.gain
    }

    #[inline]
    pub fn integration_time(&self) -> IntegrationTime {
        self.time
    }

    /// Full-spectrum (CH0) count from the last [`read_channels`](Self::read_channels).
    #[inline]
    pub fn ch0(&self) -> u16 {
        self.ch0
    }

    /// Infrared (CH1) count from the last [`read_channels`](Self::read_channels).
    #[inline]
    pub fn ch1(&self) -> u16 {
        self.ch1
    }

    fn write_reg<I2C: I2c>(i2c: &mut I2C, reg: u8, value: u8) -> Result<(), Error<I2C::Error>> {
        i2c.write(ADDRESS, &[COMMAND | reg, value])?;
        Ok(())
    }

    fn read_reg<I2C: I2c>(i2c: &mut I2C, reg: u8) -> Result<u8, Error<I2C::Error>> {
        let mut buf = [0u8; 1];
        i2c.write_read(ADDRESS, &[COMMAND | reg], &mut buf)?;
        Ok(buf[0])
    }

    /// Write the handle's gain and integration time, then power the device up.
    ///
    /// The caller must have selected the sensor's multiplexer channel.
    pub fn init<I2C: I2c>(&mut self, i2c: &mut I2C) -> Result<(), Error<I2C::Error>> {
        self.configure(i2c, self.gain, self.time)?;
        self.wake(i2c)
    }

    /// Power the oscillator and ALS engine down.
    pub fn sleep<I2C: I2c>(&mut self, i2c: &mut I2C) -> Result<(), Error<I2C::Error>> {
        Self::write_reg(i2c, reg::ENABLE, ENABLE_OFF)?;
        self.state = PowerState::Disabled;
        Ok(())
    }

    /// Power the device up and start integrating.
    pub fn wake<I2C: I2c>(&mut self, i2c: &mut I2C) -> Result<(), Error<I2C::Error>> {
        Self::write_reg(i2c, reg::ENABLE, ENABLE_PON_AEN)?;
        self.state = PowerState::Enabled;
        Ok(())
    }

    /// Write gain and integration time in one CONTROL transaction.
    pub fn configure<I2C: I2c>(
        &mut self,
        i2c: &mut I2C,
        gain: Gain,
        time: IntegrationTime,
    ) -> Result<(), Error<I2C::Error>> {
        Self::write_reg(i2c, reg::CONTROL, control_bits(gain, time))?;
        self.gain = gain;
        self.time = time;
        Ok(())
    }

    /// Read the ID register. A genuine part answers [`DEVICE_ID`].
    pub fn read_id<I2C: I2c>(&mut self, i2c: &mut I2C) -> Result<u8, Error<I2C::Error>> {
        Self::read_reg(i2c, reg::ID)
    }

    /// Wait for AVALID, then read both channels in one burst.
    ///
    /// STATUS is polled at most `budget` times, `interval_us` apart.
    pub fn read_channels<I2C, D>(
        &mut self,
        i2c: &mut I2C,
        delay: &mut D,
        budget: u32,
        interval_us: u32,
    ) -> Result<(u16, u16), Error<I2C::Error>>
    where
        I2C: I2c,
        D: DelayNs,
    {
        spin_until::<I2C::Error, _, _>(
            budget,
            || Ok((Self::read_reg(i2c, reg::STATUS)? & STATUS_AVALID) != 0),
            || delay.delay_us(interval_us),
        )?;

        let mut buf = [0u8; 4];
        i2c.write_read(ADDRESS, &[COMMAND | reg::C0DATAL], &mut buf)?;
        self.ch0 = u16::from_le_bytes([buf[0], buf[1]]);
        self.ch1 = u16::from_le_bytes([buf[2], buf[3]]);
        Ok((self.ch0, self.ch1))
    }
}

impl Default for Tsl2591 {
    fn default() -> Self {
        Self::NEW
    }
}
