// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! `embedded-hal` 0.2 → 1.0 adapters.
//!
//! The STM32F7 HAL implements the 0.2 blocking traits; the drivers and the pipeline are written
//! against 1.0. [`Compat`] wraps a HAL object and exposes the 1.0 `I2c`, `OutputPin` and `DelayNs`
//! traits on top of it.

use core::fmt::Debug;

use embedded_hal::{delay::DelayNs, digital, i2c};
use embedded_hal_02::blocking::{delay::DelayUs, i2c as i2c02};
use embedded_hal_02::digital::v2 as digital02;

/// Wrapper that lifts a 0.2 HAL object to the 1.0 traits.
pub struct Compat<T>(pub T);

impl<T> Compat<T> {
    pub fn free(self) -> T {
        self.0
    }
}

/// Error from a wrapped 0.2 object.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CompatError<E>(pub E);

impl<E: Debug> i2c::Error for CompatError<E> {
    fn kind(&self) -> i2c::ErrorKind {
        i2c::ErrorKind::Other
    }
}

impl<E: Debug> digital::Error for CompatError<E> {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

impl<T, E> i2c::ErrorType for Compat<T>
where
    T: i2c02::Write<Error = E> + i2c02::Read<Error = E> + i2c02::WriteRead<Error = E>,
    E: Debug,
{
    type Error = CompatError<E>;
}

impl<T, E> i2c::I2c for Compat<T>
where
    T: i2c02::Write<Error = E> + i2c02::Read<Error = E> + i2c02::WriteRead<Error = E>,
    E: Debug,
{
    fn read(&mut self, address: u8, read: &mut [u8]) -> Result<(), Self::Error> {
        self.0.read(address, read).map_err(CompatError)
    }

    fn write(&mut self, address: u8, write: &[u8]) -> Result<(), Self::Error> {
        self.0.write(address, write).map_err(CompatError)
    }

    fn write_read(&mut self, address: u8, write: &[u8], read: &mut [u8]) -> Result<(), Self::Error> {
        self.0.write_read(address, write, read).map_err(CompatError)
    }

    /// Each operation becomes its own transfer; the HAL has no repeated-start chaining.
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [i2c::Operation<'_>],
    ) -> Result<(), Self::Error> {
        for op in operations {
            match op {
                i2c::Operation::Read(buf) => self.0.read(address, buf).map_err(CompatError)?,
                i2c::Operation::Write(bytes) => self.0.write(address, bytes).map_err(CompatError)?,
            }
        }
        Ok(())
    }
}

impl<T> digital::ErrorType for Compat<T>
where
    T: digital02::OutputPin,
    T::Error: Debug,
{
    type Error = CompatError<T::Error>;
}

impl<T> digital::OutputPin for Compat<T>
where
    T: digital02::OutputPin,
    T::Error: Debug,
{
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set_low().map_err(CompatError)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set_high().map_err(CompatError)
    }
}

impl<T: DelayUs<u32>> DelayNs for Compat<T> {
    fn delay_ns(&mut self, ns: u32) {
        self.0.delay_us(ns.div_ceil(1_000));
    }

    fn delay_us(&mut self, us: u32) {
        self.0.delay_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.0.delay_us(1_000);
        }
    }
}
