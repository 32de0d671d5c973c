// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Logical output lines.
//!
//! A [`Signal`] wraps a GPIO output and remembers whether the board wiring makes it active-high or
//! active-low, so callers only deal in "asserted" and "deasserted". Used for the host ready line
//! and the sensor-rail load switch.

use embedded_hal::digital::OutputPin;

/// Electrical level that means "asserted".
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ActiveLevel {
    High,
    Low,
}

/// Output line that remembers its active level and last driven state.
pub struct Signal<PIN: OutputPin> {
    pin: PIN,
    active: ActiveLevel,
    asserted: bool,
}

impl<PIN: OutputPin> Signal<PIN> {
    /// Wrap `pin` and drive it to the deasserted level.
    pub fn new(pin: PIN, active: ActiveLevel) -> Result<Self, PIN::Error> {
        let mut signal = Self {
            pin,
            active,
            asserted: true,
        };
        signal.set(false)?;
        Ok(signal)
    }

    pub fn active_high(pin: PIN) -> Result<Self, PIN::Error> {
        Self::new(pin, ActiveLevel::High)
    }

    pub fn active_low(pin: PIN) -> Result<Self, PIN::Error> {
        Self::new(pin, ActiveLevel::Low)
    }

    /// Drive the line logically asserted (true) or deasserted (false).
    pub fn set(&mut self, asserted: bool) -> Result<(), PIN::Error> {
        match (self.active, asserted) {
            (ActiveLevel::High, true) | (ActiveLevel::Low, false) => self.pin.set_high()?,
            (ActiveLevel::High, false) | (ActiveLevel::Low, true) => self.pin.set_low()?,
        }
        self.asserted = asserted;
        Ok(())
    }

    #[inline]
    pub fn assert(&mut self) -> Result<(), PIN::Error> {
        self.set(true)
    }

    #[inline]
    pub fn deassert(&mut self) -> Result<(), PIN::Error> {
        self.set(false)
    }

    #[inline]
    pub fn is_asserted(&self) -> bool {
        self.asserted
    }

    #[inline]
    pub fn active_level(&self) -> ActiveLevel {
        self.active
    }

    pub fn free(self) -> PIN {
        self.pin
    }
}
