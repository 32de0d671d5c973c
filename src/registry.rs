// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Per-well bookkeeping.
//!
//! One [`Well`] per sample position, each owning its sensor handle, one calibration profile per
//! illumination mode and the most recent packed reading per mode. The two modes never share state:
//! writing the profile or reading of one leaves the other untouched.

use crate::calibration::Profile;
use crate::drivers::tsl2591::Tsl2591;
use crate::reading::PackedReading;

/// Number of wells on the board.
pub const WELL_COUNT: usize = 32;

/// A validated well index, `0..=31`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct WellIndex(u8);

impl WellIndex {
    /// `None` when `index` is outside `0..=31`.
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < WELL_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Take the low five bits, ignoring the rest.
    pub const fn from_low_bits(bits: u8) -> Self {
        Self(bits & 0x1F)
    }

    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    pub fn all() -> impl Iterator<Item = WellIndex> {
        (0..WELL_COUNT as u8).map(WellIndex)
    }
}

/// Illumination mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Transmitted light through the sample (sensing-board LEDs).
    OpticalDensity = 0,
    /// Excitation from the LED board.
    Fluorescence = 1,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::OpticalDensity, Mode::Fluorescence];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn from_bit(fluorescence: bool) -> Self {
        if fluorescence {
            Mode::Fluorescence
        } else {
            Mode::OpticalDensity
        }
    }
}

/// State for one sample position.
#[derive(Copy, Clone, Debug)]
pub struct Well {
    pub sensor: Tsl2591,
    profiles: [Profile; 2],
    readings: [PackedReading; 2],
}

impl Well {
    pub const NEW: Self = Self {
        sensor: Tsl2591::NEW,
        profiles: [Profile::DEFAULT; 2],
        readings: [PackedReading::ZERO; 2],
    };

    #[inline]
    pub fn profile(&self, mode: Mode) -> Profile {
        self.profiles[mode.index()]
    }

    #[inline]
    pub fn set_profile(&mut self, mode: Mode, profile: Profile) {
        self.profiles[mode.index()] = profile;
    }

    #[inline]
    pub fn reading(&self, mode: Mode) -> PackedReading {
        self.readings[mode.index()]
    }

    #[inline]
    pub fn set_reading(&mut self, mode: Mode, reading: PackedReading) {
        self.readings[mode.index()] = reading;
    }
}

impl Default for Well {
    fn default() -> Self {
        Self::NEW
    }
}

/// Fixed table of all wells, indexed by [`WellIndex`].
pub struct SensorRegistry {
    wells: [Well; WELL_COUNT],
}

impl SensorRegistry {
    pub const fn new() -> Self {
        Self {
            wells: [Well::NEW; WELL_COUNT],
        }
    }

    #[inline]
    pub fn well(&self, index: WellIndex) -> &Well {
        &self.wells[index.as_usize()]
    }

    #[inline]
    pub fn well_mut(&mut self, index: WellIndex) -> &mut Well {
        &mut self.wells[index.as_usize()]
    }

    #[inline]
    pub fn sensor_mut(&mut self, index: WellIndex) -> &mut Tsl2591 {
        &mut self.wells[index.as_usize()].sensor
    }

    pub fn profile(&self, index: WellIndex, mode: Mode) -> Profile {
        self.well(index).profile(mode)
    }

    pub fn set_profile(&mut self, index: WellIndex, mode: Mode, profile: Profile) {
        self.well_mut(index).set_profile(mode, profile);
    }

    pub fn reading(&self, index: WellIndex, mode: Mode) -> PackedReading {
        self.well(index).reading(mode)
    }

    pub fn set_reading(&mut self, index: WellIndex, mode: Mode, reading: PackedReading) {
        self.well_mut(index).set_reading(mode, reading);
    }

    /// Forget device state after the sensor rail has been cut. Profiles and readings survive.
    pub fn reset_sensors(&mut self) {
        for well in self.wells.iter_mut() {
            well.sensor = Tsl2591::NEW;
        }
    }
}

impl Default for SensorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
