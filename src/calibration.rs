// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Auto-ranging over the (gain, integration time) lattice.
//!
//! The lattice is ordered by sensitivity: integration time is the fine axis and gain the coarse
//! one. Stepping "brighter" lengthens the integration time, and at 600 ms moves to the next gain at
//! 100 ms; stepping "dimmer" is the mirror image. A run samples, compares the normalized count
//! against the target band and steps one lattice point at a time until the count lands in the
//! band, the lattice runs out, or the adjustment budget is spent.

use log::debug;

use crate::config::CalibrationConfig;
use crate::drivers::tsl2591::{Gain, IntegrationTime};

/// Full-scale divisor for a 16-bit count.
const FULL_SCALE: f32 = 65536.0;

/// A (gain, integration time) pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Profile {
    pub gain: Gain,
    pub time: IntegrationTime,
}

impl Profile {
    /// Setting every well starts from.
    pub const DEFAULT: Self = Self::new(Gain::Low, IntegrationTime::Ms200);
    /// Least sensitive point.
    pub const MIN: Self = Self::new(Gain::Low, IntegrationTime::MIN);
    /// Most sensitive point.
    pub const MAX: Self = Self::new(Gain::Max, IntegrationTime::MAX);

    pub const fn new(gain: Gain, time: IntegrationTime) -> Self {
        Self { gain, time }
    }

    /// One step up the lattice, or `None` at [`Profile::MAX`].
    pub fn brighter(self) -> Option<Self> {
        match self.time.up() {
            Some(time) => Some(Self::new(self.gain, time)),
            None => self
                .gain
                .up()
                .map(|gain| Self::new(gain, IntegrationTime::MIN)),
        }
    }

    /// One step down the lattice, or `None` at [`Profile::MIN`].
    pub fn dimmer(self) -> Option<Self> {
        match self.time.down() {
            Some(time) => Some(Self::new(self.gain, time)),
            None => self
                .gain
                .down()
                .map(|gain| Self::new(gain, IntegrationTime::MAX)),
        }
    }

    /// Position on the lattice, 0 ([`Profile::MIN`]) to 23 ([`Profile::MAX`]).
    pub fn rank(self) -> u8 {
        self.gain.code() * IntegrationTime::ALL.len() as u8 + self.time.code()
    }

    /// All 24 profiles in lattice order.
    pub fn all() -> impl Iterator<Item = Profile> {
        Gain::ALL
            .into_iter()
            .flat_map(|g| IntegrationTime::ALL.into_iter().map(move |t| Profile::new(g, t)))
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Normalize a raw count to `[0, 1)`.
#[inline]
pub fn normalize(raw: u16) -> f32 {
    raw as f32 / FULL_SCALE
}

/// What the calibrator needs from a sensor.
pub trait LightSensor {
    type Error;

    /// Setting currently in effect.
    fn profile(&self) -> Profile;

    /// Switch to `profile` and wait until the next sample reflects it.
    fn apply(&mut self, profile: Profile) -> Result<(), Self::Error>;

    /// Take one raw CH0 sample.
    fn sample(&mut self) -> Result<u16, Self::Error>;
}

/// How a calibration run ended. Each variant carries the number of setting changes made.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Sample landed inside the band.
    Converged(u8),
    /// Too dark even at the most sensitive setting.
    SaturatedLow(u8),
    /// Too bright even at the least sensitive setting.
    SaturatedHigh(u8),
    /// Adjustment budget spent without settling.
    Exhausted(u8),
}

impl Outcome {
    pub fn adjustments(self) -> u8 {
        match self {
            Outcome::Converged(n)
            | Outcome::SaturatedLow(n)
            | Outcome::SaturatedHigh(n)
            | Outcome::Exhausted(n) => n,
        }
    }

    #[inline]
    pub fn is_converged(self) -> bool {
        matches!(self, Outcome::Converged(_))
    }
}

/// Result of a run: the final setting and the sample taken at it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Calibration {
    pub outcome: Outcome,
    pub profile: Profile,
    pub raw: u16,
}

#[derive(Copy, Clone, Debug)]
pub struct Calibrator {
    config: CalibrationConfig,
}

impl Calibrator {
    pub const fn new(config: CalibrationConfig) -> Self {
        Self { config }
    }

    /// Hill-climb `sensor` into the target band, starting from its current profile.
    ///
    /// Sensor errors abort the run immediately; the sensor keeps whatever setting it had reached.
    pub fn run<S: LightSensor>(&self, sensor: &mut S) -> Result<Calibration, S::Error> {
        let mut adjustments = 0u8;

        loop {
            let raw = sensor.sample()?;
            let v = normalize(raw);
            let profile = sensor.profile();

            let next = if v < self.config.low_threshold {
                match profile.brighter() {
                    Some(p) => p,
                    None => return Ok(self.finish(Outcome::SaturatedLow(adjustments), profile, raw)),
                }
            } else if v > self.config.high_threshold {
                match profile.dimmer() {
                    Some(p) => p,
                    None => {
                        return Ok(self.finish(Outcome::SaturatedHigh(adjustments), profile, raw))
                    }
                }
            } else {
                return Ok(self.finish(Outcome::Converged(adjustments), profile, raw));
            };

            if adjustments >= self.config.max_adjustments {
                return Ok(self.finish(Outcome::Exhausted(adjustments), profile, raw));
            }

            sensor.apply(next)?;
            adjustments += 1;
        }
    }

    fn finish(&self, outcome: Outcome, profile: Profile, raw: u16) -> Calibration {
        debug!(
            "calibration {:?}: gain {:?}, {} ms, raw {}",
            outcome,
            profile.gain,
            profile.time.millis(),
            raw
        );
        Calibration {
            outcome,
            profile,
            raw,
        }
    }
}

impl Default for Calibrator {
    fn default() -> Self {
        Self::new(CalibrationConfig::DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sensor whose count is proportional to gain multiplier x integration time.
    struct Linear {
        profile: Profile,
        /// Counts per ms at Low gain.
        flux: f32,
        applies: u32,
        gain_changes: u32,
        longest_time_run: u32,
        time_run: u32,
    }

    impl Linear {
        fn new(flux: f32, profile: Profile) -> Self {
            Self {
                profile,
                flux,
                applies: 0,
                gain_changes: 0,
                longest_time_run: 0,
                time_run: 0,
            }
        }
    }

    impl LightSensor for Linear {
        type Error = ();

        fn profile(&self) -> Profile {
            self.profile
        }

        fn apply(&mut self, profile: Profile) -> Result<(), ()> {
            if profile.gain != self.profile.gain {
                self.gain_changes += 1;
                self.time_run = 0;
            } else {
                self.time_run += 1;
                self.longest_time_run = self.longest_time_run.max(self.time_run);
            }
            self.profile = profile;
            self.applies += 1;
            Ok(())
        }

        fn sample(&mut self) -> Result<u16, ()> {
            let counts = self.flux
                * self.profile.gain.multiplier()
                * self.profile.time.millis() as f32;
            Ok(counts.min(65535.0) as u16)
        }
    }

    /// Sensor that flips between too dark and too bright on every change.
    struct Flicker {
        profile: Profile,
        dark: bool,
    }

    impl LightSensor for Flicker {
        type Error = ();

        fn profile(&self) -> Profile {
            self.profile
        }

        fn apply(&mut self, profile: Profile) -> Result<(), ()> {
            self.profile = profile;
            self.dark = !self.dark;
            Ok(())
        }

        fn sample(&mut self) -> Result<u16, ()> {
            Ok(if self.dark { 10 } else { 65000 })
        }
    }

    struct Broken;

    impl LightSensor for Broken {
        type Error = &'static str;

        fn profile(&self) -> Profile {
            Profile::DEFAULT
        }

        fn apply(&mut self, _: Profile) -> Result<(), &'static str> {
            Ok(())
        }

        fn sample(&mut self) -> Result<u16, &'static str> {
            Err("nack")
        }
    }

    #[test]
    fn lattice_walk_covers_every_profile() {
        let mut p = Profile::MIN;
        let mut seen = 1;
        while let Some(next) = p.brighter() {
            assert_eq!(next.rank(), p.rank() + 1);
            assert_eq!(next.dimmer(), Some(p));
            p = next;
            seen += 1;
        }
        assert_eq!(p, Profile::MAX);
        assert_eq!(seen, 24);
        assert_eq!(Profile::all().count(), 24);
        assert_eq!(Profile::MIN.dimmer(), None);
    }

    #[test]
    fn gain_step_resets_time() {
        let p = Profile::new(Gain::Low, IntegrationTime::Ms600);
        assert_eq!(p.brighter(), Some(Profile::new(Gain::Medium, IntegrationTime::Ms100)));
        let q = Profile::new(Gain::High, IntegrationTime::Ms100);
        assert_eq!(q.dimmer(), Some(Profile::new(Gain::Medium, IntegrationTime::Ms600)));
    }

    #[test]
    fn already_in_band_needs_no_adjustment() {
        // 200 ms at Low gain -> 30000 counts
        let mut sensor = Linear::new(150.0, Profile::DEFAULT);
        let cal = Calibrator::default().run(&mut sensor).unwrap();
        assert_eq!(cal.outcome, Outcome::Converged(0));
        assert_eq!(cal.raw, 30000);
        assert_eq!(sensor.applies, 0);
    }

    #[test]
    fn dim_source_climbs_into_band() {
        let mut sensor = Linear::new(0.05, Profile::DEFAULT);
        let cal = Calibrator::default().run(&mut sensor).unwrap();
        assert!(cal.outcome.is_converged());
        let v = normalize(cal.raw);
        assert!((0.10..=0.90).contains(&v), "v = {v}");
        assert_eq!(cal.profile, sensor.profile);
        assert!(cal.profile.gain > Gain::Low);
    }

    #[test]
    fn bright_source_steps_down_into_band() {
        let mut sensor = Linear::new(300.0, Profile::new(Gain::Medium, IntegrationTime::Ms300));
        let cal = Calibrator::default().run(&mut sensor).unwrap();
        assert!(cal.outcome.is_converged());
        assert!((0.10..=0.90).contains(&normalize(cal.raw)));
    }

    #[test]
    fn darkness_saturates_low_at_the_top() {
        let mut sensor = Linear::new(0.0, Profile::DEFAULT);
        let cal = Calibrator::default().run(&mut sensor).unwrap();
        assert_eq!(cal.outcome, Outcome::SaturatedLow(22));
        assert_eq!(cal.profile, Profile::MAX);
    }

    #[test]
    fn glare_saturates_high_at_the_bottom() {
        let mut sensor = Linear::new(10_000.0, Profile::DEFAULT);
        let cal = Calibrator::default().run(&mut sensor).unwrap();
        assert_eq!(cal.outcome, Outcome::SaturatedHigh(1));
        assert_eq!(cal.profile, Profile::MIN);
    }

    #[test]
    fn monotonic_sensor_stays_within_bounds() {
        let gain_steps = (Gain::ALL.len() - 1) as u32;
        let time_steps = (IntegrationTime::ALL.len() - 1) as u32;

        for start in Profile::all() {
            for &flux in &[0.0, 0.01, 0.5, 40.0, 500.0, 1e6] {
                let mut sensor = Linear::new(flux, start);
                let cal = Calibrator::default().run(&mut sensor).unwrap();
                assert!(!matches!(cal.outcome, Outcome::Exhausted(_)));
                assert!(cal.outcome.adjustments() <= 23);
                assert!(sensor.gain_changes <= gain_steps);
                assert!(sensor.longest_time_run <= time_steps);
                if cal.outcome.is_converged() {
                    assert!((0.10..=0.90).contains(&normalize(cal.raw)));
                }
            }
        }
    }

    #[test]
    fn oscillating_sensor_hits_the_budget() {
        let mut sensor = Flicker {
            profile: Profile::DEFAULT,
            dark: true,
        };
        let calibrator = Calibrator::new(CalibrationConfig {
            max_adjustments: 5,
            ..CalibrationConfig::DEFAULT
        });
        let cal = calibrator.run(&mut sensor).unwrap();
        assert_eq!(cal.outcome, Outcome::Exhausted(5));
    }

    #[test]
    fn sensor_error_aborts() {
        assert_eq!(Calibrator::default().run(&mut Broken), Err("nack"));
    }
}
