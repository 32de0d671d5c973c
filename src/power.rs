// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Board power telemetry and the sensor-rail load switch.
//!
//! Current and voltage come from two ADC channels: one on the current-sense amplifier, one on the
//! switched sensor rail. Telemetry goes to the host as two 12-bit fields (mA and mV) packed into a
//! 24-bit word.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::info;
#[allow(unused_imports)]
use micromath::F32Ext;

use crate::config::PowerConfig;
use crate::signal::Signal;

/// Largest value a 12-bit telemetry field can hold.
pub const FIELD_MAX: u16 = 0x0FFF;

/// Trait for reading a single channel from an ADC peripheral.
pub trait AdcRead {
    fn read_channel(&mut self, ch: u8) -> u16;
}

/// Board power measurements in SI units.
pub trait PowerMonitor {
    /// Board current draw in amperes.
    fn read_current(&mut self) -> f32;

    /// Sensor rail voltage in volts.
    fn read_voltage(&mut self) -> f32;

    /// Power in watts.
    fn read_power(&mut self) -> f32 {
        self.read_current() * self.read_voltage()
    }
}

/// [`PowerMonitor`] over two channels of an [`AdcRead`].
pub struct AdcPowerMonitor<A: AdcRead> {
    adc: A,
    config: PowerConfig,
}

impl<A: AdcRead> AdcPowerMonitor<A> {
    pub fn new(adc: A, config: PowerConfig) -> Self {
        Self { adc, config }
    }

    /// Convert one channel to volts at the ADC pin.
    fn pin_volts(&mut self, channel: u8) -> f32 {
        let full_scale = ((1u32 << self.config.adc_bits) - 1) as f32;
        self.adc.read_channel(channel) as f32 * self.config.vref / full_scale
    }

    pub fn free(self) -> A {
        self.adc
    }
}

impl<A: AdcRead> PowerMonitor for AdcPowerMonitor<A> {
    fn read_current(&mut self) -> f32 {
        self.pin_volts(self.config.current_channel) / self.config.current_sense_v_per_a
    }

    fn read_voltage(&mut self) -> f32 {
        self.pin_volts(self.config.voltage_channel) * self.config.voltage_divider
    }
}

/// One power sample in wire units.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Telemetry {
    pub current_ma: u16,
    pub voltage_mv: u16,
}

impl Telemetry {
    pub fn sample<P: PowerMonitor>(monitor: &mut P) -> Self {
        Self {
            current_ma: to_field(monitor.read_current()),
            voltage_mv: to_field(monitor.read_voltage()),
        }
    }

    /// Bits 23..12 current (mA), bits 11..0 voltage (mV).
    pub fn encode(self) -> u32 {
        ((self.current_ma.min(FIELD_MAX) as u32) << 12) | self.voltage_mv.min(FIELD_MAX) as u32
    }
}

/// Scale SI units to milli-units, round, clamp to 12 bits.
fn to_field(value: f32) -> u16 {
    let milli = (value * 1000.0).round();
    if milli <= 0.0 {
        0
    } else if milli >= FIELD_MAX as f32 {
        FIELD_MAX
    } else {
        milli as u16
    }
}

/// Switch in front of the sensor supply rail.
pub trait LoadSwitch {
    type Error: core::fmt::Debug;

    fn enable(&mut self) -> Result<(), Self::Error>;
    fn disable(&mut self) -> Result<(), Self::Error>;
    fn is_enabled(&self) -> bool;
}

impl<PIN: OutputPin> LoadSwitch for Signal<PIN> {
    type Error = PIN::Error;

    fn enable(&mut self) -> Result<(), PIN::Error> {
        self.assert()
    }

    fn disable(&mut self) -> Result<(), PIN::Error> {
        self.deassert()
    }

    fn is_enabled(&self) -> bool {
        self.is_asserted()
    }
}

/// Sensor rail with the settle times the board needs after switching.
pub struct SensorRail<S: LoadSwitch> {
    switch: S,
    discharge_ms: u32,
    charge_ms: u32,
}

impl<S: LoadSwitch> SensorRail<S> {
    pub fn new(switch: S, config: &PowerConfig) -> Self {
        Self {
            switch,
            discharge_ms: config.discharge_ms,
            charge_ms: config.charge_ms,
        }
    }

    /// Open the switch and wait for the rail to discharge.
    pub fn off<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), S::Error> {
        self.switch.disable()?;
        delay.delay_ms(self.discharge_ms);
        info!("sensor rail off");
        Ok(())
    }

    /// Close the switch and wait for the rail to come up.
    pub fn on<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), S::Error> {
        self.switch.enable()?;
        delay.delay_ms(self.charge_ms);
        info!("sensor rail on");
        Ok(())
    }

    #[inline]
    pub fn is_on(&self) -> bool {
        self.switch.is_enabled()
    }

    pub fn free(self) -> S {
        self.switch
    }
}
