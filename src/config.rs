// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Static board configuration.
//!
//! Hardware addresses, calibration thresholds and power-monitor constants for the PAY-Optical
//! board. Everything here is `Copy` and available as a `const DEFAULT`, so the firmware can build
//! its configuration at compile time and tests can tweak individual fields.

/// Number of I2C multiplexers on the sensing board.
pub const MUX_COUNT: usize = 4;

/// Number of port expanders (two on the sensing board, one per LED board).
pub const EXPANDER_COUNT: usize = 4;

/// Board-level configuration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoardConfig {
    /// Hardware address bits (A2..A0) of each multiplexer, in well order.
    pub mux_addresses: [u8; MUX_COUNT],
    /// Hardware address bits (A2..A0) of each port expander, indexed by
    /// [`Expander::index`](crate::addressing::Expander::index).
    pub expander_addresses: [u8; EXPANDER_COUNT],
    pub calibration: CalibrationConfig,
    pub power: PowerConfig,
}

impl BoardConfig {
    pub const DEFAULT: Self = Self {
        // Mux 2 and 4 are strapped out of order on the sensing board.
        mux_addresses: [0b000, 0b011, 0b010, 0b100],
        // Sense1, Sense2, Led1, Led2
        expander_addresses: [0b001, 0b010, 0b011, 0b100],
        calibration: CalibrationConfig::DEFAULT,
        power: PowerConfig::DEFAULT,
    };
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Auto-ranging parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CalibrationConfig {
    /// Lower edge of the target band, as a fraction of full scale.
    pub low_threshold: f32,
    /// Upper edge of the target band, as a fraction of full scale.
    pub high_threshold: f32,
    /// Hard cap on setting changes per calibration run.
    pub max_adjustments: u8,
    /// Number of STATUS polls before a reading is declared timed out.
    pub status_poll_budget: u32,
    /// Delay between two STATUS polls.
    pub status_poll_interval_us: u32,
    /// Extra wait after waking the sensor, on top of one integration period.
    pub settle_margin_ms: u32,
}

impl CalibrationConfig {
    pub const DEFAULT: Self = Self {
        low_threshold: 0.10,
        high_threshold: 0.90,
        // 6 integration times x 4 gains, minus the starting point.
        max_adjustments: 23,
        status_poll_budget: 200,
        status_poll_interval_us: 1_000,
        settle_margin_ms: 10,
    };
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Power monitor and sensor load switch parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PowerConfig {
    /// ADC channel wired to the current-sense amplifier output.
    pub current_channel: u8,
    /// ADC channel wired to the sensor rail (after the load switch).
    pub voltage_channel: u8,
    /// ADC reference voltage in volts.
    pub vref: f32,
    /// ADC resolution in bits.
    pub adc_bits: u8,
    /// Current-sense transfer ratio in volts per ampere.
    pub current_sense_v_per_a: f32,
    /// Ratio of rail voltage to ADC input voltage.
    pub voltage_divider: f32,
    /// Time for the sensor rail to discharge after the switch opens.
    pub discharge_ms: u32,
    /// Time for the sensor rail to come up after the switch closes.
    pub charge_ms: u32,
}

impl PowerConfig {
    pub const DEFAULT: Self = Self {
        current_channel: 6,
        voltage_channel: 7,
        vref: 3.3,
        adc_bits: 12,
        current_sense_v_per_a: 1.0,
        voltage_divider: 1.0,
        discharge_ms: 350,
        charge_ms: 1,
    };
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
