// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # PAY-Optical Firmware
//!
//! Firmware for the PAY-Optical sensing board: 32 sample wells, each with a TSL2591 light sensor
//! and an illumination LED, reached through four TCA9548A I2C multiplexers and four MCP23017 port
//! expanders. A host board requests calibrated readings and power telemetry over a slave-mode SPI
//! link with a separate ready line.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`drivers`] | Device-level drivers (TSL2591, TCA9548A, MCP23017) |
//! | [`registry`] | Per-well sensor handles, calibration profiles and last readings |
//! | [`addressing`] | Well and mode to multiplexer channel and LED pin |
//! | [`calibration`] | Gain / integration-time auto-ranging |
//! | [`reading`] | Packed 24-bit reading word |
//! | [`pipeline`] | End-to-end acquisition for one well |
//! | [`power`] | Power telemetry and the sensor-rail load switch |
//! | [`protocol`] | Host command server, mailbox and dispatcher |
//! | [`config`] | Static board configuration |
//! | [`hw`] | STM32F7 board support (feature `board`) |
//!
//! Everything except [`hw`] is written against `embedded-hal` 1.0 traits and builds and tests on
//! the host.
//!
//! ## Getting Started
//!
//! Run the host tests:
//!
//! ```bash
//! cargo test
//! ```
//!
//! Flash the board:
//!
//! ```bash
//! cargo run --release --features board --target thumbv7em-none-eabihf
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

pub mod addressing;
pub mod calibration;
pub mod config;
pub mod drivers;
pub mod error;
pub mod pipeline;
pub mod power;
pub mod protocol;
pub mod reading;
pub mod registry;
pub mod signal;
pub mod timeout;

#[cfg(feature = "board")]
pub mod hw;

pub use error::Error;
