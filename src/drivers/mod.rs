// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Device-Specific Drivers
//!
//! Register-level drivers for the parts on the sensing and LED boards. They sit above the
//! `embedded-hal` bus traits and below the acquisition pipeline. None of them own the bus: every
//! call takes `&mut I2C`, so all devices share the one I2C peripheral.
//!
//! ## Drivers
//!
//! - [`tsl2591`] – AMS TSL2591 light-to-digital converter (one per well)
//! - [`tca9548a`] – TI TCA9548A 8-channel I2C multiplexer (four on the sensing board)
//! - [`mcp23017`] – Microchip MCP23017 16-bit port expander (LED drive)

pub mod mcp23017;
pub mod tca9548a;
pub mod tsl2591;

pub use mcp23017::Mcp23017;
pub use tca9548a::Tca9548a;
pub use tsl2591::{Gain, IntegrationTime, Tsl2591};
