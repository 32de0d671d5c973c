// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! STM32F7 board support: host SPI slave, ADC, debug console, logger, pins and HAL adapters.

pub mod adc;
pub mod compat;
pub mod logger;
pub mod pins;
pub mod spi_slave;
pub mod usart;

pub use adc::Adc1;
pub use compat::Compat;
pub use pins::BoardPins;
pub use spi_slave::SpiSlave;
pub use usart::Usart;
