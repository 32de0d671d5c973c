// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin definitions for the STM32F777 on the PAY-Optical board.

use stm32f7xx_hal::{
    gpio::{gpioa, gpiob, gpiod, Alternate, Analog, OpenDrain, Output, PushPull},
    pac,
    prelude::*,
};

/// All board pins. Construct this once at startup using:
///
/// ```rust
/// let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOD);
/// ```
pub struct BoardPins {
    pub usart1: Usart1Pins,
    pub i2c1: I2c1Pins,
    pub spi1: Spi1SlavePins,
    pub power: PowerPins,
    /// Host ready line, active low.
    pub ready: gpiod::PD0<Output<PushPull>>,
}

/// Debug console
pub struct Usart1Pins {
    pub tx: gpioa::PA9<Alternate<7>>,
    pub rx: gpioa::PA10<Alternate<7>>,
}

/// Sensor bus (multiplexers, expanders)
pub struct I2c1Pins {
    pub scl: gpiob::PB8<Alternate<4, OpenDrain>>,
    pub sda: gpiob::PB9<Alternate<4, OpenDrain>>,
}

/// Host link, SPI1 slave with hardware NSS
pub struct Spi1SlavePins {
    pub sck: gpiob::PB3<Alternate<5>>,
    pub miso: gpiob::PB4<Alternate<5>>,
    pub mosi: gpiob::PB5<Alternate<5>>,
    pub nss: gpioa::PA15<Alternate<5>>,
}

/// Power monitor inputs and the sensor-rail load switch
pub struct PowerPins {
    pub current: gpioa::PA6<Analog>, // ADC1_IN6
    pub voltage: gpioa::PA7<Analog>, // ADC1_IN7
    pub load_switch: gpiob::PB1<Output<PushPull>>,
}

impl BoardPins {
    /// Create all named pins from raw GPIO peripherals.
    pub fn new(gpioa: pac::GPIOA, gpiob: pac::GPIOB, gpiod: pac::GPIOD) -> Self {
        let gpioa = gpioa.split();
        let gpiob = gpiob.split();
        let gpiod = gpiod.split();

        Self {
            usart1: Usart1Pins {
                tx: gpioa.pa9.into_alternate::<7>(),
                rx: gpioa.pa10.into_alternate::<7>(),
            },

            i2c1: I2c1Pins {
                scl: gpiob.pb8.into_alternate_open_drain::<4>(),
                sda: gpiob.pb9.into_alternate_open_drain::<4>(),
            },

            spi1: Spi1SlavePins {
                sck: gpiob.pb3.into_alternate::<5>(),
                miso: gpiob.pb4.into_alternate::<5>(),
                mosi: gpiob.pb5.into_alternate::<5>(),
                nss: gpioa.pa15.into_alternate::<5>(),
            },

            power: PowerPins {
                current: gpioa.pa6.into_analog(),
                voltage: gpioa.pa7.into_analog(),
                load_switch: gpiob.pb1.into_push_pull_output(),
            },

            ready: gpiod.pd0.into_push_pull_output(),
        }
    }
}
