// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! ADC1 for the power monitor, using direct PAC register access.
//!
//! Blocking single-channel conversions, software triggered, right aligned.
//!
//! ```no_run
//! let adc = Adc1::new(dp.ADC1, 12);
//! let counts = adc.read(6);
//! ```

use stm32f7xx_hal::pac;

use crate::power::AdcRead;

pub struct Adc1 {
    adc: pac::ADC1,
}

/// CR1.RES encoding for a resolution in bits. Unsupported widths fall back to 12.
fn res_bits(bits: u8) -> u8 {
    match bits {
        10 => 0b01,
        8 => 0b10,
        6 => 0b11,
        _ => 0b00,
    }
}

impl Adc1 {
    /// Clock, configure and power up ADC1 at the given resolution (12, 10, 8 or 6 bits).
    pub fn new(adc: pac::ADC1, resolution_bits: u8) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb2enr.modify(|_, w| w.adc1en().set_bit());

        let common = unsafe { &*pac::ADC_COMMON::ptr() };
        // PCLK2 / 4
        common.ccr.modify(|_, w| w.adcpre().div4());

        adc.cr2.modify(|_, w| w.adon().clear_bit());
        adc.cr1
            .modify(|_, w| w.res().bits(res_bits(resolution_bits)));
        adc.cr2.modify(|_, w| {
            w.cont().clear_bit();
            w.align().right();
            w.exten().disabled();
            w
        });
        adc.cr2.modify(|_, w| w.adon().set_bit());

        Self { adc }
    }

    /// Convert one channel (0..=9) with the longest sample time.
    pub fn read(&self, channel: u8) -> u16 {
        let adc = &self.adc;

        adc.smpr2.modify(|_, w| match channel {
            0 => w.smp0().bits(0b111),
            1 => w.smp1().bits(0b111),
            2 => w.smp2().bits(0b111),
            3 => w.smp3().bits(0b111),
            4 => w.smp4().bits(0b111),
            5 => w.smp5().bits(0b111),
            6 => w.smp6().bits(0b111),
            7 => w.smp7().bits(0b111),
            8 => w.smp8().bits(0b111),
            _ => w.smp9().bits(0b111),
        });

        // one conversion in the regular sequence
        adc.sqr1.modify(|_, w| w.l().bits(0));
        adc.sqr3
            .modify(|_, w| unsafe { w.sq1().bits(channel & 0x1F) });

        adc.cr2.modify(|_, w| w.swstart().set_bit());
        while adc.sr.read().eoc().bit_is_clear() {}

        adc.dr.read().data().bits()
    }

    pub fn free(self) -> pac::ADC1 {
        self.adc
    }
}

impl AdcRead for Adc1 {
    fn read_channel(&mut self, ch: u8) -> u16 {
        self.read(ch)
    }
}
