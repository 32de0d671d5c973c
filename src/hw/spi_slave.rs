// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! SPI1 in slave mode, driven from the RXNE interrupt.
//!
//! The host is the bus master. Each completed byte raises RXNE; the handler reads DR and queues
//! the next outgoing byte. DR is accessed as a byte register: a 16-bit access with an 8-bit frame
//! size would pack two frames into the FIFO.
//!
//! Mode 0 (CPOL = 0, CPHA = 0), MSB first, hardware NSS.

use core::ptr;

use embedded_hal::digital::OutputPin;
use stm32f7xx_hal::pac;

use crate::hw::pins::Spi1SlavePins;
use crate::protocol::SlavePort;
use crate::signal::Signal;

pub struct SpiSlave<PIN: OutputPin> {
    spi: pac::SPI1,
    _pins: Spi1SlavePins,
    ready: Signal<PIN>,
    last: u8,
}

impl<PIN: OutputPin> SpiSlave<PIN> {
    /// Configure SPI1 as an 8-bit slave with the RX interrupt enabled.
    ///
    /// `ready` is the line telling the host a reply byte is loaded.
    pub fn spi1(spi: pac::SPI1, pins: Spi1SlavePins, ready: Signal<PIN>) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb2enr.modify(|_, w| w.spi1en().set_bit());

        spi.cr1.modify(|_, w| w.spe().clear_bit());
        spi.cr1.modify(|_, w| {
            w.mstr().clear_bit();
            w.cpol().clear_bit();
            w.cpha().clear_bit();
            w.lsbfirst().clear_bit();
            w.ssm().clear_bit();
            w.bidimode().clear_bit();
            w.rxonly().clear_bit();
            w
        });
        spi.cr2.modify(|_, w| {
            // 8-bit frames, RXNE on one byte
            unsafe { w.ds().bits(0b0111) };
            w.frxth().set_bit();
            w.rxneie().set_bit();
            w
        });
        spi.cr1.modify(|_, w| w.spe().set_bit());

        let mut slave = Self {
            spi,
            _pins: pins,
            ready,
            last: 0,
        };
        slave.load(0x00);
        slave
    }

    /// Clear an overrun, returning whether one had occurred.
    pub fn clear_overrun(&mut self) -> bool {
        if self.spi.sr.read().ovr().bit_is_set() {
            let _ = self.read_dr();
            let _ = self.spi.sr.read();
            true
        } else {
            false
        }
    }

    #[inline]
    fn read_dr(&mut self) -> u8 {
        unsafe { ptr::read_volatile(&self.spi.dr as *const _ as *const u8) }
    }

    pub fn free(self) -> (pac::SPI1, Spi1SlavePins, Signal<PIN>) {
        (self.spi, self._pins, self.ready)
    }
}

impl<PIN: OutputPin> SlavePort for SpiSlave<PIN> {
    fn read(&mut self) -> u8 {
        self.read_dr()
    }

    fn load(&mut self, byte: u8) {
        unsafe { ptr::write_volatile(self.spi.dr.as_ptr() as *mut u8, byte) };
        self.last = byte;
    }

    fn last_loaded(&self) -> u8 {
        self.last
    }

    fn set_ready(&mut self, asserted: bool) {
        self.ready.set(asserted).ok();
    }
}
