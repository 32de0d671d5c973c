// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Simulated sensing board for host tests.
//!
//! One `embedded_hal::i2c::I2c` implementation models the four multiplexers, the four port
//! expanders and the 32 light sensors. A sensor is only reachable when exactly one multiplexer
//! channel on the whole bus is enabled, and it sees light only while the LED of its well is on.

#![allow(dead_code)]

use embedded_hal::i2c::{self, ErrorKind, I2c, NoAcknowledgeSource, Operation};

use pay_optical::addressing::{resolve, Expander};
use pay_optical::config::BoardConfig;
use pay_optical::drivers::tsl2591::{self, Gain, IntegrationTime};
use pay_optical::drivers::{mcp23017, tca9548a};
use pay_optical::registry::{Mode, WellIndex, WELL_COUNT};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Nack(pub u8);

impl i2c::Error for Nack {
    fn kind(&self) -> ErrorKind {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct SimMux {
    pub address: u8,
    pub mask: u8,
}

#[derive(Copy, Clone, Debug)]
pub struct SimExpander {
    pub address: u8,
    pub regs: [u8; 0x16],
    pointer: u8,
}

impl SimExpander {
    pub fn outputs(&self) -> u16 {
        u16::from_le_bytes([
            self.regs[mcp23017::reg::GPIOA as usize],
            self.regs[mcp23017::reg::GPIOB as usize],
        ])
    }
}

#[derive(Copy, Clone, Debug)]
pub struct SimSensor {
    pub enable: u8,
    pub control: u8,
    /// Counts per millisecond at low gain, per mode, while the mode's LED is lit.
    pub flux: [f32; 2],
    /// Never reports valid data.
    pub stuck: bool,
    /// CONTROL writes while the device was awake.
    pub hot_reconfigures: usize,
    pointer: u8,
}

impl SimSensor {
    pub fn gain(&self) -> Gain {
        Gain::from_code((self.control >> 4) & 0x3).unwrap()
    }

    pub fn time(&self) -> IntegrationTime {
        IntegrationTime::from_code(self.control & 0x7).unwrap()
    }
}

pub struct SimBus {
    pub muxes: [SimMux; 4],
    pub expanders: [SimExpander; 4],
    pub sensors: [SimSensor; WELL_COUNT],
    /// Addresses that NACK every transaction.
    pub dead: Vec<u8>,
    /// Every transaction, in order: (address, was a write).
    pub log: Vec<(u8, bool)>,
}

impl SimBus {
    pub fn new(config: &BoardConfig) -> Self {
        let mut muxes = [SimMux::default(); 4];
        for (m, hw) in muxes.iter_mut().zip(config.mux_addresses) {
            m.address = tca9548a::BASE_ADDRESS | hw;
        }
        let blank = SimExpander {
            address: 0,
            regs: [0; 0x16],
            pointer: 0,
        };
        let mut expanders = [blank; 4];
        for (e, hw) in expanders.iter_mut().zip(config.expander_addresses) {
            e.address = mcp23017::BASE_ADDRESS | hw;
            // power-on default: all inputs
            e.regs[mcp23017::reg::IODIRA as usize] = 0xFF;
            e.regs[mcp23017::reg::IODIRB as usize] = 0xFF;
        }
        let sensor = SimSensor {
            enable: 0,
            control: 0,
            flux: [0.0; 2],
            stuck: false,
            hot_reconfigures: 0,
            pointer: 0,
        };
        Self {
            muxes,
            expanders,
            sensors: [sensor; WELL_COUNT],
            dead: Vec::new(),
            log: Vec::new(),
        }
    }

    /// Light every well in both modes with the same flux.
    pub fn with_flux(mut self, flux: f32) -> Self {
        for s in self.sensors.iter_mut() {
            s.flux = [flux; 2];
        }
        self
    }

    pub fn set_flux(&mut self, well: u8, mode: Mode, flux: f32) {
        self.sensors[well as usize].flux[mode.index()] = flux;
    }

    pub fn expander(&self, which: Expander) -> &SimExpander {
        &self.expanders[which.index()]
    }

    pub fn any_channel_enabled(&self) -> bool {
        self.muxes.iter().any(|m| m.mask != 0)
    }

    pub fn any_led_on(&self) -> bool {
        self.expanders.iter().any(|e| e.outputs() != 0)
    }

    pub fn led_on(&self, well: u8, mode: Mode) -> bool {
        let route = resolve(WellIndex::from_low_bits(well), mode);
        self.expander(route.expander).outputs() & (1 << route.pin) != 0
    }

    /// Well whose sensor is currently connected, if exactly one channel is enabled.
    fn connected_well(&self) -> Option<usize> {
        let mut found = None;
        for (i, m) in self.muxes.iter().enumerate() {
            match m.mask.count_ones() {
                0 => {}
                1 if found.is_none() => found = Some(i * 8 + m.mask.trailing_zeros() as usize),
                _ => return None,
            }
        }
        found
    }

    fn ch0(&self, well: usize) -> u16 {
        let s = &self.sensors[well];
        let lit: f32 = Mode::ALL
            .iter()
            .filter(|&&m| self.led_on(well as u8, m))
            .map(|&m| s.flux[m.index()])
            .sum();
        let counts = lit * s.gain().multiplier() * s.time().millis() as f32;
        counts.clamp(0.0, 65535.0) as u16
    }

    fn sensor_write(&mut self, well: usize, bytes: &[u8]) -> Result<(), Nack> {
        let Some((&cmd, data)) = bytes.split_first() else {
            return Ok(());
        };
        if cmd & 0xE0 != tsl2591::COMMAND {
            return Err(Nack(tsl2591::ADDRESS));
        }
        let s = &mut self.sensors[well];
        s.pointer = cmd & 0x1F;
        for &b in data {
            match s.pointer {
                tsl2591::reg::ENABLE => s.enable = b,
                tsl2591::reg::CONTROL => {
                    if s.enable != 0 {
                        s.hot_reconfigures += 1;
                    }
                    s.control = b;
                }
                _ => {}
            }
            s.pointer += 1;
        }
        Ok(())
    }

    fn sensor_read(&mut self, well: usize, buf: &mut [u8]) {
        let ch0 = self.ch0(well);
        let s = &mut self.sensors[well];
        let ch1 = ch0 / 4;
        for b in buf.iter_mut() {
            *b = match s.pointer {
                tsl2591::reg::ENABLE => s.enable,
                tsl2591::reg::CONTROL => s.control,
                tsl2591::reg::ID => tsl2591::DEVICE_ID,
                tsl2591::reg::STATUS => {
                    let valid = s.enable == tsl2591::ENABLE_PON_AEN && !s.stuck;
                    valid as u8
                }
                0x14 => ch0 as u8,
                0x15 => (ch0 >> 8) as u8,
                0x16 => ch1 as u8,
                0x17 => (ch1 >> 8) as u8,
                _ => 0,
            };
            s.pointer += 1;
        }
    }

    fn op(&mut self, address: u8, op: &mut Operation<'_>) -> Result<(), Nack> {
        self.log
            .push((address, matches!(op, Operation::Write(_))));
        if self.dead.contains(&address) {
            return Err(Nack(address));
        }

        if let Some(m) = self.muxes.iter_mut().find(|m| m.address == address) {
            match op {
                Operation::Write(bytes) => {
                    if let Some(&mask) = bytes.last() {
                        m.mask = mask;
                    }
                }
                Operation::Read(buf) => buf.fill(m.mask),
            }
            return Ok(());
        }

        if let Some(e) = self.expanders.iter_mut().find(|e| e.address == address) {
            match op {
                Operation::Write(bytes) => {
                    if let Some((&reg, data)) = bytes.split_first() {
                        e.pointer = reg;
                        for &b in data {
                            if let Some(r) = e.regs.get_mut(e.pointer as usize) {
                                *r = b;
                            }
                            e.pointer += 1;
                        }
                    }
                }
                Operation::Read(buf) => {
                    for b in buf.iter_mut() {
                        *b = e.regs.get(e.pointer as usize).copied().unwrap_or(0);
                        e.pointer += 1;
                    }
                }
            }
            return Ok(());
        }

        if address == tsl2591::ADDRESS {
            let well = self.connected_well().ok_or(Nack(address))?;
            return match op {
                Operation::Write(bytes) => self.sensor_write(well, bytes),
                Operation::Read(buf) => {
                    self.sensor_read(well, buf);
                    Ok(())
                }
            };
        }

        Err(Nack(address))
    }
}

impl i2c::ErrorType for SimBus {
    type Error = Nack;
}

impl I2c for SimBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for op in operations.iter_mut() {
            self.op(address, op)?;
        }
        Ok(())
    }
}

/// Delay that only counts elapsed time.
#[derive(Default)]
pub struct SimDelay {
    pub elapsed_ns: u64,
}

impl embedded_hal::delay::DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += ns as u64;
    }
}
