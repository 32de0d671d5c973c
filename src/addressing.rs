// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Well to hardware path mapping.
//!
//! Sensors sit eight to a multiplexer in well order. The optical-density LEDs are on the two
//! sensing-board expanders in the same order. The LED boards are wired differently: each board
//! serves two non-adjacent groups of eight wells, and for the first sixteen wells the two 8-pin
//! halves of the port are crossed.

use crate::registry::{Mode, WellIndex};

/// The four port expanders, in [`BoardConfig::expander_addresses`](crate::config::BoardConfig)
/// order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Expander {
    /// Sensing board, wells 0..=15.
    Sense1,
    /// Sensing board, wells 16..=31.
    Sense2,
    /// LED board 1.
    Led1,
    /// LED board 2.
    Led2,
}

impl Expander {
    pub const ALL: [Expander; 4] = [
        Expander::Sense1,
        Expander::Sense2,
        Expander::Led1,
        Expander::Led2,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Hardware path for one (well, mode) pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Route {
    /// Multiplexer index, 0..=3.
    pub mux: u8,
    /// Channel on that multiplexer, 0..=7.
    pub channel: u8,
    /// Expander driving the well's LED.
    pub expander: Expander,
    /// Expander pin, 0..=15.
    pub pin: u8,
}

pub fn resolve(well: WellIndex, mode: Mode) -> Route {
    let w = well.get();
    let (expander, pin) = match mode {
        Mode::OpticalDensity => {
            let expander = if w < 16 { Expander::Sense1 } else { Expander::Sense2 };
            (expander, w % 16)
        }
        Mode::Fluorescence => {
            let expander = match w {
                0..=7 | 16..=23 => Expander::Led2,
                _ => Expander::Led1,
            };
            let crossed = match w {
                0..=7 => w + 8,
                8..=15 => w - 8,
                _ => w,
            };
            (expander, crossed % 16)
        }
    };

    Route {
        mux: w / 8,
        channel: w % 8,
        expander,
        pin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(w: u8, mode: Mode) -> Route {
        resolve(WellIndex::from_low_bits(w), mode)
    }

    #[test]
    fn mux_and_channel_follow_well_order() {
        for w in WellIndex::all() {
            for mode in Mode::ALL {
                let r = resolve(w, mode);
                assert_eq!(r.mux * 8 + r.channel, w.get());
            }
        }
    }

    #[test]
    fn optical_density_uses_sensing_expanders() {
        assert_eq!(route(0, Mode::OpticalDensity).expander, Expander::Sense1);
        assert_eq!(route(15, Mode::OpticalDensity).pin, 15);
        let r = route(20, Mode::OpticalDensity);
        assert_eq!((r.expander, r.pin), (Expander::Sense2, 4));
    }

    #[test]
    fn fluorescence_crosses_halves_below_sixteen() {
        let r = route(5, Mode::Fluorescence);
        assert_eq!((r.expander, r.pin), (Expander::Led2, 13));
        let r = route(12, Mode::Fluorescence);
        assert_eq!((r.expander, r.pin), (Expander::Led1, 4));
        let r = route(18, Mode::Fluorescence);
        assert_eq!((r.expander, r.pin), (Expander::Led2, 2));
        let r = route(30, Mode::Fluorescence);
        assert_eq!((r.expander, r.pin), (Expander::Led1, 14));
    }

    #[test]
    fn routes_are_distinct_per_mode() {
        for mode in Mode::ALL {
            let mut used = [[false; 16]; 4];
            for w in WellIndex::all() {
                let r = resolve(w, mode);
                let slot = &mut used[r.expander.index()][r.pin as usize];
                assert!(!*slot, "well {} collides in {:?}", w.get(), mode);
                *slot = true;
            }
        }
    }
}
