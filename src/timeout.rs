// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Bounded busy-wait loops.
//!
//! Every wait on a device flag goes through [`spin_until`] with an explicit poll budget, so a device
//! that never answers turns into [`Error::Timeout`] instead of a hang.

use crate::error::Error;

/// Poll `ready` until it reports `true`, at most `budget` times.
///
/// `idle` runs between two unsuccessful polls (typically a short delay). Bus errors raised by
/// `ready` are returned immediately.
pub fn spin_until<E, R, W>(budget: u32, mut ready: R, mut idle: W) -> Result<(), Error<E>>
where
    R: FnMut() -> Result<bool, Error<E>>,
    W: FnMut(),
{
    for attempt in 0..budget {
        if ready()? {
            return Ok(());
        }
        if attempt + 1 < budget {
            idle();
        }
    }
    Err(Error::Timeout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_once_ready() {
        let mut polls = 0;
        let mut idles = 0;
        let res: Result<(), Error<()>> = spin_until(
            10,
            || {
                polls += 1;
                Ok(polls == 3)
            },
            || idles += 1,
        );
        assert_eq!(res, Ok(()));
        assert_eq!(polls, 3);
        assert_eq!(idles, 2);
    }

    #[test]
    fn exhausted_budget_is_a_timeout() {
        let mut polls = 0;
        let res: Result<(), Error<()>> = spin_until(
            5,
            || {
                polls += 1;
                Ok(false)
            },
            || {},
        );
        assert_eq!(res, Err(Error::Timeout));
        assert_eq!(polls, 5);
    }

    #[test]
    fn bus_error_stops_polling() {
        let mut polls = 0;
        let res: Result<(), Error<u8>> = spin_until(
            5,
            || {
                polls += 1;
                Err(Error::Bus(7))
            },
            || {},
        );
        assert_eq!(res, Err(Error::Bus(7)));
        assert_eq!(polls, 1);
    }

    #[test]
    fn zero_budget_never_polls() {
        let res: Result<(), Error<()>> = spin_until(0, || Ok(true), || {});
        assert_eq!(res, Err(Error::Timeout));
    }
}
