// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Error type shared by the drivers and the acquisition pipeline.

/// Errors surfaced by bus-level operations.
///
/// `E` is the error type of the underlying I2C implementation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error<E> {
    /// An I2C transaction failed (NACK, arbitration loss, ...).
    Bus(E),
    /// A bounded poll loop ran out of budget before the device reported ready.
    Timeout,
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::Bus(e)
    }
}
