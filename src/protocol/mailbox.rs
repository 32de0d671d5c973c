// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Single-slot mailbox between the SPI interrupt and the foreground loop.

use core::cell::Cell;

use critical_section::Mutex;

/// Holds at most one pending item. Safe to share as a `static`.
pub struct Mailbox<T: Copy> {
    slot: Mutex<Cell<Option<T>>>,
}

impl<T: Copy> Mailbox<T> {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(Cell::new(None)),
        }
    }

    /// Store `item`, replacing anything still pending. Returns `false` if something was replaced.
    pub fn post(&self, item: T) -> bool {
        critical_section::with(|cs| self.slot.borrow(cs).replace(Some(item)).is_none())
    }

    /// Remove and return the pending item.
    pub fn take(&self) -> Option<T> {
        critical_section::with(|cs| self.slot.borrow(cs).take())
    }

    pub fn is_empty(&self) -> bool {
        critical_section::with(|cs| self.slot.borrow(cs).get().is_none())
    }
}

impl<T: Copy> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}
