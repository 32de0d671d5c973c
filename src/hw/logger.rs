// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! `log` backend writing to the USART1 debug console.
//!
//! Every record is formatted inside a critical section, so log calls are safe from the foreground
//! loop while the SPI interrupt is live. Interrupt handlers must not log.

use core::cell::RefCell;
use core::fmt::{self, Write};

use critical_section::Mutex;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use stm32f7xx_hal::pac::USART1;

use crate::hw::usart::Usart;

static SINK: Mutex<RefCell<Option<Usart<USART1>>>> = Mutex::new(RefCell::new(None));
static LOGGER: UsartLogger = UsartLogger;

struct UsartLogger;

impl Log for UsartLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        critical_section::with(|cs| {
            if let Some(usart) = SINK.borrow_ref_mut(cs).as_mut() {
                let _ = writeln!(usart, "[{:<5}] {}", record.level(), record.args());
            }
        });
    }

    fn flush(&self) {
        critical_section::with(|cs| {
            if let Some(usart) = SINK.borrow_ref_mut(cs).as_mut() {
                usart.flush();
            }
        });
    }
}

/// Write straight to the console, bypassing the `log` facade.
pub fn write_raw(args: fmt::Arguments) {
    critical_section::with(|cs| {
        if let Some(usart) = SINK.borrow_ref_mut(cs).as_mut() {
            let _ = usart.write_fmt(args);
        }
    });
}

/// Install `usart` as the global log sink. The console stays usable through [`write_raw`] even
/// when this fails.
pub fn init(usart: Usart<USART1>, level: LevelFilter) -> Result<(), SetLoggerError> {
    critical_section::with(|cs| SINK.borrow(cs).replace(Some(usart)));
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}
