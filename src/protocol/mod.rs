// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Host link: wire format, interrupt-side server, request mailbox and foreground dispatcher.

pub mod dispatch;
pub mod mailbox;
pub mod messages;
pub mod server;

pub use dispatch::{Dispatcher, ExecError};
pub use mailbox::Mailbox;
pub use messages::{Command, Opcode, Reply};
pub use server::{with_link, CommandServer, FrameState, Link, SharedLink, SlavePort};
