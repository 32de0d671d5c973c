// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Interrupt-side command server.
//!
//! The host clocks one byte at a time and has no way to wait for a slow reply, so the board tells
//! it when a reply byte is ready with a separate active-low ready line. [`CommandServer`] runs in
//! the SPI transfer-complete interrupt:
//!
//! - `Idle`: the received byte is an opcode. `GET_STATUS` and unknown opcodes are answered right
//!   away; the other opcodes either wait for an argument byte or are handed to the foreground.
//! - `AwaitingArgument`: the received byte completes the request.
//! - `Executing`: the foreground owns the request; bytes from the host are dropped.
//! - `Replying`: each transfer shifts one reply byte out. The ready line is released after every
//!   byte and asserted again once the next byte sits in the shift register.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::protocol::mailbox::Mailbox;
use crate::protocol::messages::{Command, Opcode, Reply, Status, REPLY_LEN};

/// The slave end of the host link.
pub trait SlavePort {
    /// Byte received by the transfer that just completed.
    fn read(&mut self) -> u8;

    /// Place `byte` in the shift register for the next transfer.
    fn load(&mut self, byte: u8);

    /// Byte most recently passed to [`load`](Self::load).
    fn last_loaded(&self) -> u8;

    /// Drive the ready line. `true` means a reply byte is waiting.
    fn set_ready(&mut self, asserted: bool);
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameState {
    Idle,
    AwaitingArgument(Opcode),
    Executing,
    Replying { payload: Reply, sent: usize },
}

pub struct CommandServer {
    state: FrameState,
    status: Status,
}

impl CommandServer {
    pub const fn new() -> Self {
        Self {
            state: FrameState::Idle,
            status: Status::new(),
        }
    }

    #[inline]
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Status flags without clearing them.
    #[inline]
    pub fn status(&self) -> u8 {
        self.status.bits()
    }

    /// Advance on one completed transfer that carried `byte` from the host.
    ///
    /// Returns the command the foreground has to run, if this byte completed one.
    pub fn on_transfer_complete<P: SlavePort>(&mut self, port: &mut P, byte: u8) -> Option<Command> {
        match self.state {
            FrameState::Idle => match Opcode::from_byte(byte) {
                Some(op) if !op.is_deferred() => {
                    let status = self.status.take();
                    self.start_reply(port, Reply::status(status));
                    None
                }
                Some(op) if op.arg_len() > 0 => {
                    self.state = FrameState::AwaitingArgument(op);
                    None
                }
                Some(op) => self.defer(port, op, 0),
                None => {
                    self.status.flag_invalid_command();
                    self.start_reply(port, Reply::status(self.status.bits()));
                    None
                }
            },
            FrameState::AwaitingArgument(op) => self.defer(port, op, byte),
            FrameState::Executing => None,
            FrameState::Replying { payload, sent } => {
                let sent = sent + 1;
                port.set_ready(false);
                if sent < REPLY_LEN {
                    port.load(payload.byte(sent));
                    port.set_ready(true);
                    self.state = FrameState::Replying { payload, sent };
                } else {
                    self.state = FrameState::Idle;
                }
                None
            }
        }
    }

    fn defer<P: SlavePort>(&mut self, port: &mut P, op: Opcode, arg: u8) -> Option<Command> {
        match Command::decode(op, arg) {
            Some(cmd) => {
                port.set_ready(false);
                self.state = FrameState::Executing;
                Some(cmd)
            }
            None => {
                self.state = FrameState::Idle;
                None
            }
        }
    }

    fn start_reply<P: SlavePort>(&mut self, port: &mut P, payload: Reply) {
        port.load(payload.byte(0));
        port.set_ready(true);
        self.state = FrameState::Replying { payload, sent: 0 };
    }

    /// Hand the foreground's reply to the ISR. Ignored unless a command is executing.
    pub fn begin_reply<P: SlavePort>(&mut self, port: &mut P, reply: Reply) -> bool {
        if self.state != FrameState::Executing {
            return false;
        }
        self.start_reply(port, reply);
        true
    }

    /// Best-effort reply after a failed command: the shift register keeps repeating whatever was
    /// loaded last.
    pub fn fail_reply<P: SlavePort>(&mut self, port: &mut P) -> bool {
        let stale = port.last_loaded();
        self.begin_reply(port, Reply::filled(stale))
    }
}

impl Default for CommandServer {
    fn default() -> Self {
        Self::new()
    }
}

/// Server state together with the port it drives.
pub struct Link<P: SlavePort> {
    server: CommandServer,
    port: P,
}

impl<P: SlavePort> Link<P> {
    pub fn new(port: P) -> Self {
        Self {
            server: CommandServer::new(),
            port,
        }
    }

    /// Body of the transfer-complete interrupt.
    pub fn on_interrupt(&mut self, requests: &Mailbox<Command>) {
        let byte = self.port.read();
        if let Some(cmd) = self.server.on_transfer_complete(&mut self.port, byte) {
            requests.post(cmd);
        }
    }

    pub fn begin_reply(&mut self, reply: Reply) -> bool {
        self.server.begin_reply(&mut self.port, reply)
    }

    pub fn fail_reply(&mut self) -> bool {
        self.server.fail_reply(&mut self.port)
    }

    #[inline]
    pub fn server(&self) -> &CommandServer {
        &self.server
    }

    #[inline]
    pub fn port(&self) -> &P {
        &self.port
    }

    #[inline]
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn free(self) -> P {
        self.port
    }
}

/// A [`Link`] shared between the interrupt and the foreground.
pub type SharedLink<P> = Mutex<RefCell<Option<Link<P>>>>;

/// Run `f` on the shared link inside a critical section. `None` if the link is not installed.
pub fn with_link<P, R, F>(shared: &SharedLink<P>, f: F) -> Option<R>
where
    P: SlavePort,
    F: FnOnce(&mut Link<P>) -> R,
{
    critical_section::with(|cs| shared.borrow_ref_mut(cs).as_mut().map(f))
}
