// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Foreground command execution.
//!
//! The [`Dispatcher`] owns everything the interrupt never touches: the optical board, the power
//! monitor and the sensor rail. [`Dispatcher::poll`] takes the pending command from the mailbox,
//! runs it to completion and hands the reply to the shared link.

use embedded_hal::{delay::DelayNs, i2c::I2c};
use log::{debug, warn};

use crate::error::Error;
use crate::pipeline::OpticalBoard;
use crate::power::{LoadSwitch, PowerMonitor, SensorRail, Telemetry};
use crate::protocol::mailbox::Mailbox;
use crate::protocol::messages::{Command, Reply};
use crate::protocol::server::{with_link, SharedLink, SlavePort};

/// Error type for command execution.
#[derive(Debug, PartialEq)]
pub enum ExecError<B, S> {
    /// Optical board failure.
    Board(Error<B>),
    /// Load switch failure.
    Switch(S),
}

impl<B, S> From<Error<B>> for ExecError<B, S> {
    fn from(e: Error<B>) -> Self {
        ExecError::Board(e)
    }
}

pub struct Dispatcher<I2C, D, M, S: LoadSwitch> {
    board: OpticalBoard<I2C, D>,
    power: M,
    rail: SensorRail<S>,
}

impl<I2C, D, M, S> Dispatcher<I2C, D, M, S>
where
    I2C: I2c,
    D: DelayNs,
    M: PowerMonitor,
    S: LoadSwitch,
{
    pub fn new(board: OpticalBoard<I2C, D>, power: M, rail: SensorRail<S>) -> Self {
        Self { board, power, rail }
    }

    /// Run one command and build its reply.
    pub fn execute(&mut self, cmd: Command) -> Result<Reply, ExecError<I2C::Error, S::Error>> {
        match cmd {
            Command::GetReading { well, mode } => {
                let reading = self.board.acquire(well, mode)?;
                Ok(Reply::from_u24(reading.bits()))
            }
            Command::GetPower => {
                let telemetry = Telemetry::sample(&mut self.power);
                debug!(
                    "power: {} mA, {} mV",
                    telemetry.current_ma, telemetry.voltage_mv
                );
                Ok(Reply::from_u24(telemetry.encode()))
            }
            Command::EnterSleepMode => {
                self.board.set_all_leds(false)?;
                self.rail
                    .off(self.board.delay_mut())
                    .map_err(ExecError::Switch)?;
                self.board.sensors_lost_power();
                Ok(Reply::ZERO)
            }
            Command::EnterNormalMode => {
                self.rail
                    .on(self.board.delay_mut())
                    .map_err(ExecError::Switch)?;
                self.board.init()?;
                Ok(Reply::ZERO)
            }
        }
    }

    /// Serve the pending request, if any. Returns whether one was served.
    pub fn poll<P: SlavePort>(&mut self, requests: &Mailbox<Command>, link: &SharedLink<P>) -> bool {
        let Some(cmd) = requests.take() else {
            return false;
        };

        let result = self.execute(cmd);
        if let Err(e) = &result {
            warn!("opcode {:#04x} failed: {:?}", cmd.opcode().byte(), e);
        }

        with_link(link, |link| match result {
            Ok(reply) => link.begin_reply(reply),
            Err(_) => link.fail_reply(),
        });
        true
    }

    #[inline]
    pub fn board(&self) -> &OpticalBoard<I2C, D> {
        &self.board
    }

    #[inline]
    pub fn board_mut(&mut self) -> &mut OpticalBoard<I2C, D> {
        &mut self.board
    }

    #[inline]
    pub fn rail(&self) -> &SensorRail<S> {
        &self.rail
    }
}
