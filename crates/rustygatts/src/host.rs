//! Driver connecting the engine to a Bluetooth stack
//!
//! The [`Host`] feeds stack events to a [`GattServer`] and submits the
//! commands it returns. A command the stack refuses is logged and counted;
//! it is never retried.

use crate::command::Command;
use crate::error::{Result, StackError};
use crate::event::StackEvent;
use crate::server::{EventHandler, GattServer};
use log::{error, trace};

/// Command sink of the external Bluetooth stack
pub trait BleStack {
    /// Hand one command to the stack
    fn submit(&mut self, command: &Command) -> std::result::Result<(), StackError>;
}

pub struct Host<S: BleStack> {
    server: GattServer,
    stack: S,
}

impl<S: BleStack> Host<S> {
    pub fn new(server: GattServer, stack: S) -> Self {
        Self { server, stack }
    }

    /// Submit the start-up commands
    pub fn start(&mut self) -> Result<()> {
        let commands = self.server.start()?;
        self.submit_all(commands);
        Ok(())
    }

    /// Process one event from the stack
    pub fn deliver(&mut self, event: StackEvent) {
        trace!("Delivering {:?}", event);
        let commands = self.server.handle_event(event);
        self.submit_all(commands);
    }

    /// Push `value` on characteristic `char_index` of profile `app_id`
    pub fn push(&mut self, app_id: u16, char_index: usize, value: Vec<u8>) -> Result<()> {
        let command = self.server.push(app_id, char_index, value)?;
        self.stack.submit(&command)?;
        Ok(())
    }

    fn submit_all(&mut self, commands: Vec<Command>) {
        for command in commands {
            if let Err(e) = self.stack.submit(&command) {
                error!("Stack refused {}: {}", command.name(), e);
                self.server.submission_failed(&command, &e);
            }
        }
    }

    pub fn server(&self) -> &GattServer {
        &self.server
    }

    pub fn stack(&self) -> &S {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut S {
        &mut self.stack
    }

    pub fn into_parts(self) -> (GattServer, S) {
        (self.server, self.stack)
    }
}

#[cfg(test)]
mod tests;
