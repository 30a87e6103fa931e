//! Profile registry and event dispatch
//!
//! A fixed-capacity table of profiles. Registration confirmations are matched
//! by application id and bind the event's interface to that profile; every
//! other event is routed by interface to the single profile owning it.

use super::handler::ProfileHandler;
use super::profile::ProfileEntry;
use crate::command::Command;
use crate::error::{Error, Result};
use crate::event::{GattIf, GattsEvent};
use log::{debug, warn};

struct Slot {
    entry: ProfileEntry,
    handler: Box<dyn ProfileHandler>,
}

/// Fixed-capacity table of registered profiles, addressed by app id or interface
pub struct ProfileRegistry {
    slots: Vec<Slot>,
    capacity: usize,
}

impl ProfileRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Add a profile under `app_id`
    pub fn register(&mut self, app_id: u16, handler: Box<dyn ProfileHandler>) -> Result<()> {
        if self.slots.len() >= self.capacity {
            return Err(Error::RegistryFull(self.capacity));
        }
        if self.slots.iter().any(|s| s.entry.app_id == app_id) {
            return Err(Error::DuplicateAppId(app_id));
        }

        debug!("Profile {} added to registry", app_id);
        self.slots.push(Slot {
            entry: ProfileEntry::new(app_id),
            handler,
        });
        Ok(())
    }

    /// Route one event to the profile it concerns
    pub fn dispatch(&mut self, interface: GattIf, event: &GattsEvent, out: &mut Vec<Command>) -> Result<()> {
        let index = match event {
            GattsEvent::Registered { status, app_id } => self.bind(interface, *app_id, status.is_success())?,
            _ => self
                .slots
                .iter()
                .position(|s| s.entry.interface == Some(interface))
                .ok_or(Error::UnknownInterface(interface))?,
        };

        let slot = &mut self.slots[index];
        slot.handler.handle_event(&mut slot.entry, interface, event, out);
        Ok(())
    }

    fn bind(&mut self, interface: GattIf, app_id: u16, success: bool) -> Result<usize> {
        let index = self
            .slots
            .iter()
            .position(|s| s.entry.app_id == app_id && s.entry.interface.is_none())
            .ok_or(Error::UnknownAppId(app_id))?;

        if !success {
            return Ok(index);
        }

        if let Some(owner) = self.slots.iter().find(|s| s.entry.interface == Some(interface)) {
            warn!(
                "Interface {} already owned by profile {}, refusing profile {}",
                interface, owner.entry.app_id, app_id
            );
            return Err(Error::InterfaceInUse {
                interface,
                owner: owner.entry.app_id,
            });
        }

        self.slots[index].entry.interface = Some(interface);
        Ok(index)
    }

    pub fn entry(&self, app_id: u16) -> Option<&ProfileEntry> {
        self.entries().find(|e| e.app_id == app_id)
    }

    pub fn entry_by_interface(&self, interface: GattIf) -> Option<&ProfileEntry> {
        self.entries().find(|e| e.interface == Some(interface))
    }

    pub fn entries(&self) -> impl Iterator<Item = &ProfileEntry> {
        self.slots.iter().map(|s| &s.entry)
    }

    pub fn app_ids(&self) -> Vec<u16> {
        self.entries().map(|e| e.app_id).collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
