//! Attribute hierarchy builder
//!
//! Creates one profile's service, characteristics and descriptors strictly in
//! order: each structural command is issued only after the stack confirmed the
//! previous one. A failed confirmation halts the build where it stands; nothing
//! is retried.

use super::profile::{assign_handle, CharacteristicEntry, DescriptorEntry, ProfileConfig, ProfileEntry};
use crate::att::{AttErrorCode, AttResult, CCCD_VALUE_LEN};
use crate::command::{AttrValue, Command};
use crate::config::AttributeLimits;
use crate::event::GattIf;
use log::{debug, error, info, warn};

/// Step of the build that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStep {
    Register,
    CreateService,
    StartService,
    AddCharacteristic(usize),
    AddDescriptor(usize, usize),
}

/// Build progress of one profile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildState {
    /// No registration confirmed yet
    #[default]
    Unregistered,
    /// Registered, no service requested
    Registered,
    /// Service creation requested
    ServiceCreating,
    /// Service created, start requested
    ServiceStarting,
    /// Characteristic `char_index` requested
    CharAdding { char_index: usize },
    /// Descriptor `descr_index` of characteristic `char_index` requested
    DescrAdding { char_index: usize, descr_index: usize },
    /// Every attribute created
    Ready,
    /// A confirmation reported failure
    Halted(BuildStep),
}

impl BuildState {
    pub fn is_halted(&self) -> bool {
        matches!(self, BuildState::Halted(_))
    }
}

/// Drives a profile entry through the build sequence
pub struct HierarchyBuilder<'a> {
    config: &'a ProfileConfig,
    limits: &'a AttributeLimits,
}

impl<'a> HierarchyBuilder<'a> {
    pub fn new(config: &'a ProfileConfig, limits: &'a AttributeLimits) -> Self {
        Self { config, limits }
    }

    fn halt(&self, entry: &mut ProfileEntry, step: BuildStep, status: AttErrorCode) {
        error!(
            "Profile {}: {:?} failed with status {:?}, build halted",
            entry.app_id, step, status
        );
        entry.build = BuildState::Halted(step);
    }

    fn unexpected(&self, entry: &ProfileEntry, what: &str) {
        warn!(
            "Profile {}: unexpected {} confirmation in state {:?}, ignoring",
            entry.app_id, what, entry.build
        );
    }

    /// Registration confirmed: request the service
    pub fn on_registered(
        &self,
        entry: &mut ProfileEntry,
        interface: GattIf,
        status: AttErrorCode,
        out: &mut Vec<Command>,
    ) {
        if entry.build != BuildState::Unregistered {
            self.unexpected(entry, "registration");
            return;
        }

        if !status.is_success() {
            self.halt(entry, BuildStep::Register, status);
            return;
        }

        info!("Profile {} registered on interface {}", entry.app_id, interface);
        entry.build = BuildState::Registered;
        self.create_service(entry, interface, out);
    }

    fn create_service(&self, entry: &mut ProfileEntry, interface: GattIf, out: &mut Vec<Command>) {
        entry.build = BuildState::ServiceCreating;
        out.push(Command::CreateService {
            interface,
            service_id: self.config.service_id,
            num_handles: self.config.num_handles,
        });
    }

    /// Service created: record its handle and start it
    pub fn on_service_created(
        &self,
        entry: &mut ProfileEntry,
        status: AttErrorCode,
        service_handle: u16,
        out: &mut Vec<Command>,
    ) {
        if entry.build != BuildState::ServiceCreating {
            self.unexpected(entry, "service-created");
            return;
        }

        if !status.is_success() {
            self.halt(entry, BuildStep::CreateService, status);
            return;
        }

        if let Err(e) = assign_handle(&mut entry.service_handle, service_handle) {
            error!("Profile {}: service handle rejected: {}", entry.app_id, e);
            entry.build = BuildState::Halted(BuildStep::CreateService);
            return;
        }

        debug!("Profile {}: service created at handle {}", entry.app_id, service_handle);
        entry.build = BuildState::ServiceStarting;
        out.push(Command::StartService { service_handle });
    }

    /// Service started: add the first characteristic
    pub fn on_service_started(
        &self,
        entry: &mut ProfileEntry,
        status: AttErrorCode,
        service_handle: u16,
        out: &mut Vec<Command>,
    ) {
        if entry.build != BuildState::ServiceStarting || entry.service_handle != Some(service_handle) {
            self.unexpected(entry, "service-started");
            return;
        }

        if !status.is_success() {
            self.halt(entry, BuildStep::StartService, status);
            return;
        }

        self.next_characteristic(entry, 0, out);
    }

    /// Characteristic added: record its value handle and move on to its descriptors
    pub fn on_characteristic_added(
        &self,
        entry: &mut ProfileEntry,
        status: AttErrorCode,
        attr_handle: u16,
        out: &mut Vec<Command>,
    ) {
        let BuildState::CharAdding { char_index } = entry.build else {
            self.unexpected(entry, "characteristic-added");
            return;
        };

        if !status.is_success() {
            self.halt(entry, BuildStep::AddCharacteristic(char_index), status);
            return;
        }

        if let Err(e) = self.record_characteristic(entry, char_index, attr_handle) {
            error!("Profile {}: characteristic handle rejected: {}", entry.app_id, e);
            entry.build = BuildState::Halted(BuildStep::AddCharacteristic(char_index));
            return;
        }

        debug!(
            "Profile {}: characteristic {} at handle {}",
            entry.app_id, char_index, attr_handle
        );
        out.push(Command::GetAttributeValue { attr_handle });
        self.next_descriptor(entry, char_index, 0, out);
    }

    fn record_characteristic(&self, entry: &mut ProfileEntry, char_index: usize, handle: u16) -> AttResult<()> {
        let config = &self.config.characteristics[char_index];
        assign_handle(&mut entry.characteristics[char_index].value_handle, handle)?;
        entry.values.insert(
            handle,
            config.uuid,
            config.initial_value.clone().unwrap_or_default(),
            config.max_len.unwrap_or(self.limits.max_attr_len),
        )
    }

    /// Descriptor added: record its handle and continue
    pub fn on_descriptor_added(
        &self,
        entry: &mut ProfileEntry,
        status: AttErrorCode,
        attr_handle: u16,
        out: &mut Vec<Command>,
    ) {
        let BuildState::DescrAdding { char_index, descr_index } = entry.build else {
            self.unexpected(entry, "descriptor-added");
            return;
        };

        if !status.is_success() {
            self.halt(entry, BuildStep::AddDescriptor(char_index, descr_index), status);
            return;
        }

        if let Err(e) = self.record_descriptor(entry, char_index, descr_index, attr_handle) {
            error!("Profile {}: descriptor handle rejected: {}", entry.app_id, e);
            entry.build = BuildState::Halted(BuildStep::AddDescriptor(char_index, descr_index));
            return;
        }

        debug!(
            "Profile {}: descriptor {} of characteristic {} at handle {}",
            entry.app_id, descr_index, char_index, attr_handle
        );
        self.next_descriptor(entry, char_index, descr_index + 1, out);
    }

    fn record_descriptor(
        &self,
        entry: &mut ProfileEntry,
        char_index: usize,
        descr_index: usize,
        handle: u16,
    ) -> AttResult<()> {
        let config = &self.config.characteristics[char_index].descriptors[descr_index];
        assign_handle(
            &mut entry.characteristics[char_index].descriptors[descr_index].handle,
            handle,
        )?;

        if config.is_cccd() {
            entry.values.insert_fixed(handle, config.uuid, vec![0u8; CCCD_VALUE_LEN])
        } else {
            entry
                .values
                .insert(handle, config.uuid, Vec::new(), self.limits.max_attr_len)
        }
    }

    fn next_characteristic(&self, entry: &mut ProfileEntry, char_index: usize, out: &mut Vec<Command>) {
        let Some(config) = self.config.characteristics.get(char_index) else {
            info!(
                "Profile {}: attribute hierarchy ready ({} attributes)",
                entry.app_id,
                entry.values.len()
            );
            entry.build = BuildState::Ready;
            return;
        };
        let Some(service_handle) = entry.service_handle else {
            self.halt(entry, BuildStep::AddCharacteristic(char_index), AttErrorCode::Unlikely);
            return;
        };

        entry.characteristics.push(CharacteristicEntry::pending(config));
        entry.build = BuildState::CharAdding { char_index };
        out.push(Command::AddCharacteristic {
            service_handle,
            uuid: config.uuid,
            permissions: config.permissions,
            properties: config.properties,
            initial_value: config.initial_value.as_ref().map(|value| AttrValue {
                max_len: config.max_len.unwrap_or(self.limits.max_attr_len),
                value: value.clone(),
            }),
        });
    }

    fn next_descriptor(
        &self,
        entry: &mut ProfileEntry,
        char_index: usize,
        descr_index: usize,
        out: &mut Vec<Command>,
    ) {
        let Some(config) = self.config.characteristics[char_index].descriptors.get(descr_index) else {
            self.next_characteristic(entry, char_index + 1, out);
            return;
        };
        let Some(service_handle) = entry.service_handle else {
            self.halt(
                entry,
                BuildStep::AddDescriptor(char_index, descr_index),
                AttErrorCode::Unlikely,
            );
            return;
        };

        entry.characteristics[char_index].descriptors.push(DescriptorEntry {
            uuid: config.uuid,
            handle: None,
        });
        entry.build = BuildState::DescrAdding { char_index, descr_index };
        out.push(Command::AddDescriptor {
            service_handle,
            uuid: config.uuid,
            permissions: config.permissions,
        });
    }
}
