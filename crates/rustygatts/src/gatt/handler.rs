//! Per-profile event handling
//!
//! The registry routes each GATT server event to the handler owning the
//! event's interface. [`GattProfile`] is the stock handler: it builds the
//! profile's attribute hierarchy, services reads and writes from the profile's
//! attribute store, collects prepared writes and answers CCCD enables with a
//! push.

use super::builder::HierarchyBuilder;
use super::cccd::{self, CccdAction};
use super::profile::{ProfileConfig, ProfileEntry};
use super::types::AttPermissions;
use crate::att::{AttErrorCode, ATT_DEFAULT_MTU, ATT_MAX_MTU};
use crate::command::{Command, GattResponse};
use crate::config::AttributeLimits;
use crate::error::{Error, Result};
use crate::event::{ExecWriteRequest, GattIf, GattsEvent, ReadRequest, WriteRequest};
use log::{debug, error, info, trace, warn};

/// Handles GATT server events for one profile
pub trait ProfileHandler: Send {
    /// Process one event addressed to `entry`, appending any commands to `out`
    fn handle_event(
        &mut self,
        entry: &mut ProfileEntry,
        interface: GattIf,
        event: &GattsEvent,
        out: &mut Vec<Command>,
    );
}

/// Stock profile handler driven by a [`ProfileConfig`]
pub struct GattProfile {
    config: ProfileConfig,
    limits: AttributeLimits,
}

impl GattProfile {
    pub fn new(config: ProfileConfig, limits: AttributeLimits) -> Self {
        Self { config, limits }
    }

    pub fn config(&self) -> &ProfileConfig {
        &self.config
    }

    fn builder(&self) -> HierarchyBuilder<'_> {
        HierarchyBuilder::new(&self.config, &self.limits)
    }

    fn respond(
        interface: GattIf,
        conn_id: u16,
        trans_id: u32,
        status: AttErrorCode,
        value: Option<GattResponse>,
        out: &mut Vec<Command>,
    ) {
        out.push(Command::SendResponse {
            interface,
            conn_id,
            trans_id,
            status,
            value,
        });
    }

    fn handle_read(&self, entry: &ProfileEntry, interface: GattIf, req: &ReadRequest, out: &mut Vec<Command>) {
        debug!(
            "Profile {}: read conn {} trans {} handle {} offset {}",
            entry.app_id, req.conn_id, req.trans_id, req.handle, req.offset
        );
        if !req.need_rsp {
            return;
        }

        let permitted = entry
            .characteristic_index(req.handle)
            .map(|i| entry.characteristics[i].permissions.contains(AttPermissions::READ))
            .unwrap_or(true);
        if !permitted {
            Self::respond(interface, req.conn_id, req.trans_id, AttErrorCode::ReadNotPermitted, None, out);
            return;
        }

        match entry.values.read(req.handle, req.offset) {
            Ok(mut value) => {
                value.truncate((entry.mtu as usize).saturating_sub(1));
                let rsp = GattResponse {
                    handle: req.handle,
                    offset: req.offset,
                    value,
                };
                Self::respond(interface, req.conn_id, req.trans_id, AttErrorCode::NoError, Some(rsp), out);
            }
            Err(e) => {
                warn!("Profile {}: read of handle {} failed: {}", entry.app_id, req.handle, e);
                Self::respond(interface, req.conn_id, req.trans_id, e.to_error_code(), None, out);
            }
        }
    }

    fn handle_write(&self, entry: &mut ProfileEntry, interface: GattIf, req: &WriteRequest, out: &mut Vec<Command>) {
        debug!(
            "Profile {}: write conn {} trans {} handle {} offset {} prep {} value {}",
            entry.app_id,
            req.conn_id,
            req.trans_id,
            req.handle,
            req.offset,
            req.is_prep,
            hex::encode(&req.value)
        );

        if !req.is_prep {
            self.notification_gate(entry, interface, req, out);
        }

        let permitted = entry
            .characteristic_index(req.handle)
            .map(|i| entry.characteristics[i].permissions.contains(AttPermissions::WRITE))
            .unwrap_or(true);
        if !permitted {
            if req.need_rsp {
                Self::respond(interface, req.conn_id, req.trans_id, AttErrorCode::WriteNotPermitted, None, out);
            }
            return;
        }

        if req.is_prep {
            self.handle_prepare(entry, interface, req, out);
            return;
        }

        let status = match entry.values.write(req.handle, &req.value) {
            Ok(()) => {
                self.deliver(entry, req.handle, &req.value);
                AttErrorCode::NoError
            }
            Err(e) => {
                warn!("Profile {}: write to handle {} failed: {}", entry.app_id, req.handle, e);
                e.to_error_code()
            }
        };

        if req.need_rsp {
            Self::respond(interface, req.conn_id, req.trans_id, status, None, out);
        }
    }

    fn handle_prepare(&self, entry: &mut ProfileEntry, interface: GattIf, req: &WriteRequest, out: &mut Vec<Command>) {
        let status = if let Ok(attr) = entry.values.get(req.handle) {
            // A run never grows past what the attribute can hold on commit
            let capacity = self.limits.prepare_buf_max.min(attr.max_len);
            match entry.prepare.prepare(req.handle, req.offset, &req.value, capacity) {
                Ok(()) => {
                    trace!(
                        "Profile {}: buffered {} bytes for handle {}",
                        entry.app_id,
                        entry.prepare.buffered_len(),
                        req.handle
                    );
                    AttErrorCode::NoError
                }
                Err(e) => e.to_error_code(),
            }
        } else {
            warn!(
                "Profile {}: prepared write to uncreated handle {}",
                entry.app_id, req.handle
            );
            AttErrorCode::Unlikely
        };

        if !req.need_rsp {
            return;
        }

        let echo = status.is_success().then(|| GattResponse {
            handle: req.handle,
            offset: req.offset,
            value: req.value.clone(),
        });
        Self::respond(interface, req.conn_id, req.trans_id, status, echo, out);
    }

    fn handle_execute(
        &self,
        entry: &mut ProfileEntry,
        interface: GattIf,
        req: &ExecWriteRequest,
        out: &mut Vec<Command>,
    ) {
        Self::respond(interface, req.conn_id, req.trans_id, AttErrorCode::NoError, None, out);

        let commit = req.is_commit();
        match entry.prepare.execute(commit) {
            Some((handle, value)) => match entry.values.write(handle, &value) {
                Ok(()) => {
                    info!(
                        "Profile {}: committed {} prepared bytes to handle {}",
                        entry.app_id,
                        value.len(),
                        handle
                    );
                    self.deliver(entry, handle, &value);
                }
                Err(e) => error!(
                    "Profile {}: committed prepared write to handle {} not applied: {}",
                    entry.app_id, handle, e
                ),
            },
            None if commit => debug!("Profile {}: execute write with nothing to apply", entry.app_id),
            None => info!("Profile {}: prepared write cancelled", entry.app_id),
        }
    }

    /// Pushes on a CCCD enable; generic write handling continues afterwards
    fn notification_gate(&self, entry: &ProfileEntry, interface: GattIf, req: &WriteRequest, out: &mut Vec<Command>) {
        let Some(index) = entry.cccd_owner(req.handle) else {
            return;
        };
        let Some(config) = cccd::decode(&req.value) else {
            return;
        };

        let characteristic = &entry.characteristics[index];
        let need_confirm = match cccd::evaluate(config, characteristic.properties) {
            CccdAction::Notify => false,
            CccdAction::Indicate => true,
            CccdAction::Disable => {
                info!("Profile {}: notifications and indications disabled", entry.app_id);
                return;
            }
            CccdAction::NotSupported(value) => {
                warn!(
                    "Profile {}: CCCD value {:#06x} not supported by characteristic {}",
                    entry.app_id, value, characteristic.uuid
                );
                return;
            }
            CccdAction::Unknown(value) => {
                warn!("Profile {}: unknown CCCD value {}", entry.app_id, hex::encode(value.to_le_bytes()));
                return;
            }
        };

        let Some(attr_handle) = characteristic.value_handle else {
            return;
        };
        let Some(value) = self.config.value_provider.as_ref().and_then(|provider| provider(index)) else {
            debug!("Profile {}: enable on characteristic {} with no payload to push", entry.app_id, index);
            return;
        };

        info!(
            "Profile {}: {} enabled, pushing {} bytes",
            entry.app_id,
            if need_confirm { "indication" } else { "notification" },
            value.len()
        );
        out.push(Command::SendIndicate {
            interface,
            conn_id: req.conn_id,
            attr_handle,
            value,
            need_confirm,
        });
    }

    fn deliver(&self, entry: &ProfileEntry, handle: u16, value: &[u8]) {
        let Some(index) = entry.characteristic_index(handle) else {
            return;
        };
        if let Some(sink) = &self.config.value_sink {
            sink(index, value);
        }
    }
}

impl ProfileHandler for GattProfile {
    fn handle_event(
        &mut self,
        entry: &mut ProfileEntry,
        interface: GattIf,
        event: &GattsEvent,
        out: &mut Vec<Command>,
    ) {
        match event {
            GattsEvent::Registered { status, .. } => {
                self.builder().on_registered(entry, interface, *status, out);
            }
            GattsEvent::Unregistered { status } => {
                info!("Profile {} unregistered (status {:?})", entry.app_id, status);
                entry.reset();
            }
            GattsEvent::ServiceCreated {
                status,
                service_handle,
                ..
            } => {
                self.builder().on_service_created(entry, *status, *service_handle, out);
            }
            GattsEvent::ServiceStarted {
                status,
                service_handle,
            } => {
                self.builder().on_service_started(entry, *status, *service_handle, out);
            }
            GattsEvent::CharacteristicAdded {
                status, attr_handle, ..
            } => {
                self.builder().on_characteristic_added(entry, *status, *attr_handle, out);
            }
            GattsEvent::DescriptorAdded {
                status, attr_handle, ..
            } => {
                self.builder().on_descriptor_added(entry, *status, *attr_handle, out);
            }
            GattsEvent::ServiceDeleted {
                status,
                service_handle,
            } => {
                if !status.is_success() {
                    error!(
                        "Profile {}: deleting service {} failed with {:?}",
                        entry.app_id, service_handle, status
                    );
                } else if entry.service_handle != Some(*service_handle) {
                    warn!(
                        "Profile {}: deletion of foreign service {}",
                        entry.app_id, service_handle
                    );
                } else {
                    info!("Profile {}: service {} deleted", entry.app_id, service_handle);
                    entry.clear_service();
                }
            }
            GattsEvent::Read(req) => self.handle_read(entry, interface, req, out),
            GattsEvent::Write(req) => self.handle_write(entry, interface, req, out),
            GattsEvent::ExecuteWrite(req) => self.handle_execute(entry, interface, req, out),
            GattsEvent::Mtu { conn_id, mtu } => {
                if *mtu > ATT_MAX_MTU {
                    warn!("Profile {}: MTU {} clamped to {}", entry.app_id, mtu, ATT_MAX_MTU);
                }
                entry.mtu = (*mtu).clamp(ATT_DEFAULT_MTU, ATT_MAX_MTU);
                info!("Profile {}: MTU {} on conn {}", entry.app_id, entry.mtu, conn_id);
            }
            GattsEvent::Confirm { status, handle, .. } => {
                if status.is_success() {
                    debug!("Profile {}: indication on handle {} confirmed", entry.app_id, handle);
                } else {
                    warn!(
                        "Profile {}: indication on handle {} failed with {:?}",
                        entry.app_id, handle, status
                    );
                }
            }
            GattsEvent::Connected { conn_id, peer } => {
                if let Some(previous) = entry.conn_id.filter(|c| c != conn_id) {
                    warn!(
                        "Profile {}: conn {} replaces conn {}",
                        entry.app_id, conn_id, previous
                    );
                    entry.prepare.release();
                }
                info!("Profile {}: connected to {} (conn {})", entry.app_id, peer, conn_id);
                entry.conn_id = Some(*conn_id);
                entry.peer = Some(*peer);
            }
            GattsEvent::Disconnected {
                conn_id,
                peer,
                reason,
            } => {
                if entry.conn_id != Some(*conn_id) {
                    debug!("Profile {}: disconnect of unknown conn {}", entry.app_id, conn_id);
                    return;
                }
                let released = entry.prepare.release();
                info!(
                    "Profile {}: disconnected from {} (reason {:#04x}, released {} prepared bytes)",
                    entry.app_id, peer, reason, released
                );
                entry.conn_id = None;
                entry.peer = None;
                entry.mtu = ATT_DEFAULT_MTU;
            }
        }
    }
}

/// Build the push command for characteristic `char_index`
///
/// The push mode follows the characteristic's declared properties: a
/// notification when it can notify, otherwise an indication.
pub fn push_command(
    entry: &ProfileEntry,
    char_index: usize,
    value: Vec<u8>,
    max_len: usize,
) -> Result<Command> {
    let interface = entry.interface.ok_or(Error::NotReady(entry.app_id))?;
    if !entry.is_ready() {
        return Err(Error::NotReady(entry.app_id));
    }
    let conn_id = entry.conn_id.ok_or(Error::NotConnected(entry.app_id))?;
    let characteristic = entry
        .characteristics
        .get(char_index)
        .ok_or(Error::UnknownCharacteristic {
            app_id: entry.app_id,
            index: char_index,
        })?;

    if value.len() > max_len {
        return Err(Error::PayloadTooLong {
            len: value.len(),
            max: max_len,
        });
    }

    let need_confirm = if characteristic.properties.can_notify() {
        false
    } else if characteristic.properties.can_indicate() {
        true
    } else {
        return Err(Error::PushNotSupported {
            app_id: entry.app_id,
            index: char_index,
        });
    };
    let attr_handle = characteristic
        .value_handle
        .ok_or(Error::NotReady(entry.app_id))?;

    Ok(Command::SendIndicate {
        interface,
        conn_id,
        attr_handle,
        value,
        need_confirm,
    })
}
