//! GATT server engine
//!
//! [`GattServer`] consumes stack events one at a time and answers each with
//! the commands it produced. It owns the profile registry, the advertising
//! gate and the connection coordinator; it performs no I/O itself.

use crate::command::Command;
use crate::config::ServerConfig;
use crate::error::{Error, Result, StackError};
use crate::event::{GapEvent, GattIf, GattsEvent, StackEvent};
use crate::gap::{AdvertisingGate, AdvertisingState, BtStatus, ConnectionCoordinator};
use crate::gatt::{push_command, GattProfile, ProfileConfig, ProfileEntry, ProfileHandler, ProfileRegistry};
use log::{debug, error, info, warn};

/// Consumes stack events and produces commands
pub trait EventHandler {
    fn handle_event(&mut self, event: StackEvent) -> Vec<Command>;
}

/// Counters of events and commands that did not go as planned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServerStats {
    /// Events dropped because no profile owned their interface or app id
    pub dropped_events: u64,
    /// Profiles whose build halted on a failed confirmation
    pub halted_builds: u64,
    /// Commands the stack refused on submission
    pub failed_submissions: u64,
    /// Advertising starts that failed
    pub advertising_failures: u64,
}

/// Event-driven GATT server serving every registered profile
pub struct GattServer {
    config: ServerConfig,
    registry: ProfileRegistry,
    advertising: AdvertisingGate,
    connections: ConnectionCoordinator,
    stats: ServerStats,
}

impl GattServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            registry: ProfileRegistry::new(config.max_profiles),
            advertising: AdvertisingGate::new(config.advertising.params),
            connections: ConnectionCoordinator::new(config.conn_params),
            stats: ServerStats::default(),
            config,
        }
    }

    /// Add a profile served by the stock handler
    pub fn add_profile(&mut self, profile: ProfileConfig) -> Result<()> {
        let app_id = profile.app_id;
        let handler = GattProfile::new(profile, self.config.limits);
        self.registry.register(app_id, Box::new(handler))
    }

    /// Add a profile served by a custom handler
    pub fn add_handler(&mut self, app_id: u16, handler: Box<dyn ProfileHandler>) -> Result<()> {
        self.registry.register(app_id, handler)
    }

    /// Commands bringing the server up: device name, advertising payloads and
    /// one registration per profile
    pub fn start(&mut self) -> Result<Vec<Command>> {
        let name = &self.config.device_name;
        let adv_data = self.config.advertising.adv_data.encode(name)?;
        let scan_rsp = self
            .config
            .advertising
            .scan_rsp
            .as_ref()
            .map(|payload| payload.encode(name))
            .transpose()?;

        let mut out = vec![Command::SetDeviceName(name.clone())];
        self.advertising.configure(adv_data, scan_rsp, &mut out);
        for app_id in self.registry.app_ids() {
            out.push(Command::RegisterApp { app_id });
        }

        info!(
            "Starting GATT server '{}' with {} profiles",
            self.config.device_name,
            self.registry.len()
        );
        Ok(out)
    }

    /// Push `value` to the peer connected to profile `app_id`
    pub fn push(&self, app_id: u16, char_index: usize, value: Vec<u8>) -> Result<Command> {
        let entry = self
            .registry
            .entry(app_id)
            .ok_or(Error::UnknownAppId(app_id))?;
        push_command(entry, char_index, value, self.config.limits.max_push_len)
    }

    /// Record a command the stack refused on submission
    pub fn submission_failed(&mut self, command: &Command, err: &StackError) {
        self.stats.failed_submissions += 1;
        if let Command::StartAdvertising(_) = command {
            self.stats.advertising_failures += 1;
            let status = match err {
                StackError::Busy => BtStatus::BUSY,
                _ => BtStatus(0xFF),
            };
            self.advertising.start_failed(status);
        }
    }

    fn handle_gap_event(&mut self, event: GapEvent, out: &mut Vec<Command>) {
        match event {
            GapEvent::AdvDataSet { status } => self.advertising.on_adv_data_set(status, out),
            GapEvent::ScanRspDataSet { status } => self.advertising.on_scan_rsp_set(status, out),
            GapEvent::AdvStarted { status } => {
                if !status.is_success() {
                    self.stats.advertising_failures += 1;
                }
                self.advertising.on_started(status);
            }
            GapEvent::AdvStopped { status } => self.advertising.on_stopped(status),
            GapEvent::ConnParamsUpdated {
                status,
                peer,
                min_interval,
                max_interval,
                latency,
                conn_interval,
                timeout,
            } => {
                info!(
                    "Connection params for {} (status {}): min {} max {} latency {} interval {} timeout {}",
                    peer, status, min_interval, max_interval, latency, conn_interval, timeout
                );
            }
            GapEvent::PacketLengthUpdated { status, rx_len, tx_len } => {
                debug!("Packet length (status {}): rx {} tx {}", status, rx_len, tx_len);
            }
        }
    }

    fn handle_gatts_event(&mut self, interface: GattIf, event: GattsEvent, out: &mut Vec<Command>) {
        let halted_before = self.halted_count();
        if let Err(e) = self.registry.dispatch(interface, &event, out) {
            warn!("Dropping {} event on interface {}: {}", event.name(), interface, e);
            self.stats.dropped_events += 1;
            return;
        }
        self.stats.halted_builds += self.halted_count().saturating_sub(halted_before) as u64;

        match event {
            GattsEvent::Connected { conn_id, peer } => {
                if self.connections.on_connect(conn_id, peer, out) && self.config.stop_advertising_on_connect {
                    self.advertising.stop(out);
                }
            }
            GattsEvent::Disconnected { conn_id, reason, .. } => {
                if self.connections.on_disconnect(conn_id, reason) {
                    self.advertising.restart(out);
                }
            }
            _ => {}
        }
    }

    fn halted_count(&self) -> usize {
        self.registry.entries().filter(|e| e.build.is_halted()).count()
    }

    pub fn profile(&self, app_id: u16) -> Option<&ProfileEntry> {
        self.registry.entry(app_id)
    }

    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    pub fn advertising_state(&self) -> AdvertisingState {
        self.advertising.state()
    }

    pub fn connections(&self) -> &ConnectionCoordinator {
        &self.connections
    }

    pub fn stats(&self) -> ServerStats {
        self.stats
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

impl EventHandler for GattServer {
    fn handle_event(&mut self, event: StackEvent) -> Vec<Command> {
        let mut out = Vec::new();
        match event {
            StackEvent::Gap(event) => self.handle_gap_event(event, &mut out),
            StackEvent::Gatts { interface, event } => self.handle_gatts_event(interface, event, &mut out),
        }

        if out.iter().filter(|c| c.is_structural()).count() > 1 {
            error!("More than one structural command issued for a single event: {:?}", out);
        }
        out
    }
}
