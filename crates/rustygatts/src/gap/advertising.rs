//! Advertising start gate
//!
//! Advertising starts once, after every requested payload configuration has
//! been confirmed, whatever order the confirmations arrive in.

use super::types::{AdvParams, BtStatus};
use crate::command::Command;
use bitflags::bitflags;
use log::{debug, error, info, warn};

bitflags! {
    /// Payload configurations still awaiting confirmation
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct PendingConfig: u8 {
        const ADV_DATA = 1 << 0;
        const SCAN_RSP = 1 << 1;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AdvertisingState {
    #[default]
    Idle,
    /// Waiting for payload confirmations
    Configuring,
    /// Start requested
    Starting,
    Advertising,
    /// Stop requested
    Stopping,
    /// The stack refused to start advertising
    Failed(BtStatus),
}

/// Holds advertising back until every payload is configured
#[derive(Debug)]
pub struct AdvertisingGate {
    params: AdvParams,
    pending: PendingConfig,
    state: AdvertisingState,
}

impl AdvertisingGate {
    pub fn new(params: AdvParams) -> Self {
        Self {
            params,
            pending: PendingConfig::empty(),
            state: AdvertisingState::Idle,
        }
    }

    /// Request payload configuration; advertising starts once all are confirmed
    pub fn configure(&mut self, adv_data: Vec<u8>, scan_rsp: Option<Vec<u8>>, out: &mut Vec<Command>) {
        self.pending = PendingConfig::ADV_DATA;
        out.push(Command::ConfigAdvData(adv_data));
        if let Some(scan_rsp) = scan_rsp {
            self.pending |= PendingConfig::SCAN_RSP;
            out.push(Command::ConfigScanRspData(scan_rsp));
        }
        self.state = AdvertisingState::Configuring;
    }

    pub fn on_adv_data_set(&mut self, status: BtStatus, out: &mut Vec<Command>) {
        self.confirm(PendingConfig::ADV_DATA, status, out);
    }

    pub fn on_scan_rsp_set(&mut self, status: BtStatus, out: &mut Vec<Command>) {
        self.confirm(PendingConfig::SCAN_RSP, status, out);
    }

    fn confirm(&mut self, flag: PendingConfig, status: BtStatus, out: &mut Vec<Command>) {
        if !status.is_success() {
            error!("Advertising payload {:?} rejected with status {}", flag, status);
            return;
        }

        if !self.pending.contains(flag) {
            debug!("Confirmation for {:?} not pending, ignoring", flag);
            return;
        }

        self.pending.remove(flag);
        if self.pending.is_empty() {
            self.start(out);
        }
    }

    fn start(&mut self, out: &mut Vec<Command>) {
        self.state = AdvertisingState::Starting;
        out.push(Command::StartAdvertising(self.params));
    }

    /// Re-arm advertising, e.g. after a peer left
    ///
    /// Does nothing while a configuration is still pending: the last
    /// confirmation starts advertising instead.
    pub fn restart(&mut self, out: &mut Vec<Command>) {
        if !self.pending.is_empty() {
            debug!("Advertising restart deferred, {:?} pending", self.pending);
            return;
        }
        self.start(out);
    }

    pub fn stop(&mut self, out: &mut Vec<Command>) {
        self.state = AdvertisingState::Stopping;
        out.push(Command::StopAdvertising);
    }

    pub fn on_started(&mut self, status: BtStatus) {
        if status.is_success() {
            info!("Advertising started");
            self.state = AdvertisingState::Advertising;
        } else {
            self.start_failed(status);
        }
    }

    /// The start request failed, either on submission or in the stack
    pub fn start_failed(&mut self, status: BtStatus) {
        error!("Advertising start failed with status {}", status);
        self.state = AdvertisingState::Failed(status);
    }

    pub fn on_stopped(&mut self, status: BtStatus) {
        if status.is_success() {
            info!("Advertising stopped");
            self.state = AdvertisingState::Idle;
        } else {
            warn!("Advertising stop failed with status {}", status);
        }
    }

    pub fn pending(&self) -> PendingConfig {
        self.pending
    }

    pub fn state(&self) -> AdvertisingState {
        self.state
    }

    pub fn params(&self) -> &AdvParams {
        &self.params
    }
}
