//! Events delivered by the external Bluetooth stack
//!
//! The stack hands the engine one event at a time. GATT server events are
//! scoped to the application interface they concern; GAP events are global.

use crate::att::{AttErrorCode, ATT_EXEC_WRITE_COMMIT};
use crate::gap::{BdAddr, BtStatus};
use crate::gatt::{ServiceId, Uuid};

/// Application interface handle assigned by the stack on registration
pub type GattIf = u8;

/// An event from the external stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackEvent {
    /// Advertising and connection-level event
    Gap(GapEvent),
    /// GATT server event for one application interface
    Gatts { interface: GattIf, event: GattsEvent },
}

impl StackEvent {
    pub fn gatts(interface: GattIf, event: GattsEvent) -> Self {
        StackEvent::Gatts { interface, event }
    }
}

impl From<GapEvent> for StackEvent {
    fn from(event: GapEvent) -> Self {
        StackEvent::Gap(event)
    }
}

/// GAP events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GapEvent {
    /// Advertising payload configured
    AdvDataSet { status: BtStatus },
    /// Scan response payload configured
    ScanRspDataSet { status: BtStatus },
    /// Advertising start completed
    AdvStarted { status: BtStatus },
    /// Advertising stop completed
    AdvStopped { status: BtStatus },
    /// Connection parameters changed
    ConnParamsUpdated {
        status: BtStatus,
        peer: BdAddr,
        min_interval: u16,
        max_interval: u16,
        latency: u16,
        conn_interval: u16,
        timeout: u16,
    },
    /// Data length changed
    PacketLengthUpdated {
        status: BtStatus,
        rx_len: u16,
        tx_len: u16,
    },
}

/// Read request from a peer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRequest {
    pub conn_id: u16,
    pub trans_id: u32,
    pub peer: BdAddr,
    pub handle: u16,
    pub offset: u16,
    pub is_long: bool,
    pub need_rsp: bool,
}

/// Write or prepare-write request from a peer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    pub conn_id: u16,
    pub trans_id: u32,
    pub peer: BdAddr,
    pub handle: u16,
    pub offset: u16,
    pub need_rsp: bool,
    pub is_prep: bool,
    pub value: Vec<u8>,
}

/// Execute-write request resolving a prepared-write run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecWriteRequest {
    pub conn_id: u16,
    pub trans_id: u32,
    pub peer: BdAddr,
    pub exec_write_flag: u8,
}

impl ExecWriteRequest {
    /// Whether the peer asked to apply the buffered fragments
    pub fn is_commit(&self) -> bool {
        self.exec_write_flag == ATT_EXEC_WRITE_COMMIT
    }
}

/// GATT server events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GattsEvent {
    /// Application registration confirmed; the event's interface is now its own
    Registered { status: AttErrorCode, app_id: u16 },
    /// Application unregistered
    Unregistered { status: AttErrorCode },
    ServiceCreated {
        status: AttErrorCode,
        service_handle: u16,
        service_id: ServiceId,
    },
    ServiceStarted {
        status: AttErrorCode,
        service_handle: u16,
    },
    CharacteristicAdded {
        status: AttErrorCode,
        attr_handle: u16,
        service_handle: u16,
        char_uuid: Uuid,
    },
    DescriptorAdded {
        status: AttErrorCode,
        attr_handle: u16,
        service_handle: u16,
        descr_uuid: Uuid,
    },
    /// A service and every characteristic under it was deleted
    ServiceDeleted {
        status: AttErrorCode,
        service_handle: u16,
    },
    Read(ReadRequest),
    Write(WriteRequest),
    ExecuteWrite(ExecWriteRequest),
    Mtu { conn_id: u16, mtu: u16 },
    /// Peer acknowledged an indication (or the indication failed)
    Confirm {
        status: AttErrorCode,
        conn_id: u16,
        handle: u16,
        value: Vec<u8>,
    },
    Connected { conn_id: u16, peer: BdAddr },
    Disconnected {
        conn_id: u16,
        peer: BdAddr,
        reason: u8,
    },
}

impl GattsEvent {
    /// Short name used in log lines
    pub fn name(&self) -> &'static str {
        match self {
            GattsEvent::Registered { .. } => "registered",
            GattsEvent::Unregistered { .. } => "unregistered",
            GattsEvent::ServiceCreated { .. } => "service-created",
            GattsEvent::ServiceStarted { .. } => "service-started",
            GattsEvent::CharacteristicAdded { .. } => "characteristic-added",
            GattsEvent::DescriptorAdded { .. } => "descriptor-added",
            GattsEvent::ServiceDeleted { .. } => "service-deleted",
            GattsEvent::Read(_) => "read",
            GattsEvent::Write(_) => "write",
            GattsEvent::ExecuteWrite(_) => "execute-write",
            GattsEvent::Mtu { .. } => "mtu",
            GattsEvent::Confirm { .. } => "confirm",
            GattsEvent::Connected { .. } => "connected",
            GattsEvent::Disconnected { .. } => "disconnected",
        }
    }
}
