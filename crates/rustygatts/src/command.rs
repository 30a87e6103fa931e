//! Commands the engine issues to the external Bluetooth stack

use crate::att::AttErrorCode;
use crate::event::GattIf;
use crate::gap::{AdvParams, ConnUpdateRequest};
use crate::gatt::{AttPermissions, CharacteristicProperty, ServiceId, Uuid};

/// Initial value and length limit of a characteristic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrValue {
    pub max_len: usize,
    pub value: Vec<u8>,
}

/// Attribute value carried by a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GattResponse {
    pub handle: u16,
    pub offset: u16,
    pub value: Vec<u8>,
}

/// An outbound command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetDeviceName(String),
    ConfigAdvData(Vec<u8>),
    ConfigScanRspData(Vec<u8>),
    StartAdvertising(AdvParams),
    StopAdvertising,
    UpdateConnParams(ConnUpdateRequest),
    RegisterApp {
        app_id: u16,
    },
    CreateService {
        interface: GattIf,
        service_id: ServiceId,
        num_handles: u16,
    },
    StartService {
        service_handle: u16,
    },
    AddCharacteristic {
        service_handle: u16,
        uuid: Uuid,
        permissions: AttPermissions,
        properties: CharacteristicProperty,
        initial_value: Option<AttrValue>,
    },
    AddDescriptor {
        service_handle: u16,
        uuid: Uuid,
        permissions: AttPermissions,
    },
    GetAttributeValue {
        attr_handle: u16,
    },
    SendResponse {
        interface: GattIf,
        conn_id: u16,
        trans_id: u32,
        status: AttErrorCode,
        value: Option<GattResponse>,
    },
    /// Notification when `need_confirm` is false, indication otherwise
    SendIndicate {
        interface: GattIf,
        conn_id: u16,
        attr_handle: u16,
        value: Vec<u8>,
        need_confirm: bool,
    },
}

impl Command {
    /// Short name used in log lines
    pub fn name(&self) -> &'static str {
        match self {
            Command::SetDeviceName(_) => "set-device-name",
            Command::ConfigAdvData(_) => "config-adv-data",
            Command::ConfigScanRspData(_) => "config-scan-rsp-data",
            Command::StartAdvertising(_) => "start-advertising",
            Command::StopAdvertising => "stop-advertising",
            Command::UpdateConnParams(_) => "update-conn-params",
            Command::RegisterApp { .. } => "register-app",
            Command::CreateService { .. } => "create-service",
            Command::StartService { .. } => "start-service",
            Command::AddCharacteristic { .. } => "add-characteristic",
            Command::AddDescriptor { .. } => "add-descriptor",
            Command::GetAttributeValue { .. } => "get-attribute-value",
            Command::SendResponse { .. } => "send-response",
            Command::SendIndicate { .. } => "send-indicate",
        }
    }

    /// Whether this command creates part of an attribute hierarchy
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Command::CreateService { .. }
                | Command::StartService { .. }
                | Command::AddCharacteristic { .. }
                | Command::AddDescriptor { .. }
        )
    }
}
