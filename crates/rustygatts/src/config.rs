//! Server configuration

use crate::att::{DEFAULT_MAX_ATTR_LEN, DEFAULT_PREPARE_BUF_MAX_SIZE};
use crate::error::Result;
use crate::gap::{
    AdvParams, AdvertisingData, ConnParams, ADV_FLAG_BREDR_NOT_SUPPORTED, ADV_FLAG_GENERAL_DISCOVERABLE,
    ADV_PREFERRED_CONN_INTERVAL_MAX, ADV_PREFERRED_CONN_INTERVAL_MIN,
};
use crate::gatt::Uuid;

/// Name the server advertises by default
pub const DEFAULT_DEVICE_NAME: &str = "GATTS_DEMO";

/// Number of profiles the registry holds by default
pub const DEFAULT_MAX_PROFILES: usize = 2;

/// Largest payload pushed through [`crate::GattServer::push`] by default
pub const DEFAULT_MAX_PUSH_LEN: usize = 240;

/// Attribute value limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeLimits {
    /// Largest value a characteristic holds unless it sets its own limit
    pub max_attr_len: usize,
    /// Capacity of the prepared-write buffer
    pub prepare_buf_max: usize,
    /// Largest caller-initiated push
    pub max_push_len: usize,
}

impl Default for AttributeLimits {
    fn default() -> Self {
        Self {
            max_attr_len: DEFAULT_MAX_ATTR_LEN,
            prepare_buf_max: DEFAULT_PREPARE_BUF_MAX_SIZE,
            max_push_len: DEFAULT_MAX_PUSH_LEN,
        }
    }
}

/// Payload handed to the stack, declarative or pre-encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvertisingPayload {
    Structured(AdvertisingData),
    Raw(Vec<u8>),
}

impl AdvertisingPayload {
    pub fn encode(&self, device_name: &str) -> Result<Vec<u8>> {
        match self {
            AdvertisingPayload::Structured(data) => data.encode(device_name),
            AdvertisingPayload::Raw(raw) => crate::gap::ad_data::check_len(raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvertisingConfig {
    pub params: AdvParams,
    pub adv_data: AdvertisingPayload,
    /// No scan response is configured when unset
    pub scan_rsp: Option<AdvertisingPayload>,
}

impl Default for AdvertisingConfig {
    fn default() -> Self {
        let services = [Uuid::from_u16(0x00EE), Uuid::from_u16(0x00FF)];

        let mut adv_data = AdvertisingData::new()
            .flags(ADV_FLAG_GENERAL_DISCOVERABLE | ADV_FLAG_BREDR_NOT_SUPPORTED)
            .include_name(true)
            .conn_interval(ADV_PREFERRED_CONN_INTERVAL_MIN, ADV_PREFERRED_CONN_INTERVAL_MAX);
        let mut scan_rsp = AdvertisingData::new().include_name(true).tx_power(0);
        for uuid in services {
            adv_data = adv_data.service_uuid(uuid);
            scan_rsp = scan_rsp.service_uuid(uuid);
        }

        Self {
            params: AdvParams::default(),
            adv_data: AdvertisingPayload::Structured(adv_data),
            scan_rsp: Some(AdvertisingPayload::Structured(scan_rsp)),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub device_name: String,
    /// Capacity of the profile registry
    pub max_profiles: usize,
    pub limits: AttributeLimits,
    pub advertising: AdvertisingConfig,
    /// Requested from the peer after it connects
    pub conn_params: ConnParams,
    /// Stop advertising while a peer is connected
    pub stop_advertising_on_connect: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            device_name: DEFAULT_DEVICE_NAME.to_string(),
            max_profiles: DEFAULT_MAX_PROFILES,
            limits: AttributeLimits::default(),
            advertising: AdvertisingConfig::default(),
            conn_params: ConnParams::default(),
            stop_advertising_on_connect: false,
        }
    }
}
