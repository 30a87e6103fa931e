use crate::gap::constants::*;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressType {
    Public,
    Random,
    PublicIdentity,
    RandomIdentity,
}

impl From<u8> for AddressType {
    fn from(value: u8) -> Self {
        match value {
            PUBLIC_DEVICE_ADDRESS => AddressType::Public,
            RANDOM_DEVICE_ADDRESS => AddressType::Random,
            PUBLIC_IDENTITY_ADDRESS => AddressType::PublicIdentity,
            RANDOM_IDENTITY_ADDRESS => AddressType::RandomIdentity,
            _ => AddressType::Public,
        }
    }
}

impl From<AddressType> for u8 {
    fn from(value: AddressType) -> Self {
        match value {
            AddressType::Public => PUBLIC_DEVICE_ADDRESS,
            AddressType::Random => RANDOM_DEVICE_ADDRESS,
            AddressType::PublicIdentity => PUBLIC_IDENTITY_ADDRESS,
            AddressType::RandomIdentity => RANDOM_IDENTITY_ADDRESS,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BdAddr {
    pub bytes: [u8; 6],
}

impl BdAddr {
    pub fn new(bytes: [u8; 6]) -> Self {
        Self { bytes }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            self.bytes[5],
            self.bytes[4],
            self.bytes[3],
            self.bytes[2],
            self.bytes[1],
            self.bytes[0]
        )
    }
}

/// Status reported by the stack for GAP operations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BtStatus(pub u8);

impl BtStatus {
    pub const SUCCESS: BtStatus = BtStatus(0x00);
    pub const BUSY: BtStatus = BtStatus(0x0C);

    pub fn is_success(&self) -> bool {
        *self == Self::SUCCESS
    }
}

impl fmt::Display for BtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02x}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvType {
    /// Connectable undirected
    Ind,
    /// Connectable directed, high duty cycle
    DirectIndHigh,
    /// Scannable undirected
    ScanInd,
    /// Non-connectable undirected
    NonconnInd,
    /// Connectable directed, low duty cycle
    DirectIndLow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvFilterPolicy {
    AllowScanAnyConnAny,
    AllowScanWhitelistConnAny,
    AllowScanAnyConnWhitelist,
    AllowScanWhitelistConnWhitelist,
}

/// Parameters handed to the stack when advertising starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvParams {
    /// Minimum advertising interval, 0.625 ms units
    pub interval_min: u16,
    /// Maximum advertising interval, 0.625 ms units
    pub interval_max: u16,
    pub adv_type: AdvType,
    pub own_addr_type: AddressType,
    /// Bitmask of channels 37, 38 and 39
    pub channel_map: u8,
    pub filter_policy: AdvFilterPolicy,
}

impl Default for AdvParams {
    fn default() -> Self {
        Self {
            interval_min: ADV_INTERVAL_MIN,
            interval_max: ADV_INTERVAL_MAX,
            adv_type: AdvType::Ind,
            own_addr_type: AddressType::Public,
            channel_map: ADV_CHANNEL_ALL,
            filter_policy: AdvFilterPolicy::AllowScanAnyConnAny,
        }
    }
}

/// Connection parameter policy requested after a peer connects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnParams {
    /// Minimum connection interval, 1.25 ms units
    pub min_interval: u16,
    /// Maximum connection interval, 1.25 ms units
    pub max_interval: u16,
    /// Peripheral latency in connection events
    pub latency: u16,
    /// Supervision timeout, 10 ms units
    pub timeout: u16,
}

impl ConnParams {
    /// Build the policy from wall-clock values
    pub fn from_durations(
        min_interval: Duration,
        max_interval: Duration,
        latency: u16,
        timeout: Duration,
    ) -> Self {
        let units = |d: Duration, unit_us: u128| (d.as_micros() / unit_us).min(u16::MAX as u128) as u16;
        Self {
            min_interval: units(min_interval, 1250),
            max_interval: units(max_interval, 1250),
            latency,
            timeout: units(timeout, 10_000),
        }
    }

    pub fn min_interval_duration(&self) -> Duration {
        Duration::from_micros(self.min_interval as u64 * 1250)
    }

    pub fn max_interval_duration(&self) -> Duration {
        Duration::from_micros(self.max_interval as u64 * 1250)
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_millis(self.timeout as u64 * 10)
    }
}

impl Default for ConnParams {
    fn default() -> Self {
        Self {
            min_interval: LE_CONN_INTERVAL_MIN,
            max_interval: LE_CONN_INTERVAL_MAX,
            latency: LE_CONN_LATENCY,
            timeout: LE_SUPERVISION_TIMEOUT,
        }
    }
}

/// Connection parameter update request for one peer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnUpdateRequest {
    pub peer: BdAddr,
    pub params: ConnParams,
}
