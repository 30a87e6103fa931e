//! Profile configuration and per-profile runtime state
//!
//! A profile is one service with its characteristics and descriptors. The
//! [`ProfileConfig`] says what to build; the [`ProfileEntry`] records what the
//! stack actually created (handles), the connection the profile serves, the
//! attribute values and the prepared-write state.

use super::builder::BuildState;
use super::types::{AttPermissions, CharacteristicProperty, ServiceId, Uuid};
use crate::att::{AttError, AttResult, AttributeStore, PrepareState, ATT_DEFAULT_MTU, CLIENT_CHAR_CONFIG_UUID};
use crate::event::GattIf;
use crate::gap::BdAddr;
use std::sync::Arc;

/// Size of the deterministic notify/indicate test pattern
pub const NOTIFY_DATA_SIZE: usize = 15;

/// Produces the payload pushed when a peer enables notifications or
/// indications on characteristic `index`. `None` pushes nothing.
pub type ValueProvider = Arc<dyn Fn(usize) -> Option<Vec<u8>> + Send + Sync>;

/// Receives every value applied to characteristic `index`
pub type ValueSink = Arc<dyn Fn(usize, &[u8]) + Send + Sync>;

/// Deterministic payload `0, 1, 2, ...` of `len` bytes
pub fn test_pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 0xff) as u8).collect()
}

/// Provider answering every enable with the test pattern
pub fn test_pattern_provider() -> ValueProvider {
    Arc::new(|_| Some(test_pattern(NOTIFY_DATA_SIZE)))
}

/// A descriptor to add under a characteristic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorConfig {
    pub uuid: Uuid,
    pub permissions: AttPermissions,
}

impl DescriptorConfig {
    /// Client Characteristic Configuration descriptor
    pub fn cccd() -> Self {
        Self {
            uuid: Uuid::from_u16(CLIENT_CHAR_CONFIG_UUID),
            permissions: AttPermissions::read_write(),
        }
    }

    pub fn is_cccd(&self) -> bool {
        self.uuid == Uuid::from_u16(CLIENT_CHAR_CONFIG_UUID)
    }
}

/// A characteristic to add under the profile's service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacteristicConfig {
    pub uuid: Uuid,
    pub permissions: AttPermissions,
    pub properties: CharacteristicProperty,
    /// Value handed to the stack on creation
    pub initial_value: Option<Vec<u8>>,
    /// Per-characteristic length limit; the server-wide limit when unset
    pub max_len: Option<usize>,
    pub descriptors: Vec<DescriptorConfig>,
}

impl CharacteristicConfig {
    pub fn new(uuid: Uuid, permissions: AttPermissions, properties: CharacteristicProperty) -> Self {
        Self {
            uuid,
            permissions,
            properties,
            initial_value: None,
            max_len: None,
            descriptors: Vec::new(),
        }
    }

    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    pub fn with_descriptor(mut self, descriptor: DescriptorConfig) -> Self {
        self.descriptors.push(descriptor);
        self
    }
}

/// What a profile builds and how it produces and consumes values
#[derive(Clone)]
pub struct ProfileConfig {
    /// Application identifier, chosen at registration time
    pub app_id: u16,
    pub service_id: ServiceId,
    /// Number of handles to reserve for the service
    pub num_handles: u16,
    pub characteristics: Vec<CharacteristicConfig>,
    pub value_provider: Option<ValueProvider>,
    pub value_sink: Option<ValueSink>,
}

impl ProfileConfig {
    pub fn new(app_id: u16, service_id: ServiceId, num_handles: u16) -> Self {
        Self {
            app_id,
            service_id,
            num_handles,
            characteristics: Vec::new(),
            value_provider: Some(test_pattern_provider()),
            value_sink: None,
        }
    }

    pub fn with_characteristic(mut self, characteristic: CharacteristicConfig) -> Self {
        self.characteristics.push(characteristic);
        self
    }

    pub fn with_value_provider(mut self, provider: Option<ValueProvider>) -> Self {
        self.value_provider = provider;
        self
    }

    pub fn with_value_sink(mut self, sink: ValueSink) -> Self {
        self.value_sink = Some(sink);
        self
    }

    /// Demo profile A: service 0x00FF, characteristic 0xFF01
    pub fn test_profile_a() -> Self {
        Self::demo_profile(0, 0x00FF, 0xFF01, Some(vec![0x11, 0x22, 0x33]))
    }

    /// Demo profile B: service 0x00EE, characteristic 0xEE01
    pub fn test_profile_b() -> Self {
        Self::demo_profile(1, 0x00EE, 0xEE01, None)
    }

    fn demo_profile(app_id: u16, service: u16, characteristic: u16, initial: Option<Vec<u8>>) -> Self {
        let mut chr = CharacteristicConfig::new(
            Uuid::from_u16(characteristic),
            AttPermissions::read_write(),
            CharacteristicProperty::READ | CharacteristicProperty::WRITE | CharacteristicProperty::NOTIFY,
        )
        .with_descriptor(DescriptorConfig::cccd());
        chr.initial_value = initial;

        Self::new(app_id, ServiceId::primary(Uuid::from_u16(service)), 4).with_characteristic(chr)
    }
}

impl std::fmt::Debug for ProfileConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileConfig")
            .field("app_id", &self.app_id)
            .field("service_id", &self.service_id)
            .field("num_handles", &self.num_handles)
            .field("characteristics", &self.characteristics)
            .field("value_provider", &self.value_provider.is_some())
            .field("value_sink", &self.value_sink.is_some())
            .finish()
    }
}

/// Populate a write-once handle slot
pub(crate) fn assign_handle(slot: &mut Option<u16>, handle: u16) -> AttResult<()> {
    if handle == 0 {
        return Err(AttError::UncreatedHandle(handle));
    }

    match slot {
        Some(existing) => Err(AttError::HandleAlreadyAssigned {
            handle,
            existing: *existing,
        }),
        None => {
            *slot = Some(handle);
            Ok(())
        }
    }
}

/// A descriptor as created by the stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorEntry {
    pub uuid: Uuid,
    pub handle: Option<u16>,
}

/// A characteristic as created by the stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacteristicEntry {
    pub uuid: Uuid,
    pub value_handle: Option<u16>,
    pub permissions: AttPermissions,
    pub properties: CharacteristicProperty,
    pub descriptors: Vec<DescriptorEntry>,
}

impl CharacteristicEntry {
    pub fn pending(config: &CharacteristicConfig) -> Self {
        Self {
            uuid: config.uuid,
            value_handle: None,
            permissions: config.permissions,
            properties: config.properties,
            descriptors: Vec::new(),
        }
    }

    /// Handle of the Client Characteristic Configuration descriptor, once created
    pub fn cccd_handle(&self) -> Option<u16> {
        self.descriptors
            .iter()
            .find(|d| d.uuid == Uuid::from_u16(CLIENT_CHAR_CONFIG_UUID))
            .and_then(|d| d.handle)
    }
}

/// Runtime state of one registered profile
#[derive(Debug, Clone)]
pub struct ProfileEntry {
    /// Application identifier
    pub app_id: u16,
    /// Interface assigned by the stack on successful registration
    pub interface: Option<GattIf>,
    /// Active connection, valid only while connected
    pub conn_id: Option<u16>,
    pub peer: Option<BdAddr>,
    pub mtu: u16,
    pub service_handle: Option<u16>,
    pub characteristics: Vec<CharacteristicEntry>,
    pub build: BuildState,
    pub values: AttributeStore,
    pub prepare: PrepareState,
}

impl ProfileEntry {
    pub fn new(app_id: u16) -> Self {
        Self {
            app_id,
            interface: None,
            conn_id: None,
            peer: None,
            mtu: ATT_DEFAULT_MTU,
            service_handle: None,
            characteristics: Vec::new(),
            build: BuildState::Unregistered,
            values: AttributeStore::new(),
            prepare: PrepareState::Idle,
        }
    }

    /// Return to the freshly-registered-table state, keeping the app id
    pub fn reset(&mut self) {
        *self = Self::new(self.app_id);
    }

    /// Drop everything tied to the service, keeping registration and connection
    pub fn clear_service(&mut self) {
        self.service_handle = None;
        self.characteristics.clear();
        self.values.clear();
        self.prepare.release();
        self.build = BuildState::Registered;
    }

    pub fn is_connected(&self) -> bool {
        self.conn_id.is_some()
    }

    pub fn is_ready(&self) -> bool {
        self.build == BuildState::Ready
    }

    /// Value handle of the first characteristic
    pub fn char_handle(&self) -> Option<u16> {
        self.characteristics.first().and_then(|c| c.value_handle)
    }

    /// CCCD handle of the first characteristic
    pub fn descr_handle(&self) -> Option<u16> {
        self.characteristics.first().and_then(|c| c.cccd_handle())
    }

    /// Index of the characteristic whose value lives at `handle`
    pub fn characteristic_index(&self, handle: u16) -> Option<usize> {
        self.characteristics
            .iter()
            .position(|c| c.value_handle == Some(handle))
    }

    /// Index of the characteristic whose CCCD lives at `handle`
    pub fn cccd_owner(&self, handle: u16) -> Option<usize> {
        self.characteristics
            .iter()
            .position(|c| c.cccd_handle() == Some(handle))
    }
}
