//! GATT server profiles
//!
//! Profiles are registered with the [`ProfileRegistry`], build their attribute
//! hierarchy through the [`HierarchyBuilder`] and handle peer requests in a
//! [`ProfileHandler`].

pub mod builder;
pub mod cccd;
pub mod handler;
pub mod profile;
pub mod registry;
pub mod types;
pub mod uart;


pub use builder::{BuildState, BuildStep, HierarchyBuilder};
pub use cccd::CccdAction;
pub use handler::{push_command, GattProfile, ProfileHandler};
pub use profile::{
    test_pattern, test_pattern_provider, CharacteristicConfig, CharacteristicEntry, DescriptorConfig,
    DescriptorEntry, ProfileConfig, ProfileEntry, ValueProvider, ValueSink, NOTIFY_DATA_SIZE,
};
pub use registry::ProfileRegistry;
pub use types::{AttPermissions, CharacteristicProperty, ServiceId, Uuid};
pub use uart::{uart_profile, uart_server_config, RxCallback, UART_MAX_DATA_LEN};
