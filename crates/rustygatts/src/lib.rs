//! RustyGatts - An event-driven GATT server engine for BLE peripherals
//!
//! This library sits on top of an external Bluetooth stack. The stack reports
//! events (registration, attribute creation, connections, reads and writes);
//! the engine answers each with the commands to issue next. It builds every
//! registered profile's attribute hierarchy in order, serves reads and writes
//! from per-profile attribute stores, assembles prepared (long) writes and
//! starts advertising once its payloads are configured.

pub mod att;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod gap;
pub mod gatt;
pub mod host;
pub mod server;

// Re-export common types for convenience
pub use att::{AttError, AttErrorCode, AttributeStore, PrepareState};
pub use command::{AttrValue, Command, GattResponse};
pub use config::{AdvertisingConfig, AdvertisingPayload, AttributeLimits, ServerConfig};
pub use error::{Error, Result, StackError};
pub use event::{ExecWriteRequest, GapEvent, GattIf, GattsEvent, ReadRequest, StackEvent, WriteRequest};
pub use gap::{AdvParams, AdvertisingData, AdvertisingState, BdAddr, BtStatus, ConnParams};
pub use gatt::{
    uart_profile, uart_server_config, AttPermissions, BuildState, CharacteristicConfig, CharacteristicProperty,
    DescriptorConfig, GattProfile, ProfileConfig, ProfileEntry, ProfileHandler, ServiceId, Uuid,
};
pub use host::{BleStack, Host};
pub use server::{EventHandler, GattServer, ServerStats};

#[cfg(test)]
mod tests;
