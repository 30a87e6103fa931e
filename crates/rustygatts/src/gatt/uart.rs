//! Serial-over-BLE profile
//!
//! One service with a TX characteristic the server notifies on and an RX
//! characteristic the peer writes into. Bytes written to RX are handed to the
//! caller's callback.

use super::profile::{CharacteristicConfig, DescriptorConfig, ProfileConfig};
use super::types::{AttPermissions, CharacteristicProperty, ServiceId, Uuid};
use crate::config::{AdvertisingConfig, AdvertisingPayload, ServerConfig};
use crate::gap::{AdvertisingData, ADV_FLAG_BREDR_NOT_SUPPORTED, ADV_FLAG_GENERAL_DISCOVERABLE};
use std::sync::Arc;

pub const UART_SERVICE_UUID: u32 = 0x6E40_0001;
pub const UART_TX_CHAR_UUID: u32 = 0x6E40_0002;
pub const UART_RX_CHAR_UUID: u32 = 0x6E40_0003;

/// Largest payload accepted in either direction
pub const UART_MAX_DATA_LEN: usize = 240;

pub const UART_DEVICE_NAME: &str = "RUSTY-UART";

/// Service, TX declaration and value, CCCD, RX declaration and value
pub const UART_NUM_HANDLES: u16 = 6;

/// Index of the TX characteristic within the profile
pub const UART_TX_INDEX: usize = 0;
/// Index of the RX characteristic within the profile
pub const UART_RX_INDEX: usize = 1;

/// Receives bytes written to the RX characteristic
pub type RxCallback = Arc<dyn Fn(&[u8]) + Send + Sync>;

/// The UART profile under `app_id`
pub fn uart_profile(app_id: u16, on_receive: RxCallback) -> ProfileConfig {
    let tx = CharacteristicConfig::new(
        Uuid::from_u32(UART_TX_CHAR_UUID),
        AttPermissions::READ,
        CharacteristicProperty::READ | CharacteristicProperty::NOTIFY,
    )
    .with_max_len(UART_MAX_DATA_LEN)
    .with_descriptor(DescriptorConfig::cccd());

    let rx = CharacteristicConfig::new(
        Uuid::from_u32(UART_RX_CHAR_UUID),
        AttPermissions::WRITE,
        CharacteristicProperty::WRITE | CharacteristicProperty::WRITE_WITHOUT_RESPONSE,
    )
    .with_max_len(UART_MAX_DATA_LEN);

    ProfileConfig::new(
        app_id,
        ServiceId::primary(Uuid::from_u32(UART_SERVICE_UUID)),
        UART_NUM_HANDLES,
    )
    .with_characteristic(tx)
    .with_characteristic(rx)
    .with_value_provider(None)
    .with_value_sink(Arc::new(move |index, value| {
        if index == UART_RX_INDEX {
            on_receive(value);
        }
    }))
}

/// Server settings for a single UART profile
///
/// Advertising stops while a peer is connected and comes back when it leaves.
/// No scan response is configured.
pub fn uart_server_config() -> ServerConfig {
    let mut config = ServerConfig {
        device_name: UART_DEVICE_NAME.to_string(),
        stop_advertising_on_connect: true,
        ..ServerConfig::default()
    };
    config.limits.max_push_len = UART_MAX_DATA_LEN;
    config.advertising = AdvertisingConfig {
        adv_data: AdvertisingPayload::Structured(
            AdvertisingData::new()
                .flags(ADV_FLAG_GENERAL_DISCOVERABLE | ADV_FLAG_BREDR_NOT_SUPPORTED)
                .include_name(true),
        ),
        scan_rsp: None,
        ..config.advertising
    };
    config
}
