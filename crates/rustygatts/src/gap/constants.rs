// Address types
pub const PUBLIC_DEVICE_ADDRESS: u8 = 0x00;
pub const RANDOM_DEVICE_ADDRESS: u8 = 0x01;
pub const PUBLIC_IDENTITY_ADDRESS: u8 = 0x02;
pub const RANDOM_IDENTITY_ADDRESS: u8 = 0x03;

// Advertising parameters
pub const ADV_INTERVAL_MIN: u16 = 0x0020; // 20 ms
pub const ADV_INTERVAL_MAX: u16 = 0x0040; // 40 ms
pub const ADV_CHANNEL_ALL: u8 = 0x07;

// Maximum legacy advertising / scan response payload
pub const ADV_DATA_MAX_LEN: usize = 31;

// LE Connection parameters
pub const LE_CONN_INTERVAL_MIN: u16 = 0x0010; // 20 ms
pub const LE_CONN_INTERVAL_MAX: u16 = 0x0020; // 40 ms
pub const LE_CONN_LATENCY: u16 = 0x0000; // 0
pub const LE_SUPERVISION_TIMEOUT: u16 = 0x0190; // 4000 ms

// Peripheral preferred connection interval range advertised
pub const ADV_PREFERRED_CONN_INTERVAL_MIN: u16 = 0x0006; // 7.5 ms
pub const ADV_PREFERRED_CONN_INTERVAL_MAX: u16 = 0x0010; // 20 ms

// Advertising flags
pub const ADV_FLAG_GENERAL_DISCOVERABLE: u8 = 0x02;
pub const ADV_FLAG_BREDR_NOT_SUPPORTED: u8 = 0x04;

// Advertising Data Types
pub const ADV_TYPE_FLAGS: u8 = 0x01;
pub const ADV_TYPE_16BIT_SERVICE_UUID_COMPLETE: u8 = 0x03;
pub const ADV_TYPE_32BIT_SERVICE_UUID_COMPLETE: u8 = 0x05;
pub const ADV_TYPE_128BIT_SERVICE_UUID_COMPLETE: u8 = 0x07;
pub const ADV_TYPE_SHORT_LOCAL_NAME: u8 = 0x08;
pub const ADV_TYPE_COMPLETE_LOCAL_NAME: u8 = 0x09;
pub const ADV_TYPE_TX_POWER_LEVEL: u8 = 0x0A;
pub const ADV_TYPE_SLAVE_CONN_INTERVAL_RANGE: u8 = 0x12;
pub const ADV_TYPE_APPEARANCE: u8 = 0x19;
pub const ADV_TYPE_MANUFACTURER_SPECIFIC: u8 = 0xFF;
