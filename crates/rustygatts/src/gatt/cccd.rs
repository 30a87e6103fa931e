//! Client Characteristic Configuration handling
//!
//! A peer enables notifications or indications by writing a little-endian
//! 16-bit value to a characteristic's CCCD. Whether the enable is honored
//! depends on the properties the characteristic declared.

use super::types::CharacteristicProperty;
use crate::att::{CCCD_DISABLED, CCCD_INDICATE, CCCD_NOTIFY, CCCD_VALUE_LEN};
use byteorder::{ByteOrder, LittleEndian};

/// Outcome of a CCCD write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CccdAction {
    /// Push a notification
    Notify,
    /// Push an indication
    Indicate,
    /// Peer turned both off
    Disable,
    /// Peer asked for a mode the characteristic does not declare
    NotSupported(u16),
    /// Not a recognized configuration value
    Unknown(u16),
}

/// Decode a CCCD value; anything but exactly two bytes is not one
pub fn decode(value: &[u8]) -> Option<u16> {
    if value.len() != CCCD_VALUE_LEN {
        return None;
    }

    Some(LittleEndian::read_u16(value))
}

/// Decide what a configuration value means for a characteristic
pub fn evaluate(config: u16, properties: CharacteristicProperty) -> CccdAction {
    match config {
        CCCD_NOTIFY if properties.can_notify() => CccdAction::Notify,
        CCCD_INDICATE if properties.can_indicate() => CccdAction::Indicate,
        CCCD_NOTIFY | CCCD_INDICATE => CccdAction::NotSupported(config),
        CCCD_DISABLED => CccdAction::Disable,
        other => CccdAction::Unknown(other),
    }
}
