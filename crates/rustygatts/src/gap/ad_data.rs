//! Advertising and scan response payloads
//!
//! A payload is a run of AD structures, each `length, type, data` with the
//! length covering the type byte. Legacy advertising caps the whole payload at
//! 31 bytes.

use super::constants::*;
use crate::error::{Error, Result};
use crate::gatt::Uuid;
use byteorder::{ByteOrder, LittleEndian};

/// One AD structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdStructure {
    Flags(u8),
    ServiceUuids16(Vec<u16>),
    ServiceUuids32(Vec<u32>),
    ServiceUuids128(Vec<u128>),
    CompleteLocalName(String),
    ShortenedLocalName(String),
    TxPowerLevel(i8),
    ConnIntervalRange { min: u16, max: u16 },
    Appearance(u16),
    ManufacturerSpecific { company_id: u16, payload: Vec<u8> },
}

impl AdStructure {
    fn ad_type(&self) -> u8 {
        match self {
            AdStructure::Flags(_) => ADV_TYPE_FLAGS,
            AdStructure::ServiceUuids16(_) => ADV_TYPE_16BIT_SERVICE_UUID_COMPLETE,
            AdStructure::ServiceUuids32(_) => ADV_TYPE_32BIT_SERVICE_UUID_COMPLETE,
            AdStructure::ServiceUuids128(_) => ADV_TYPE_128BIT_SERVICE_UUID_COMPLETE,
            AdStructure::CompleteLocalName(_) => ADV_TYPE_COMPLETE_LOCAL_NAME,
            AdStructure::ShortenedLocalName(_) => ADV_TYPE_SHORT_LOCAL_NAME,
            AdStructure::TxPowerLevel(_) => ADV_TYPE_TX_POWER_LEVEL,
            AdStructure::ConnIntervalRange { .. } => ADV_TYPE_SLAVE_CONN_INTERVAL_RANGE,
            AdStructure::Appearance(_) => ADV_TYPE_APPEARANCE,
            AdStructure::ManufacturerSpecific { .. } => ADV_TYPE_MANUFACTURER_SPECIFIC,
        }
    }

    fn data(&self) -> Vec<u8> {
        match self {
            AdStructure::Flags(flags) => vec![*flags],
            AdStructure::ServiceUuids16(uuids) => uuids.iter().flat_map(|u| u.to_le_bytes()).collect(),
            AdStructure::ServiceUuids32(uuids) => uuids.iter().flat_map(|u| u.to_le_bytes()).collect(),
            AdStructure::ServiceUuids128(uuids) => uuids.iter().flat_map(|u| u.to_le_bytes()).collect(),
            AdStructure::CompleteLocalName(name) | AdStructure::ShortenedLocalName(name) => {
                name.as_bytes().to_vec()
            }
            AdStructure::TxPowerLevel(level) => vec![*level as u8],
            AdStructure::ConnIntervalRange { min, max } => {
                let mut data = min.to_le_bytes().to_vec();
                data.extend_from_slice(&max.to_le_bytes());
                data
            }
            AdStructure::Appearance(appearance) => appearance.to_le_bytes().to_vec(),
            AdStructure::ManufacturerSpecific { company_id, payload } => {
                let mut data = company_id.to_le_bytes().to_vec();
                data.extend_from_slice(payload);
                data
            }
        }
    }

    /// Bytes this structure occupies in a payload
    pub fn encoded_len(&self) -> usize {
        2 + self.data().len()
    }

    /// Append `length, type, data` to `buf`
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        let data = self.data();
        buf.push((data.len() + 1) as u8);
        buf.push(self.ad_type());
        buf.extend_from_slice(&data);
    }
}

/// Encode structures into a legacy payload
pub fn encode(structures: &[AdStructure]) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(ADV_DATA_MAX_LEN);
    for structure in structures {
        structure.encode_into(&mut buf);
    }

    check_len(&buf)
}

/// Accept a pre-encoded payload that fits a legacy advertisement
pub fn check_len(payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() > ADV_DATA_MAX_LEN {
        return Err(Error::AdvertisingDataTooLong(payload.len()));
    }

    Ok(payload.to_vec())
}

/// Split a payload into `(type, data)` pairs, stopping at the first malformed structure
pub fn parse(data: &[u8]) -> Vec<(u8, &[u8])> {
    let mut result = Vec::new();
    let mut i = 0;

    while i < data.len() {
        let length = data[i] as usize;
        if length == 0 || i + length >= data.len() {
            break;
        }

        result.push((data[i + 1], &data[i + 2..i + 1 + length]));
        i += 1 + length;
    }

    result
}

/// Read the connection interval range structure out of a payload
pub fn conn_interval_range(data: &[u8]) -> Option<(u16, u16)> {
    parse(data)
        .into_iter()
        .find(|(ad_type, value)| *ad_type == ADV_TYPE_SLAVE_CONN_INTERVAL_RANGE && value.len() == 4)
        .map(|(_, value)| (LittleEndian::read_u16(&value[0..2]), LittleEndian::read_u16(&value[2..4])))
}

/// Declarative advertising payload
///
/// The local name is added last and shortened when the full name does not fit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvertisingData {
    pub flags: Option<u8>,
    pub include_name: bool,
    pub tx_power: Option<i8>,
    pub conn_interval: Option<(u16, u16)>,
    pub appearance: Option<u16>,
    pub service_uuids: Vec<Uuid>,
    pub manufacturer: Option<(u16, Vec<u8>)>,
}

impl AdvertisingData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flags(mut self, flags: u8) -> Self {
        self.flags = Some(flags);
        self
    }

    pub fn include_name(mut self, include: bool) -> Self {
        self.include_name = include;
        self
    }

    pub fn tx_power(mut self, level: i8) -> Self {
        self.tx_power = Some(level);
        self
    }

    pub fn conn_interval(mut self, min: u16, max: u16) -> Self {
        self.conn_interval = Some((min, max));
        self
    }

    pub fn appearance(mut self, appearance: u16) -> Self {
        self.appearance = Some(appearance);
        self
    }

    pub fn service_uuid(mut self, uuid: Uuid) -> Self {
        self.service_uuids.push(uuid);
        self
    }

    pub fn manufacturer(mut self, company_id: u16, payload: Vec<u8>) -> Self {
        self.manufacturer = Some((company_id, payload));
        self
    }

    /// AD structures for this payload, `device_name` standing in for the name
    pub fn structures(&self, device_name: &str) -> Vec<AdStructure> {
        let mut structures = Vec::new();

        if let Some(flags) = self.flags {
            structures.push(AdStructure::Flags(flags));
        }
        if let Some(level) = self.tx_power {
            structures.push(AdStructure::TxPowerLevel(level));
        }
        if let Some((min, max)) = self.conn_interval {
            structures.push(AdStructure::ConnIntervalRange { min, max });
        }
        if let Some(appearance) = self.appearance {
            structures.push(AdStructure::Appearance(appearance));
        }

        let mut uuids16 = Vec::new();
        let mut uuids32 = Vec::new();
        let mut uuids128 = Vec::new();
        for uuid in &self.service_uuids {
            match *uuid {
                Uuid::Uuid16(u) => uuids16.push(u),
                Uuid::Uuid32(u) => uuids32.push(u),
                Uuid::Uuid128(u) => uuids128.push(u128::from_le_bytes(u)),
            }
        }
        if !uuids16.is_empty() {
            structures.push(AdStructure::ServiceUuids16(uuids16));
        }
        if !uuids32.is_empty() {
            structures.push(AdStructure::ServiceUuids32(uuids32));
        }
        if !uuids128.is_empty() {
            structures.push(AdStructure::ServiceUuids128(uuids128));
        }

        if let Some((company_id, payload)) = &self.manufacturer {
            structures.push(AdStructure::ManufacturerSpecific {
                company_id: *company_id,
                payload: payload.clone(),
            });
        }

        if self.include_name && !device_name.is_empty() {
            let used: usize = structures.iter().map(AdStructure::encoded_len).sum();
            let room = ADV_DATA_MAX_LEN.saturating_sub(used + 2);
            if device_name.len() <= room {
                structures.push(AdStructure::CompleteLocalName(device_name.to_string()));
            } else if room > 0 {
                let mut end = room;
                while !device_name.is_char_boundary(end) {
                    end -= 1;
                }
                structures.push(AdStructure::ShortenedLocalName(device_name[..end].to_string()));
            }
        }

        structures
    }

    /// Encode for the stack
    pub fn encode(&self, device_name: &str) -> Result<Vec<u8>> {
        encode(&self.structures(device_name))
    }
}
