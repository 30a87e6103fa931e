//! Attribute value store
//!
//! Holds the current value of every attribute a profile created, keyed by the
//! handle the external stack assigned. The store knows nothing about the
//! protocol: it enforces the per-attribute length limit and nothing else.
use super::error::{AttError, AttResult};
use crate::gatt::Uuid;
use std::collections::BTreeMap;

/// An attribute in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute handle
    pub handle: u16,
    /// Attribute type (UUID)
    pub type_: Uuid,
    /// Current value
    pub value: Vec<u8>,
    /// Maximum value length
    pub max_len: usize,
    /// Only values of exactly `max_len` bytes are accepted
    pub fixed_len: bool,
}

impl Attribute {
    /// Create a new attribute
    pub fn new(handle: u16, type_: Uuid, value: Vec<u8>, max_len: usize) -> Self {
        Self {
            handle,
            type_,
            value,
            max_len,
            fixed_len: false,
        }
    }

    /// Replace the value, rejecting anything longer than `max_len`
    pub fn write(&mut self, value: &[u8]) -> AttResult<()> {
        let bad_len = if self.fixed_len {
            value.len() != self.max_len
        } else {
            value.len() > self.max_len
        };
        if bad_len {
            return Err(AttError::InvalidAttributeValueLength {
                len: value.len(),
                max: self.max_len,
            });
        }

        self.value = value.to_vec();
        Ok(())
    }
}

/// Attribute value store
#[derive(Debug, Default, Clone)]
pub struct AttributeStore {
    attributes: BTreeMap<u16, Attribute>,
}

impl AttributeStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute under a freshly assigned handle
    pub fn insert(
        &mut self,
        handle: u16,
        type_: Uuid,
        initial_value: Vec<u8>,
        max_len: usize,
    ) -> AttResult<()> {
        if let Some(existing) = self.attributes.get(&handle) {
            return Err(AttError::AttributeExists {
                handle,
                existing: existing.type_,
            });
        }

        let mut attr = Attribute::new(handle, type_, Vec::new(), max_len);
        attr.write(&initial_value)?;
        self.attributes.insert(handle, attr);

        Ok(())
    }

    /// Add an attribute whose value always has the length of `initial_value`
    pub fn insert_fixed(&mut self, handle: u16, type_: Uuid, initial_value: Vec<u8>) -> AttResult<()> {
        self.insert(handle, type_, initial_value.clone(), initial_value.len())?;
        if let Some(attr) = self.attributes.get_mut(&handle) {
            attr.fixed_len = true;
        }
        Ok(())
    }

    /// Get an attribute by handle
    pub fn get(&self, handle: u16) -> AttResult<&Attribute> {
        self.attributes
            .get(&handle)
            .ok_or(AttError::UncreatedHandle(handle))
    }

    /// Whether the handle exists in the store
    pub fn contains(&self, handle: u16) -> bool {
        self.attributes.contains_key(&handle)
    }

    /// Current value of an attribute
    pub fn value(&self, handle: u16) -> AttResult<&[u8]> {
        self.get(handle).map(|attr| attr.value.as_slice())
    }

    /// Read the value starting at `offset`
    pub fn read(&self, handle: u16, offset: u16) -> AttResult<Vec<u8>> {
        let value = self.value(handle)?;
        let offset_len = offset as usize;
        if offset_len > value.len() {
            return Err(AttError::InvalidOffset { handle, offset });
        }

        Ok(value[offset_len..].to_vec())
    }

    /// Replace the value of an attribute
    pub fn write(&mut self, handle: u16, value: &[u8]) -> AttResult<()> {
        self.attributes
            .get_mut(&handle)
            .ok_or(AttError::UncreatedHandle(handle))?
            .write(value)
    }

    /// Drop every attribute
    pub fn clear(&mut self) {
        self.attributes.clear();
    }

    /// Number of attributes held
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Whether the store holds no attributes
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}
