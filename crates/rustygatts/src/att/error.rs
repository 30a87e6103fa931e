//! Error handling for the attribute server
use super::constants::*;
use crate::gatt::Uuid;
use thiserror::Error;

/// ATT status codes answered to the peer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttErrorCode {
    /// Success
    NoError,
    /// Invalid handle
    InvalidHandle,
    /// Read not permitted
    ReadNotPermitted,
    /// Write not permitted
    WriteNotPermitted,
    /// Invalid PDU
    InvalidPdu,
    /// Request not supported
    RequestNotSupported,
    /// Invalid offset
    InvalidOffset,
    /// Prepare queue full
    PrepareQueueFull,
    /// Attribute not found
    AttributeNotFound,
    /// Attribute not long
    AttributeNotLong,
    /// Invalid attribute value length
    InvalidAttributeValueLength,
    /// Unlikely error, used as the generic failure status
    Unlikely,
    /// Insufficient resources
    InsufficientResources,
    /// Value not allowed
    ValueNotAllowed,
    /// Application error
    ApplicationError(u8),
    /// Common profile error
    CommonProfileError(u8),
    /// Unknown error code
    Unknown(u8),
}

impl AttErrorCode {
    /// Whether this code reports success
    pub fn is_success(&self) -> bool {
        *self == AttErrorCode::NoError
    }
}

impl From<u8> for AttErrorCode {
    fn from(code: u8) -> Self {
        match code {
            0 => AttErrorCode::NoError,
            ATT_ERROR_INVALID_HANDLE => AttErrorCode::InvalidHandle,
            ATT_ERROR_READ_NOT_PERMITTED => AttErrorCode::ReadNotPermitted,
            ATT_ERROR_WRITE_NOT_PERMITTED => AttErrorCode::WriteNotPermitted,
            ATT_ERROR_INVALID_PDU => AttErrorCode::InvalidPdu,
            ATT_ERROR_REQUEST_NOT_SUPPORTED => AttErrorCode::RequestNotSupported,
            ATT_ERROR_INVALID_OFFSET => AttErrorCode::InvalidOffset,
            ATT_ERROR_PREPARE_QUEUE_FULL => AttErrorCode::PrepareQueueFull,
            ATT_ERROR_ATTRIBUTE_NOT_FOUND => AttErrorCode::AttributeNotFound,
            ATT_ERROR_ATTRIBUTE_NOT_LONG => AttErrorCode::AttributeNotLong,
            ATT_ERROR_INVALID_ATTRIBUTE_VALUE_LENGTH => AttErrorCode::InvalidAttributeValueLength,
            ATT_ERROR_UNLIKELY => AttErrorCode::Unlikely,
            ATT_ERROR_INSUFFICIENT_RESOURCES => AttErrorCode::InsufficientResources,
            ATT_ERROR_VALUE_NOT_ALLOWED => AttErrorCode::ValueNotAllowed,
            c if (ATT_ERROR_APPLICATION_ERROR_START..=ATT_ERROR_APPLICATION_ERROR_END)
                .contains(&c) =>
            {
                AttErrorCode::ApplicationError(c)
            }
            c if c >= ATT_ERROR_COMMON_PROFILE_ERROR_START => AttErrorCode::CommonProfileError(c),
            _ => AttErrorCode::Unknown(code),
        }
    }
}

impl From<AttErrorCode> for u8 {
    fn from(code: AttErrorCode) -> u8 {
        match code {
            AttErrorCode::NoError => 0,
            AttErrorCode::InvalidHandle => ATT_ERROR_INVALID_HANDLE,
            AttErrorCode::ReadNotPermitted => ATT_ERROR_READ_NOT_PERMITTED,
            AttErrorCode::WriteNotPermitted => ATT_ERROR_WRITE_NOT_PERMITTED,
            AttErrorCode::InvalidPdu => ATT_ERROR_INVALID_PDU,
            AttErrorCode::RequestNotSupported => ATT_ERROR_REQUEST_NOT_SUPPORTED,
            AttErrorCode::InvalidOffset => ATT_ERROR_INVALID_OFFSET,
            AttErrorCode::PrepareQueueFull => ATT_ERROR_PREPARE_QUEUE_FULL,
            AttErrorCode::AttributeNotFound => ATT_ERROR_ATTRIBUTE_NOT_FOUND,
            AttErrorCode::AttributeNotLong => ATT_ERROR_ATTRIBUTE_NOT_LONG,
            AttErrorCode::InvalidAttributeValueLength => ATT_ERROR_INVALID_ATTRIBUTE_VALUE_LENGTH,
            AttErrorCode::Unlikely => ATT_ERROR_UNLIKELY,
            AttErrorCode::InsufficientResources => ATT_ERROR_INSUFFICIENT_RESOURCES,
            AttErrorCode::ValueNotAllowed => ATT_ERROR_VALUE_NOT_ALLOWED,
            AttErrorCode::ApplicationError(code) => code,
            AttErrorCode::CommonProfileError(code) => code,
            AttErrorCode::Unknown(code) => code,
        }
    }
}

/// Attribute-level failures raised inside the engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttError {
    #[error("Attribute handle {0} has not been created")]
    UncreatedHandle(u16),

    #[error("Handle {handle} already assigned (existing {existing})")]
    HandleAlreadyAssigned { handle: u16, existing: u16 },

    #[error("Handle {handle} already holds a {existing} attribute")]
    AttributeExists { handle: u16, existing: Uuid },

    #[error("Invalid offset {offset} for handle {handle}")]
    InvalidOffset { handle: u16, offset: u16 },

    #[error("Value of {len} bytes exceeds limit of {max} bytes")]
    InvalidAttributeValueLength { len: usize, max: usize },

    #[error("Prepared write rejected: {0:?}")]
    PreparedWriteRejected(AttErrorCode),
}

impl AttError {
    /// Convert to the ATT status answered to the peer
    pub fn to_error_code(&self) -> AttErrorCode {
        match self {
            AttError::UncreatedHandle(_) => AttErrorCode::Unlikely,
            AttError::HandleAlreadyAssigned { .. } | AttError::AttributeExists { .. } => AttErrorCode::Unlikely,
            AttError::InvalidOffset { .. } => AttErrorCode::InvalidOffset,
            AttError::InvalidAttributeValueLength { .. } => {
                AttErrorCode::InvalidAttributeValueLength
            }
            AttError::PreparedWriteRejected(code) => *code,
        }
    }
}

/// ATT Result type
pub type AttResult<T> = Result<T, AttError>;
