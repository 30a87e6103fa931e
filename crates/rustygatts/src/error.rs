//! Error types for the rustygatts library
//!
//! This module defines the error types used throughout the library.

use crate::att::AttError;
use crate::event::GattIf;
use thiserror::Error;

/// Errors reported by the external stack when a command is submitted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StackError {
    #[error("Stack busy")]
    Busy,

    #[error("Command invalid in current stack state")]
    InvalidState,

    #[error("Command rejected: {0}")]
    Rejected(String),
}

/// Errors returned by the engine's operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Profile table full ({0} profiles)")]
    RegistryFull(usize),

    #[error("Application id {0} already registered")]
    DuplicateAppId(u16),

    #[error("No unbound profile with application id {0}")]
    UnknownAppId(u16),

    #[error("No profile owns interface {0}")]
    UnknownInterface(GattIf),

    #[error("Interface {interface} already owned by profile {owner}")]
    InterfaceInUse { interface: GattIf, owner: u16 },

    #[error("Advertising payload of {0} bytes exceeds 31 bytes")]
    AdvertisingDataTooLong(usize),

    #[error("Profile {0} has no active connection")]
    NotConnected(u16),

    #[error("Profile {0} attribute hierarchy not ready")]
    NotReady(u16),

    #[error("Profile {app_id} has no characteristic {index}")]
    UnknownCharacteristic { app_id: u16, index: usize },

    #[error("Characteristic {index} of profile {app_id} can neither notify nor indicate")]
    PushNotSupported { app_id: u16, index: usize },

    #[error("Payload of {len} bytes exceeds limit of {max} bytes")]
    PayloadTooLong { len: usize, max: usize },

    #[error("Attribute error: {0}")]
    Att(#[from] AttError),

    #[error("Stack error: {0}")]
    Stack(#[from] StackError),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;
