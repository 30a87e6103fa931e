//! Attribute Protocol (ATT) building blocks for the server engine
//!
//! This module holds the protocol-independent pieces the GATT profiles are
//! built from: the attribute value store, the prepared-write buffer and the
//! ATT status codes answered to peers.

pub mod constants;
pub mod error;
pub mod prepare;
pub mod store;

#[cfg(test)]
mod tests;

// Re-export the public API
pub use self::constants::*;
pub use self::error::{AttError, AttErrorCode, AttResult};
pub use self::prepare::{PrepareState, PreparedWriteBuffer};
pub use self::store::{Attribute, AttributeStore};
