pub mod ad_data;
pub mod advertising;
pub mod connection;
pub mod constants;
pub mod types;

#[cfg(test)]
mod tests;

pub use ad_data::{AdStructure, AdvertisingData};
pub use advertising::{AdvertisingGate, AdvertisingState, PendingConfig};
pub use connection::ConnectionCoordinator;
pub use constants::*;
pub use types::*;
