//! Connection lifecycle
//!
//! Every profile sees each connect and disconnect. The coordinator collapses
//! those copies so the parameter update and advertising restart happen once
//! per link.

use super::types::{BdAddr, ConnParams, ConnUpdateRequest};
use crate::command::Command;
use log::{debug, info};
use std::collections::HashMap;

/// Tracks live links and requests connection parameters once per link
#[derive(Debug)]
pub struct ConnectionCoordinator {
    params: ConnParams,
    links: HashMap<u16, BdAddr>,
}

impl ConnectionCoordinator {
    pub fn new(params: ConnParams) -> Self {
        Self {
            params,
            links: HashMap::new(),
        }
    }

    /// Returns true when this is the first report of the link
    pub fn on_connect(&mut self, conn_id: u16, peer: BdAddr, out: &mut Vec<Command>) -> bool {
        if self.links.insert(conn_id, peer).is_some() {
            return false;
        }

        info!("Link {} up with {}, requesting {:?}", conn_id, peer, self.params);
        out.push(Command::UpdateConnParams(ConnUpdateRequest {
            peer,
            params: self.params,
        }));
        true
    }

    /// Returns true when this is the first report of the link going down
    pub fn on_disconnect(&mut self, conn_id: u16, reason: u8) -> bool {
        match self.links.remove(&conn_id) {
            Some(peer) => {
                info!("Link {} to {} down, reason {:#04x}", conn_id, peer, reason);
                true
            }
            None => {
                debug!("Disconnect of untracked link {}", conn_id);
                false
            }
        }
    }

    pub fn is_connected(&self, conn_id: u16) -> bool {
        self.links.contains_key(&conn_id)
    }

    pub fn active_links(&self) -> usize {
        self.links.len()
    }

    pub fn params(&self) -> &ConnParams {
        &self.params
    }
}
