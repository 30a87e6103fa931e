//! Serial-over-BLE echo against a simulated stack
//!
//! Bytes the central writes to the RX characteristic are notified back on TX.

mod common;

use common::{connect, disconnect, drain, SimStack};
use log::{info, warn};
use rustygatts::gatt::uart::{UART_RX_INDEX, UART_TX_INDEX};
use rustygatts::{uart_profile, uart_server_config, GattServer, GattsEvent, Host, StackEvent, WriteRequest};
use std::sync::{Arc, Mutex};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let inbox: Arc<Mutex<Vec<Vec<u8>>>> = Arc::new(Mutex::new(Vec::new()));
    let rx_inbox = inbox.clone();

    let mut server = GattServer::new(uart_server_config());
    server.add_profile(uart_profile(
        0,
        Arc::new(move |data: &[u8]| {
            if let Ok(mut inbox) = rx_inbox.lock() {
                inbox.push(data.to_vec());
            }
        }),
    ))?;

    let mut host = Host::new(server, SimStack::new());
    host.start()?;
    drain(&mut host);

    let profile = host.server().profile(0).ok_or("UART profile missing")?;
    let interface = profile.interface.ok_or("UART profile not registered")?;
    let rx_handle = profile
        .characteristics
        .get(UART_RX_INDEX)
        .and_then(|c| c.value_handle)
        .ok_or("RX characteristic not built")?;

    connect(&mut host, 0);
    drain(&mut host);
    info!("Connected, advertising {:?}", host.server().advertising_state());

    for (trans_id, line) in ["hello", "from the central"].iter().enumerate() {
        host.deliver(StackEvent::gatts(
            interface,
            GattsEvent::Write(WriteRequest {
                conn_id: 0,
                trans_id: trans_id as u32,
                peer: common::central(),
                handle: rx_handle,
                offset: 0,
                need_rsp: false,
                is_prep: false,
                value: line.as_bytes().to_vec(),
            }),
        ));

        let received: Vec<Vec<u8>> = inbox.lock().map(|mut i| i.drain(..).collect()).unwrap_or_default();
        for data in received {
            info!("RX {:?}", String::from_utf8_lossy(&data));
            if let Err(e) = host.push(0, UART_TX_INDEX, data) {
                warn!("Echo failed: {}", e);
            }
        }
    }

    disconnect(&mut host, 0);
    drain(&mut host);

    // Nothing can be sent once the central is gone
    if let Err(e) = host.push(0, UART_TX_INDEX, b"late".to_vec()) {
        info!("Push after disconnect refused: {}", e);
    }
    Ok(())
}
