//! Two demo profiles served against a simulated stack
//!
//! Brings both profiles up, lets a central connect, enable notifications,
//! perform a long write and read the value back, then disconnect.

mod common;

use common::{connect, disconnect, drain, SimStack};
use log::info;
use rustygatts::att::{ATT_EXEC_WRITE_COMMIT, CCCD_NOTIFY};
use rustygatts::{
    ExecWriteRequest, GattServer, GattsEvent, Host, ProfileConfig, ReadRequest, ServerConfig, StackEvent,
    WriteRequest,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .init();

    let mut server = GattServer::new(ServerConfig::default());
    server.add_profile(ProfileConfig::test_profile_a())?;
    server.add_profile(ProfileConfig::test_profile_b())?;

    let mut host = Host::new(server, SimStack::new());
    host.start()?;
    drain(&mut host);

    let profile = host.server().profile(0).ok_or("profile A missing")?;
    let interface = profile.interface.ok_or("profile A not registered")?;
    let char_handle = profile.char_handle().ok_or("profile A not built")?;
    let cccd_handle = profile.descr_handle().ok_or("profile A has no CCCD")?;
    info!(
        "Profile A ready: characteristic {} CCCD {}, advertising {:?}",
        char_handle,
        cccd_handle,
        host.server().advertising_state()
    );

    connect(&mut host, 0);
    drain(&mut host);

    let peer = common::central();
    let write = |trans_id, handle, offset, is_prep, value: &[u8]| {
        StackEvent::gatts(
            interface,
            GattsEvent::Write(WriteRequest {
                conn_id: 0,
                trans_id,
                peer,
                handle,
                offset,
                need_rsp: true,
                is_prep,
                value: value.to_vec(),
            }),
        )
    };

    // Enabling notifications pushes the test pattern
    host.deliver(write(1, cccd_handle, 0, false, &CCCD_NOTIFY.to_le_bytes()));

    // Long write in two fragments
    host.deliver(write(2, char_handle, 0, true, b"hello, "));
    host.deliver(write(3, char_handle, 7, true, b"long write"));
    host.deliver(StackEvent::gatts(
        interface,
        GattsEvent::ExecuteWrite(ExecWriteRequest {
            conn_id: 0,
            trans_id: 4,
            peer,
            exec_write_flag: ATT_EXEC_WRITE_COMMIT,
        }),
    ));

    host.deliver(StackEvent::gatts(
        interface,
        GattsEvent::Read(ReadRequest {
            conn_id: 0,
            trans_id: 5,
            peer,
            handle: char_handle,
            offset: 0,
            is_long: false,
            need_rsp: true,
        }),
    ));

    host.push(1, 0, vec![0xB0, 0x0B])?;

    disconnect(&mut host, 0);
    drain(&mut host);

    info!("Done: {:?}", host.server().stats());
    Ok(())
}
