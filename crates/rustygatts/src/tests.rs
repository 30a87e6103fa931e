//! End-to-end tests driving the server with scripted stack events

use crate::att::{AttErrorCode, CLIENT_CHAR_CONFIG_UUID};
use crate::command::{Command, GattResponse};
use crate::config::ServerConfig;
use crate::error::Error;
use crate::event::{GapEvent, GattIf, GattsEvent, ReadRequest, StackEvent};
use crate::gap::{AdvertisingState, BdAddr, BtStatus};
use crate::gatt::{uart_profile, uart_server_config, BuildState, ProfileConfig, ProfileEntry, ProfileHandler, Uuid};
use crate::server::{EventHandler, GattServer, ServerStats};
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

pub(crate) fn setup() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

pub(crate) const IF_A: GattIf = 3;
pub(crate) const IF_B: GattIf = 4;

pub(crate) fn peer() -> BdAddr {
    BdAddr::new([0x55, 0x44, 0x33, 0x22, 0x11, 0x00])
}

fn ok() -> AttErrorCode {
    AttErrorCode::NoError
}

fn gatts(interface: GattIf, event: GattsEvent) -> StackEvent {
    StackEvent::gatts(interface, event)
}

/// Confirmations creating profile `config` at `base`, characteristic at
/// `base + 2` and CCCD at `base + 3`
pub(crate) fn build_events(interface: GattIf, config: &ProfileConfig, base: u16) -> Vec<StackEvent> {
    vec![
        gatts(
            interface,
            GattsEvent::Registered {
                status: ok(),
                app_id: config.app_id,
            },
        ),
        gatts(
            interface,
            GattsEvent::ServiceCreated {
                status: ok(),
                service_handle: base,
                service_id: config.service_id,
            },
        ),
        gatts(
            interface,
            GattsEvent::ServiceStarted {
                status: ok(),
                service_handle: base,
            },
        ),
        gatts(
            interface,
            GattsEvent::CharacteristicAdded {
                status: ok(),
                attr_handle: base + 2,
                service_handle: base,
                char_uuid: config.characteristics[0].uuid,
            },
        ),
        gatts(
            interface,
            GattsEvent::DescriptorAdded {
                status: ok(),
                attr_handle: base + 3,
                service_handle: base,
                descr_uuid: Uuid::from_u16(CLIENT_CHAR_CONFIG_UUID),
            },
        ),
    ]
}

pub(crate) fn demo_server() -> GattServer {
    let mut server = GattServer::new(ServerConfig::default());
    server.add_profile(ProfileConfig::test_profile_a()).unwrap();
    server.add_profile(ProfileConfig::test_profile_b()).unwrap();
    server
}

fn bring_up(server: &mut GattServer) -> Vec<Command> {
    let mut out = server.start().unwrap();
    let a = build_events(IF_A, &ProfileConfig::test_profile_a(), 40);
    let b = build_events(IF_B, &ProfileConfig::test_profile_b(), 50);
    for (ea, eb) in a.into_iter().zip(b) {
        out.extend(server.handle_event(ea));
        out.extend(server.handle_event(eb));
    }
    out.extend(server.handle_event(GapEvent::ScanRspDataSet { status: BtStatus::SUCCESS }.into()));
    out.extend(server.handle_event(GapEvent::AdvDataSet { status: BtStatus::SUCCESS }.into()));
    out
}

fn count(out: &[Command], pred: impl Fn(&Command) -> bool) -> usize {
    out.iter().filter(|c| pred(c)).count()
}

#[test]
fn test_start_commands() {
    setup();
    let mut server = demo_server();
    let out = server.start().unwrap();

    assert_eq!(out[0], Command::SetDeviceName("GATTS_DEMO".to_string()));
    assert!(matches!(out[1], Command::ConfigAdvData(_)));
    assert!(matches!(out[2], Command::ConfigScanRspData(_)));
    assert_eq!(
        out[3..],
        [Command::RegisterApp { app_id: 0 }, Command::RegisterApp { app_id: 1 }]
    );
    assert_eq!(server.advertising_state(), AdvertisingState::Configuring);
}

#[test]
fn test_bring_up_two_profiles() {
    setup();
    let mut server = demo_server();
    let out = bring_up(&mut server);

    assert_eq!(count(&out, |c| matches!(c, Command::StartAdvertising(_))), 1);
    assert_eq!(count(&out, |c| matches!(c, Command::CreateService { .. })), 2);
    assert_eq!(server.advertising_state(), AdvertisingState::Starting);

    let a = server.profile(0).unwrap();
    let b = server.profile(1).unwrap();
    assert_eq!(a.build, BuildState::Ready);
    assert_eq!(b.build, BuildState::Ready);
    assert_eq!((a.interface, a.char_handle(), a.descr_handle()), (Some(IF_A), Some(42), Some(43)));
    assert_eq!((b.interface, b.char_handle(), b.descr_handle()), (Some(IF_B), Some(52), Some(53)));

    server.handle_event(GapEvent::AdvStarted { status: BtStatus::SUCCESS }.into());
    assert_eq!(server.advertising_state(), AdvertisingState::Advertising);
    assert_eq!(server.stats(), ServerStats::default());
}

#[test]
fn test_connect_and_disconnect_once_per_link() {
    setup();
    let mut server = demo_server();
    bring_up(&mut server);
    server.handle_event(GapEvent::AdvStarted { status: BtStatus::SUCCESS }.into());

    let mut out = Vec::new();
    for interface in [IF_A, IF_B] {
        out.extend(server.handle_event(gatts(interface, GattsEvent::Connected { conn_id: 0, peer: peer() })));
    }
    assert_eq!(count(&out, |c| matches!(c, Command::UpdateConnParams(_))), 1);
    assert_eq!(count(&out, |c| matches!(c, Command::StopAdvertising)), 0);
    assert_eq!(server.profile(0).unwrap().conn_id, Some(0));
    assert_eq!(server.profile(1).unwrap().conn_id, Some(0));

    let mut out = Vec::new();
    for interface in [IF_A, IF_B] {
        out.extend(server.handle_event(gatts(
            interface,
            GattsEvent::Disconnected {
                conn_id: 0,
                peer: peer(),
                reason: 0x13,
            },
        )));
    }
    assert_eq!(count(&out, |c| matches!(c, Command::StartAdvertising(_))), 1);
    assert!(server.profile(0).unwrap().conn_id.is_none());
    assert!(server.profile(1).unwrap().conn_id.is_none());
    assert_eq!(server.connections().active_links(), 0);
}

#[test]
fn test_unknown_interface_dropped() {
    setup();
    let mut server = demo_server();
    bring_up(&mut server);

    let out = server.handle_event(gatts(9, GattsEvent::Mtu { conn_id: 0, mtu: 185 }));
    assert!(out.is_empty());
    assert_eq!(server.stats().dropped_events, 1);

    // An unregistered application id is dropped as well
    let out = server.handle_event(gatts(
        9,
        GattsEvent::Registered {
            status: ok(),
            app_id: 7,
        },
    ));
    assert!(out.is_empty());
    assert_eq!(server.stats().dropped_events, 2);
}

#[test]
fn test_halted_build_counted() {
    setup();
    let mut server = demo_server();
    server.start().unwrap();

    server.handle_event(gatts(
        IF_A,
        GattsEvent::Registered {
            status: ok(),
            app_id: 0,
        },
    ));
    let out = server.handle_event(gatts(
        IF_A,
        GattsEvent::ServiceCreated {
            status: AttErrorCode::Unlikely,
            service_handle: 0,
            service_id: ProfileConfig::test_profile_a().service_id,
        },
    ));

    assert!(out.is_empty());
    assert!(server.profile(0).unwrap().build.is_halted());
    assert_eq!(server.stats().halted_builds, 1);

    // The other profile is unaffected
    for event in build_events(IF_B, &ProfileConfig::test_profile_b(), 50) {
        server.handle_event(event);
    }
    assert!(server.profile(1).unwrap().is_ready());
}

#[test]
fn test_push_requires_connection() {
    setup();
    let mut server = demo_server();
    bring_up(&mut server);

    assert!(matches!(server.push(0, 0, vec![1, 2]), Err(Error::NotConnected(0))));
    assert!(matches!(server.push(5, 0, vec![1, 2]), Err(Error::UnknownAppId(5))));

    server.handle_event(gatts(IF_B, GattsEvent::Connected { conn_id: 1, peer: peer() }));
    assert_eq!(
        server.push(1, 0, vec![1, 2]).unwrap(),
        Command::SendIndicate {
            interface: IF_B,
            conn_id: 1,
            attr_handle: 52,
            value: vec![1, 2],
            need_confirm: false,
        }
    );
}

#[test]
fn test_uart_server_flow() {
    setup();
    let mut server = GattServer::new(uart_server_config());
    server.add_profile(uart_profile(0, Arc::new(|_: &[u8]| {}))).unwrap();

    let out = server.start().unwrap();
    assert_eq!(count(&out, |c| matches!(c, Command::ConfigScanRspData(_))), 0);

    let out = server.handle_event(GapEvent::AdvDataSet { status: BtStatus::SUCCESS }.into());
    assert_eq!(count(&out, |c| matches!(c, Command::StartAdvertising(_))), 1);
    server.handle_event(GapEvent::AdvStarted { status: BtStatus::SUCCESS }.into());

    server.handle_event(gatts(
        IF_A,
        GattsEvent::Registered {
            status: ok(),
            app_id: 0,
        },
    ));
    let out = server.handle_event(gatts(IF_A, GattsEvent::Connected { conn_id: 2, peer: peer() }));
    assert_eq!(count(&out, |c| matches!(c, Command::StopAdvertising)), 1);
    assert_eq!(count(&out, |c| matches!(c, Command::UpdateConnParams(_))), 1);

    let out = server.handle_event(gatts(
        IF_A,
        GattsEvent::Disconnected {
            conn_id: 2,
            peer: peer(),
            reason: 0x08,
        },
    ));
    assert_eq!(count(&out, |c| matches!(c, Command::StartAdvertising(_))), 1);

    // The hierarchy is not built yet, so nothing can be pushed
    assert!(matches!(server.push(0, 0, vec![1]), Err(Error::NotReady(0))));
}

/// Answers every read with a fixed value and builds nothing
struct FixedReader;

impl ProfileHandler for FixedReader {
    fn handle_event(&mut self, entry: &mut ProfileEntry, interface: GattIf, event: &GattsEvent, out: &mut Vec<Command>) {
        if let GattsEvent::Read(req) = event {
            out.push(Command::SendResponse {
                interface,
                conn_id: req.conn_id,
                trans_id: req.trans_id,
                status: ok(),
                value: Some(GattResponse {
                    handle: req.handle,
                    offset: 0,
                    value: entry.app_id.to_le_bytes().to_vec(),
                }),
            });
        }
    }
}

#[test]
fn test_custom_handler_receives_its_events() {
    setup();
    let mut server = GattServer::new(ServerConfig::default());
    server.add_handler(7, Box::new(FixedReader)).unwrap();
    assert!(matches!(
        server.add_handler(7, Box::new(FixedReader)),
        Err(Error::DuplicateAppId(7))
    ));

    let out = server.start().unwrap();
    assert_eq!(out.last(), Some(&Command::RegisterApp { app_id: 7 }));

    let out = server.handle_event(gatts(IF_A, GattsEvent::Registered { status: ok(), app_id: 7 }));
    assert!(out.is_empty());
    assert_eq!(server.profile(7).unwrap().interface, Some(IF_A));

    let out = server.handle_event(gatts(
        IF_A,
        GattsEvent::Read(ReadRequest {
            conn_id: 0,
            trans_id: 11,
            peer: peer(),
            handle: 99,
            offset: 0,
            is_long: false,
            need_rsp: true,
        }),
    ));
    assert_eq!(
        out,
        vec![Command::SendResponse {
            interface: IF_A,
            conn_id: 0,
            trans_id: 11,
            status: ok(),
            value: Some(GattResponse {
                handle: 99,
                offset: 0,
                value: vec![7, 0],
            }),
        }]
    );
}
