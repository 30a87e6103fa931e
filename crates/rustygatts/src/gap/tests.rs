//! Unit tests for advertising and connection handling

use super::ad_data::{self, AdStructure};
use super::*;
use crate::command::Command;
use crate::config::{AdvertisingConfig, AdvertisingPayload};
use crate::error::Error;
use crate::gatt::Uuid;

const PEER: BdAddr = BdAddr {
    bytes: [0x55, 0x44, 0x33, 0x22, 0x11, 0x00],
};

fn starts(out: &[Command]) -> usize {
    out.iter()
        .filter(|c| matches!(c, Command::StartAdvertising(_)))
        .count()
}

#[test]
fn test_advertising_starts_after_both_confirmations() {
    for scan_rsp_first in [false, true] {
        let mut gate = AdvertisingGate::new(AdvParams::default());
        let mut out = Vec::new();
        gate.configure(vec![0x02, 0x01, 0x06], Some(vec![]), &mut out);

        assert_eq!(out.len(), 2);
        assert_eq!(gate.pending(), PendingConfig::ADV_DATA | PendingConfig::SCAN_RSP);
        assert_eq!(gate.state(), AdvertisingState::Configuring);

        out.clear();
        if scan_rsp_first {
            gate.on_scan_rsp_set(BtStatus::SUCCESS, &mut out);
        } else {
            gate.on_adv_data_set(BtStatus::SUCCESS, &mut out);
        }
        // Half configured: nothing may start yet
        assert_eq!(starts(&out), 0);

        if scan_rsp_first {
            gate.on_adv_data_set(BtStatus::SUCCESS, &mut out);
        } else {
            gate.on_scan_rsp_set(BtStatus::SUCCESS, &mut out);
        }
        assert_eq!(starts(&out), 1);
        assert!(gate.pending().is_empty());
        assert_eq!(gate.state(), AdvertisingState::Starting);

        // A repeated confirmation must not start again
        gate.on_adv_data_set(BtStatus::SUCCESS, &mut out);
        assert_eq!(starts(&out), 1);

        gate.on_started(BtStatus::SUCCESS);
        assert_eq!(gate.state(), AdvertisingState::Advertising);
    }
}

#[test]
fn test_failed_configuration_keeps_gate_closed() {
    let mut gate = AdvertisingGate::new(AdvParams::default());
    let mut out = Vec::new();
    gate.configure(vec![], Some(vec![]), &mut out);
    out.clear();

    gate.on_adv_data_set(BtStatus(0x12), &mut out);
    gate.on_scan_rsp_set(BtStatus::SUCCESS, &mut out);

    assert!(out.is_empty());
    assert_eq!(gate.pending(), PendingConfig::ADV_DATA);
}

#[test]
fn test_advertising_without_scan_response() {
    let mut gate = AdvertisingGate::new(AdvParams::default());
    let mut out = Vec::new();
    gate.configure(vec![0x02, 0x01, 0x06], None, &mut out);
    assert_eq!(out, vec![Command::ConfigAdvData(vec![0x02, 0x01, 0x06])]);

    out.clear();
    gate.on_adv_data_set(BtStatus::SUCCESS, &mut out);
    assert_eq!(out, vec![Command::StartAdvertising(AdvParams::default())]);
}

#[test]
fn test_restart_deferred_while_configuring() {
    let mut gate = AdvertisingGate::new(AdvParams::default());
    let mut out = Vec::new();
    gate.configure(vec![], Some(vec![]), &mut out);
    out.clear();

    gate.restart(&mut out);
    assert!(out.is_empty());

    gate.on_adv_data_set(BtStatus::SUCCESS, &mut out);
    gate.on_scan_rsp_set(BtStatus::SUCCESS, &mut out);
    gate.on_started(BtStatus::SUCCESS);
    out.clear();

    gate.restart(&mut out);
    assert_eq!(starts(&out), 1);
}

#[test]
fn test_start_failure_recorded() {
    let mut gate = AdvertisingGate::new(AdvParams::default());
    gate.on_started(BtStatus::BUSY);
    assert_eq!(gate.state(), AdvertisingState::Failed(BtStatus::BUSY));

    let mut out = Vec::new();
    gate.stop(&mut out);
    assert_eq!(out, vec![Command::StopAdvertising]);
    gate.on_stopped(BtStatus::SUCCESS);
    assert_eq!(gate.state(), AdvertisingState::Idle);
}

#[test]
fn test_connection_reported_per_profile_updates_once() {
    let mut coordinator = ConnectionCoordinator::new(ConnParams::default());
    let mut out = Vec::new();

    // Each profile receives its own copy of the connect event
    assert!(coordinator.on_connect(0, PEER, &mut out));
    assert!(!coordinator.on_connect(0, PEER, &mut out));

    assert_eq!(
        out,
        vec![Command::UpdateConnParams(ConnUpdateRequest {
            peer: PEER,
            params: ConnParams {
                min_interval: 0x10,
                max_interval: 0x20,
                latency: 0,
                timeout: 400,
            },
        })]
    );
    assert!(coordinator.is_connected(0));

    assert!(coordinator.on_disconnect(0, 0x13));
    assert!(!coordinator.on_disconnect(0, 0x13));
    assert_eq!(coordinator.active_links(), 0);
}

#[test]
fn test_conn_params_durations() {
    let params = ConnParams::default();
    assert_eq!(params.min_interval_duration().as_millis(), 20);
    assert_eq!(params.max_interval_duration().as_millis(), 40);
    assert_eq!(params.timeout_duration().as_millis(), 4000);

    let rebuilt = ConnParams::from_durations(
        params.min_interval_duration(),
        params.max_interval_duration(),
        0,
        params.timeout_duration(),
    );
    assert_eq!(rebuilt, params);
}

#[test]
fn test_default_advertising_payload() {
    let config = AdvertisingConfig::default();
    let payload = config.adv_data.encode("GATTS_DEMO").unwrap();
    assert!(payload.len() <= ADV_DATA_MAX_LEN);

    let structures = ad_data::parse(&payload);
    let types: Vec<u8> = structures.iter().map(|(t, _)| *t).collect();
    assert_eq!(
        types,
        vec![
            ADV_TYPE_FLAGS,
            ADV_TYPE_SLAVE_CONN_INTERVAL_RANGE,
            ADV_TYPE_16BIT_SERVICE_UUID_COMPLETE,
            ADV_TYPE_COMPLETE_LOCAL_NAME,
        ]
    );
    assert_eq!(structures[0].1, &[0x06u8]);
    assert_eq!(structures[2].1, &[0xEEu8, 0x00, 0xFF, 0x00]);
    assert_eq!(structures[3].1, b"GATTS_DEMO");
    assert_eq!(ad_data::conn_interval_range(&payload), Some((0x0006, 0x0010)));

    let scan_rsp = config.scan_rsp.unwrap().encode("GATTS_DEMO").unwrap();
    let types: Vec<u8> = ad_data::parse(&scan_rsp).iter().map(|(t, _)| *t).collect();
    assert_eq!(
        types,
        vec![
            ADV_TYPE_TX_POWER_LEVEL,
            ADV_TYPE_16BIT_SERVICE_UUID_COMPLETE,
            ADV_TYPE_COMPLETE_LOCAL_NAME,
        ]
    );
}

#[test]
fn test_long_name_is_shortened() {
    let data = AdvertisingData::new()
        .flags(ADV_FLAG_GENERAL_DISCOVERABLE)
        .include_name(true)
        .service_uuid(Uuid::from_u128(0x6E40_0001_B5A3_F393_E0A9_E50E_24DC_CA9E));
    let payload = data.encode("A-RATHER-LONG-PERIPHERAL-NAME").unwrap();

    assert_eq!(payload.len(), ADV_DATA_MAX_LEN);
    let (ad_type, name) = *ad_data::parse(&payload).last().unwrap();
    assert_eq!(ad_type, ADV_TYPE_SHORT_LOCAL_NAME);
    // 31 - flags (3) - one 128-bit UUID (18) - name header (2)
    assert_eq!(name, b"A-RATHER");
}

#[test]
fn test_oversized_payload_rejected() {
    let structures = vec![
        AdStructure::ServiceUuids128(vec![1]),
        AdStructure::ServiceUuids128(vec![2]),
    ];
    assert!(matches!(
        ad_data::encode(&structures),
        Err(Error::AdvertisingDataTooLong(36))
    ));

    let raw = AdvertisingPayload::Raw(vec![0u8; 32]);
    assert!(matches!(raw.encode(""), Err(Error::AdvertisingDataTooLong(32))));
    let raw = AdvertisingPayload::Raw(vec![0x02, 0x01, 0x06]);
    assert_eq!(raw.encode("").unwrap(), vec![0x02, 0x01, 0x06]);
}

#[test]
fn test_manufacturer_and_appearance_encoding() {
    let payload = AdvertisingData::new()
        .appearance(0x0340)
        .manufacturer(0x02E5, vec![0xAA])
        .encode("")
        .unwrap();
    assert_eq!(
        payload,
        vec![0x03, 0x19, 0x40, 0x03, 0x04, 0xFF, 0xE5, 0x02, 0xAA]
    );
}
