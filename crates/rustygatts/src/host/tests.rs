//! Unit tests for the host driver

use super::*;
use crate::error::Error;
use crate::event::{GapEvent, GattsEvent};
use crate::gap::{AdvertisingState, BtStatus};
use crate::gatt::ProfileConfig;
use crate::tests::{build_events, demo_server, peer, setup, IF_A};

/// Records submitted commands and refuses the ones it is told to
#[derive(Default)]
struct MockStack {
    submitted: Vec<Command>,
    refuse_start: bool,
}

impl BleStack for MockStack {
    fn submit(&mut self, command: &Command) -> std::result::Result<(), StackError> {
        if self.refuse_start && matches!(command, Command::StartAdvertising(_)) {
            return Err(StackError::Busy);
        }
        self.submitted.push(command.clone());
        Ok(())
    }
}

fn starts(stack: &MockStack) -> usize {
    stack
        .submitted
        .iter()
        .filter(|c| matches!(c, Command::StartAdvertising(_)))
        .count()
}

#[test]
fn test_start_submits_bring_up_commands() {
    setup();
    let mut host = Host::new(demo_server(), MockStack::default());
    host.start().unwrap();

    let submitted = &host.stack().submitted;
    assert_eq!(submitted.len(), 5);
    assert!(matches!(submitted[0], Command::SetDeviceName(_)));
    assert_eq!(submitted[3], Command::RegisterApp { app_id: 0 });
    assert_eq!(submitted[4], Command::RegisterApp { app_id: 1 });
}

#[test]
fn test_refused_start_is_counted_not_retried() {
    setup();
    let stack = MockStack {
        refuse_start: true,
        ..MockStack::default()
    };
    let mut host = Host::new(demo_server(), stack);
    host.start().unwrap();

    host.deliver(GapEvent::AdvDataSet { status: BtStatus::SUCCESS }.into());
    host.deliver(GapEvent::ScanRspDataSet { status: BtStatus::SUCCESS }.into());

    assert_eq!(starts(host.stack()), 0);
    assert_eq!(host.server().stats().failed_submissions, 1);
    assert_eq!(host.server().stats().advertising_failures, 1);
    assert_eq!(
        host.server().advertising_state(),
        AdvertisingState::Failed(BtStatus::BUSY)
    );

    // Later events do not trigger another attempt
    host.stack_mut().refuse_start = false;
    host.deliver(GapEvent::ScanRspDataSet { status: BtStatus::SUCCESS }.into());
    assert_eq!(starts(host.stack()), 0);
}

#[test]
fn test_start_failure_reported_by_stack() {
    setup();
    let mut host = Host::new(demo_server(), MockStack::default());
    host.start().unwrap();
    host.deliver(GapEvent::AdvDataSet { status: BtStatus::SUCCESS }.into());
    host.deliver(GapEvent::ScanRspDataSet { status: BtStatus::SUCCESS }.into());
    assert_eq!(starts(host.stack()), 1);

    host.deliver(GapEvent::AdvStarted { status: BtStatus(0x0C) }.into());
    assert_eq!(host.server().stats().advertising_failures, 1);
    assert_eq!(host.server().stats().failed_submissions, 0);
}

#[test]
fn test_push_submits_notification() {
    setup();
    let mut host = Host::new(demo_server(), MockStack::default());
    host.start().unwrap();
    for event in build_events(IF_A, &ProfileConfig::test_profile_a(), 40) {
        host.deliver(event);
    }

    assert!(matches!(host.push(0, 0, vec![0xAA]), Err(Error::NotConnected(0))));

    host.deliver(StackEvent::gatts(IF_A, GattsEvent::Connected { conn_id: 0, peer: peer() }));
    host.push(0, 0, vec![0xAA]).unwrap();

    let (_, stack) = host.into_parts();
    assert_eq!(
        stack.submitted.last(),
        Some(&Command::SendIndicate {
            interface: IF_A,
            conn_id: 0,
            attr_handle: 42,
            value: vec![0xAA],
            need_confirm: false,
        })
    );
}
