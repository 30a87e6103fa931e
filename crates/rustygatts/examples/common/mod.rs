//! Simulated Bluetooth stack shared by the examples
//!
//! Every submitted command is answered with the confirmation a real stack
//! would deliver later. Attribute handles are handed out sequentially.

#![allow(dead_code)]

use rustygatts::{
    BdAddr, BleStack, BtStatus, Command, GapEvent, GattIf, GattsEvent, Host, StackError, StackEvent,
};
use std::collections::{HashMap, VecDeque};

pub struct SimStack {
    events: VecDeque<StackEvent>,
    next_interface: GattIf,
    next_handle: u16,
    /// service handle -> (owning interface, next free handle)
    services: HashMap<u16, (GattIf, u16)>,
}

impl SimStack {
    pub fn new() -> Self {
        Self {
            events: VecDeque::new(),
            next_interface: 3,
            next_handle: 40,
            services: HashMap::new(),
        }
    }

    pub fn inject(&mut self, event: StackEvent) {
        self.events.push_back(event);
    }

    pub fn next_event(&mut self) -> Option<StackEvent> {
        self.events.pop_front()
    }

    fn confirm(&mut self, interface: GattIf, event: GattsEvent) {
        self.events.push_back(StackEvent::gatts(interface, event));
    }

    fn allocate(&mut self, service_handle: u16, count: u16) -> Result<(GattIf, u16), StackError> {
        let (interface, cursor) = self
            .services
            .get_mut(&service_handle)
            .ok_or(StackError::InvalidState)?;
        let handle = *cursor + count - 1;
        *cursor += count;
        Ok((*interface, handle))
    }
}

impl BleStack for SimStack {
    fn submit(&mut self, command: &Command) -> Result<(), StackError> {
        let ok = rustygatts::AttErrorCode::NoError;
        match command {
            Command::SetDeviceName(name) => println!("stack: device name '{}'", name),
            Command::ConfigAdvData(data) => {
                println!("stack: adv data {}", hex::encode(data));
                self.inject(GapEvent::AdvDataSet { status: BtStatus::SUCCESS }.into());
            }
            Command::ConfigScanRspData(data) => {
                println!("stack: scan response {}", hex::encode(data));
                self.inject(GapEvent::ScanRspDataSet { status: BtStatus::SUCCESS }.into());
            }
            Command::StartAdvertising(_) => self.inject(GapEvent::AdvStarted { status: BtStatus::SUCCESS }.into()),
            Command::StopAdvertising => self.inject(GapEvent::AdvStopped { status: BtStatus::SUCCESS }.into()),
            Command::UpdateConnParams(req) => self.inject(
                GapEvent::ConnParamsUpdated {
                    status: BtStatus::SUCCESS,
                    peer: req.peer,
                    min_interval: req.params.min_interval,
                    max_interval: req.params.max_interval,
                    latency: req.params.latency,
                    conn_interval: req.params.max_interval,
                    timeout: req.params.timeout,
                }
                .into(),
            ),
            Command::RegisterApp { app_id } => {
                let interface = self.next_interface;
                self.next_interface += 1;
                self.confirm(interface, GattsEvent::Registered { status: ok, app_id: *app_id });
            }
            Command::CreateService {
                interface,
                service_id,
                num_handles,
            } => {
                let service_handle = self.next_handle;
                self.next_handle += num_handles;
                self.services.insert(service_handle, (*interface, service_handle + 1));
                self.confirm(
                    *interface,
                    GattsEvent::ServiceCreated {
                        status: ok,
                        service_handle,
                        service_id: *service_id,
                    },
                );
            }
            Command::StartService { service_handle } => {
                let (interface, _) = *self.services.get(service_handle).ok_or(StackError::InvalidState)?;
                self.confirm(
                    interface,
                    GattsEvent::ServiceStarted {
                        status: ok,
                        service_handle: *service_handle,
                    },
                );
            }
            Command::AddCharacteristic { service_handle, uuid, .. } => {
                // Declaration and value
                let (interface, attr_handle) = self.allocate(*service_handle, 2)?;
                self.confirm(
                    interface,
                    GattsEvent::CharacteristicAdded {
                        status: ok,
                        attr_handle,
                        service_handle: *service_handle,
                        char_uuid: *uuid,
                    },
                );
            }
            Command::AddDescriptor { service_handle, uuid, .. } => {
                let (interface, attr_handle) = self.allocate(*service_handle, 1)?;
                self.confirm(
                    interface,
                    GattsEvent::DescriptorAdded {
                        status: ok,
                        attr_handle,
                        service_handle: *service_handle,
                        descr_uuid: *uuid,
                    },
                );
            }
            Command::GetAttributeValue { attr_handle } => println!("stack: attribute {} created", attr_handle),
            Command::SendResponse { conn_id, trans_id, status, value, .. } => println!(
                "stack: response conn {} trans {} {:?} {}",
                conn_id,
                trans_id,
                status,
                value.as_ref().map(|v| hex::encode(&v.value)).unwrap_or_default()
            ),
            Command::SendIndicate {
                attr_handle,
                value,
                need_confirm,
                ..
            } => println!(
                "stack: {} on {} {}",
                if *need_confirm { "indicate" } else { "notify" },
                attr_handle,
                hex::encode(value)
            ),
        }
        Ok(())
    }
}

/// Deliver queued events until the stack goes quiet
pub fn drain(host: &mut Host<SimStack>) {
    while let Some(event) = host.stack_mut().next_event() {
        host.deliver(event);
    }
}

pub fn central() -> BdAddr {
    BdAddr::new([0x9A, 0x78, 0x56, 0x34, 0x12, 0xC0])
}

/// Report a connection to every registered profile, as the stack does
pub fn connect<S: BleStack>(host: &mut Host<S>, conn_id: u16) {
    let interfaces: Vec<GattIf> = host.server().registry().entries().filter_map(|e| e.interface).collect();
    for interface in interfaces {
        host.deliver(StackEvent::gatts(interface, GattsEvent::Connected { conn_id, peer: central() }));
    }
}

/// Report a disconnection to every registered profile
pub fn disconnect<S: BleStack>(host: &mut Host<S>, conn_id: u16) {
    let interfaces: Vec<GattIf> = host.server().registry().entries().filter_map(|e| e.interface).collect();
    for interface in interfaces {
        host.deliver(StackEvent::gatts(
            interface,
            GattsEvent::Disconnected {
                conn_id,
                peer: central(),
                reason: 0x13,
            },
        ));
    }
}
