//! Integration tests for the characteristic handlers: wire-value decoding,
//! validation, and read-only accessors.

use std::sync::{Arc, Mutex};

use garagedoor::app::handlers::{CharacteristicHandlers, ServerState, server_state_changed};
use garagedoor::app::machine::{Outcome, lock};
use garagedoor::app::profile::TargetDoorState;
use garagedoor::error::Error;

use crate::mock_hw::{DoorMachine, door, light};

fn door_handlers() -> (CharacteristicHandlers<DoorMachine>, Arc<Mutex<DoorMachine>>) {
    let machine = Arc::new(Mutex::new(door()));
    (CharacteristicHandlers::new(machine.clone()), machine)
}

#[test]
fn reads_report_wire_values() {
    let (handlers, _) = door_handlers();
    assert_eq!(handlers.current_state_read(), 1, "Closed");
    assert_eq!(handlers.target_state_read(), 1, "Closed");
    assert!(!handlers.obstruction_read());
}

#[test]
fn reads_do_not_mutate() {
    let (handlers, machine) = door_handlers();
    handlers.current_state_read();
    handlers.target_state_read();
    handlers.obstruction_read();
    let m = lock(&machine);
    assert_eq!(m.store().storage().writes, 0);
    assert_eq!(m.driver().levels, vec![false]);
}

#[test]
fn valid_write_goes_through_the_machine() {
    let (handlers, machine) = door_handlers();
    assert_eq!(handlers.target_state_write(0), Ok(Outcome::Changed));
    assert_eq!(handlers.current_state_read(), 0, "Open");
    assert_eq!(handlers.target_state_read(), 0, "Open");
    assert_eq!(lock(&machine).notifier().sent.len(), 2);

    assert_eq!(handlers.target_state_write(0), Ok(Outcome::Unchanged));
}

#[test]
fn out_of_range_write_is_rejected_before_the_machine() {
    let (handlers, machine) = door_handlers();
    assert_eq!(handlers.target_state_write(2), Err(Error::InvalidValue(2)));
    assert_eq!(handlers.target_state_write(0xFF), Err(Error::InvalidValue(0xFF)));

    let m = lock(&machine);
    assert_eq!(m.state().target, TargetDoorState::Closed);
    assert_eq!(m.store().storage().writes, 0);
    assert!(m.notifier().sent.is_empty());
}

#[test]
fn light_write_toggles_on() {
    let machine = Arc::new(Mutex::new(light()));
    let handlers = CharacteristicHandlers::new(machine.clone());
    assert_eq!(handlers.target_state_write(1), Ok(Outcome::Changed));
    assert_eq!(handlers.current_state_read(), 1);
    assert_eq!(lock(&machine).notifier().characteristics(), vec![0x33]);
    assert_eq!(handlers.target_state_write(3), Err(Error::InvalidValue(3)));
}

#[test]
fn identify_and_lifecycle_only_log() {
    let (handlers, machine) = door_handlers();
    handlers.identify();
    server_state_changed(ServerState::Idle);
    server_state_changed(ServerState::Running);
    server_state_changed(ServerState::Stopping);
    assert!(lock(&machine).notifier().sent.is_empty());
}
