//! Fuzz target: persisted state record
//!
//! Seeds the NVS slot with arbitrary bytes, boots a machine from it and
//! replays the remaining bytes as target writes and timer expiries,
//! verifying:
//! - Loading never fails, whatever the stored bytes
//! - Every stored record decodes back to the in-memory state
//! - After an expiry the machine is at rest
//!
//! cargo fuzz run fuzz_state_record

#![no_main]

use std::collections::HashMap;

use garagedoor::app::machine::{Actuation, ActuationStateMachine};
use garagedoor::app::notify::{AccessoryId, CharacteristicId, ServiceId};
use garagedoor::app::ports::{ActuatorPort, NotifyPort, StorageError, StoragePort, TimerPort};
use garagedoor::app::profile::{GarageDoor, TargetDoorState};
use garagedoor::app::store::{ActuatorState, STATE_KEY, STATE_NAMESPACE, StateStore};
use libfuzzer_sys::fuzz_target;

// ── In-memory collaborators ───────────────────────────────────

struct MemStore {
    data: HashMap<String, Vec<u8>>,
}

impl StoragePort for MemStore {
    fn read(&self, ns: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        match self.data.get(&format!("{ns}::{key}")) {
            Some(v) => {
                let n = v.len().min(buf.len());
                buf[..n].copy_from_slice(&v[..n]);
                Ok(n)
            }
            None => Err(StorageError::NotFound),
        }
    }

    fn write(&mut self, ns: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.data.insert(format!("{ns}::{key}"), data.to_vec());
        Ok(())
    }

    fn exists(&self, ns: &str, key: &str) -> bool {
        self.data.contains_key(&format!("{ns}::{key}"))
    }

    fn delete(&mut self, ns: &str, key: &str) -> Result<(), StorageError> {
        self.data.remove(&format!("{ns}::{key}"));
        Ok(())
    }
}

#[derive(Default)]
struct Pin(bool);

impl ActuatorPort for Pin {
    fn set_level(&mut self, on: bool) {
        self.0 = on;
    }

    fn level(&self) -> bool {
        self.0
    }
}

#[derive(Default)]
struct Timer {
    armed: bool,
    expired: bool,
}

impl TimerPort for Timer {
    fn arm(&mut self, _duration_ms: u64) {
        self.armed = true;
        self.expired = false;
    }

    fn pause(&mut self) {
        self.armed = false;
        self.expired = false;
    }

    fn has_expired(&self) -> bool {
        self.armed && self.expired
    }
}

struct Discard;

impl NotifyPort for Discard {
    fn notify(&mut self, _: AccessoryId, _: ServiceId, _: CharacteristicId) {}
}

type Machine = ActuationStateMachine<GarageDoor, MemStore, Pin, Timer, Discard>;

fuzz_target!(|data: &[u8]| {
    let (seed, ops) = data.split_at(data.len().min(4));

    let mut store = MemStore { data: HashMap::new() };
    store
        .write(STATE_NAMESPACE, STATE_KEY, seed)
        .expect("in-memory write");

    let mut machine = Machine::new(
        AccessoryId(1),
        StateStore::new(store),
        Pin::default(),
        Timer::default(),
        Discard,
    )
    .expect("load must never fail on bad data");
    machine.start().unwrap();

    for &op in ops {
        match op % 3 {
            0 => {
                machine.apply_target_request(TargetDoorState::Open).unwrap();
            }
            1 => {
                machine.apply_target_request(TargetDoorState::Closed).unwrap();
            }
            _ => {
                machine.timer_mut().expired = true;
                machine.service_expiry().unwrap();
                assert_eq!(machine.target_state(), TargetDoorState::Closed);
                assert!(!machine.driver().level());
            }
        }

        let mut buf = [0u8; 8];
        if let Ok(n) = machine
            .store()
            .storage()
            .read(STATE_NAMESPACE, STATE_KEY, &mut buf)
        {
            if let Some(stored) = ActuatorState::<GarageDoor>::decode(&buf[..n]) {
                assert_eq!(&stored, machine.state());
            }
        }
    }
});
