//! Mock hardware adapters for integration tests.
//!
//! Records every actuator, timer, storage and notification call so tests
//! can assert on the full history without touching real GPIO, timer or
//! NVS registers.

#![allow(dead_code)]

use std::collections::HashMap;

use garagedoor::app::machine::ActuationStateMachine;
use garagedoor::app::notify::{AccessoryId, CharacteristicId, Notification, ServiceId};
use garagedoor::app::ports::{ActuatorPort, NotifyPort, StorageError, StoragePort, TimerPort};
use garagedoor::app::profile::{GarageDoor, Lightbulb};
use garagedoor::app::store::{STATE_KEY, STATE_NAMESPACE, StateStore};

pub const AID: AccessoryId = AccessoryId(1);

pub type DoorMachine =
    ActuationStateMachine<GarageDoor, MockStorage, MockActuator, MockTimer, RecordingNotifier>;
pub type LightMachine =
    ActuationStateMachine<Lightbulb, MockStorage, MockActuator, MockTimer, RecordingNotifier>;

// ── Actuator ──────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockActuator {
    /// Every level written, in order.
    pub levels: Vec<bool>,
}

impl ActuatorPort for MockActuator {
    fn set_level(&mut self, on: bool) {
        self.levels.push(on);
    }

    fn level(&self) -> bool {
        self.levels.last().copied().unwrap_or(false)
    }
}

// ── Timer ─────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockTimer {
    /// Duration of the outstanding arm, if any.
    pub armed: Option<u64>,
    pub expired: bool,
    pub arms: Vec<u64>,
    pub pauses: u32,
}

impl MockTimer {
    /// Simulate the alarm of the outstanding arm.  Returns `false` if
    /// nothing is armed.
    pub fn fire(&mut self) -> bool {
        self.expired = self.armed.is_some();
        self.expired
    }
}

impl TimerPort for MockTimer {
    fn arm(&mut self, duration_ms: u64) {
        self.armed = Some(duration_ms);
        self.expired = false;
        self.arms.push(duration_ms);
    }

    fn pause(&mut self) {
        self.armed = None;
        self.expired = false;
        self.pauses += 1;
    }

    fn has_expired(&self) -> bool {
        self.armed.is_some() && self.expired
    }
}

// ── Storage ───────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockStorage {
    pub data: HashMap<String, Vec<u8>>,
    pub writes: u32,
    /// Error returned by every subsequent operation.
    pub fail_with: Option<StorageError>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed the state record slot with raw bytes.
    pub fn with_record(bytes: &[u8]) -> Self {
        let mut storage = Self::new();
        storage
            .data
            .insert(Self::composite(STATE_NAMESPACE, STATE_KEY), bytes.to_vec());
        storage
    }

    pub fn record(&self) -> Option<&[u8]> {
        self.data
            .get(&Self::composite(STATE_NAMESPACE, STATE_KEY))
            .map(Vec::as_slice)
    }

    fn composite(namespace: &str, key: &str) -> String {
        format!("{namespace}::{key}")
    }
}

impl StoragePort for MockStorage {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        if let Some(e) = self.fail_with {
            return Err(e);
        }
        match self.data.get(&Self::composite(namespace, key)) {
            Some(data) => {
                let len = data.len().min(buf.len());
                buf[..len].copy_from_slice(&data[..len]);
                Ok(len)
            }
            None => Err(StorageError::NotFound),
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        if let Some(e) = self.fail_with {
            return Err(e);
        }
        self.writes += 1;
        self.data
            .insert(Self::composite(namespace, key), data.to_vec());
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        if let Some(e) = self.fail_with {
            return Err(e);
        }
        self.data.remove(&Self::composite(namespace, key));
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.data.contains_key(&Self::composite(namespace, key))
    }
}

// ── Notifier ──────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub sent: Vec<Notification>,
}

impl RecordingNotifier {
    pub fn characteristics(&self) -> Vec<u64> {
        self.sent.iter().map(|n| n.characteristic.0).collect()
    }
}

impl NotifyPort for RecordingNotifier {
    fn notify(
        &mut self,
        accessory: AccessoryId,
        service: ServiceId,
        characteristic: CharacteristicId,
    ) {
        self.sent.push(Notification {
            accessory,
            service,
            characteristic,
        });
    }
}

// ── Builders ──────────────────────────────────────────────────

/// A started door machine on the given storage.
pub fn door_with(storage: MockStorage) -> DoorMachine {
    let mut machine = DoorMachine::new(
        AID,
        StateStore::new(storage),
        MockActuator::default(),
        MockTimer::default(),
        RecordingNotifier::default(),
    )
    .unwrap();
    machine.start().unwrap();
    machine
}

/// A started door machine with nothing stored.
pub fn door() -> DoorMachine {
    door_with(MockStorage::new())
}

pub fn light() -> LightMachine {
    let mut machine = LightMachine::new(
        AID,
        StateStore::new(MockStorage::new()),
        MockActuator::default(),
        MockTimer::default(),
        RecordingNotifier::default(),
    )
    .unwrap();
    machine.start().unwrap();
    machine
}
