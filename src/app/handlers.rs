//! Characteristic read/write handlers.
//!
//! The accessory server calls these on the run loop.  Reads never mutate;
//! the target write decodes and validates the wire value before it
//! reaches [`Actuation::apply_target_request`].

use std::sync::Mutex;

use log::info;

use super::machine::{Actuation, Outcome, SharedMachine, lock};
use super::profile::Profile;
use crate::error::{Error, Result, halt};

/// Lifecycle states reported by the accessory server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Idle,
    Running,
    Stopping,
}

/// Read/write callbacks bound to one shared machine.
pub struct CharacteristicHandlers<M> {
    machine: SharedMachine<M>,
}

impl<M: Actuation> CharacteristicHandlers<M> {
    pub fn new(machine: SharedMachine<M>) -> Self {
        Self { machine }
    }

    fn machine(&self) -> &Mutex<M> {
        &self.machine
    }

    pub fn current_state_read(&self) -> u8 {
        let state = lock(self.machine()).current_state();
        info!("current state read: {:?}", state);
        state.into()
    }

    pub fn target_state_read(&self) -> u8 {
        let state = lock(self.machine()).target_state();
        info!("target state read: {:?}", state);
        state.into()
    }

    pub fn obstruction_read(&self) -> bool {
        let detected = lock(self.machine()).obstruction_detected();
        info!("obstruction detected read: {}", detected);
        detected
    }

    /// Decode and apply a target write.
    ///
    /// Out-of-range values are rejected with [`Error::InvalidValue`].  A
    /// storage failure halts the process.
    pub fn target_state_write(&self, value: u8) -> Result<Outcome> {
        let target: <M::Profile as Profile>::Target = value.try_into()?;
        info!("target state write: {:?}", target);
        match lock(self.machine()).apply_target_request(target) {
            Ok(outcome) => Ok(outcome),
            Err(e @ Error::Storage(_)) => halt(&e),
            Err(e) => Err(e),
        }
    }

    pub fn identify(&self) {
        info!("identify requested");
    }
}

/// Log an accessory-server lifecycle change.
pub fn server_state_changed(state: ServerState) {
    match state {
        ServerState::Idle => info!("Accessory Server State did update: Idle."),
        ServerState::Running => info!("Accessory Server State did update: Running."),
        ServerState::Stopping => info!("Accessory Server State did update: Stopping."),
    }
}
