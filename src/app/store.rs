//! Persistent actuator state.
//!
//! The [`ActuatorState`] record is stored as a fixed-size postcard blob in
//! one reserved NVS slot.  Loading never fails startup because of bad
//! data: a missing record yields the Rest default, and a record of the
//! wrong size or with undecodable fields is logged once and replaced by
//! the default.  Any other storage failure is returned as
//! [`Error::Storage`] and treated as fatal by the caller.

use log::{error, info};
use serde::{Deserialize, Serialize};

use super::ports::{StorageError, StoragePort};
use super::profile::Profile;
use crate::error::{Error, Result};

/// NVS namespace reserved for the state record.  Purged on factory reset.
pub const STATE_NAMESPACE: &str = "garagedoor";
/// NVS key of the state record.  Purged on factory reset.
pub const STATE_KEY: &str = "state";

/// Encoded size of [`ActuatorState`]: current, target, obstruction flag.
pub const RECORD_LEN: usize = 3;

/// The actuator's persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ActuatorState<P: Profile> {
    pub current: P::Current,
    pub target: P::Target,
    /// Sensor flag (door only).  Read-only from the core's perspective.
    pub obstruction_detected: bool,
}

impl<P: Profile> ActuatorState<P> {
    /// The settled Rest position.
    pub fn rest() -> Self {
        Self {
            current: P::settle(P::REST),
            target: P::REST,
            obstruction_detected: false,
        }
    }

    pub fn encode(&self) -> Result<[u8; RECORD_LEN]> {
        let mut buf = [0u8; RECORD_LEN];
        let used = postcard::to_slice(self, &mut buf)
            .map_err(|_| Error::Storage(StorageError::IoError))?
            .len();
        if used != RECORD_LEN {
            return Err(Error::Storage(StorageError::IoError));
        }
        Ok(buf)
    }

    /// Decode a stored blob.  `None` if the size or any field is wrong.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != RECORD_LEN {
            return None;
        }
        postcard::from_bytes(bytes).ok()
    }
}

impl<P: Profile> Default for ActuatorState<P> {
    fn default() -> Self {
        Self::rest()
    }
}

/// Load/save glue between [`ActuatorState`] and a [`StoragePort`].
pub struct StateStore<S: StoragePort> {
    storage: S,
}

impl<S: StoragePort> StateStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Load the last durably written record, or the Rest default.
    pub fn load<P: Profile>(&self) -> Result<ActuatorState<P>> {
        // One spare byte so an oversized blob shows up as a length mismatch.
        let mut buf = [0u8; RECORD_LEN + 1];
        match self.storage.read(STATE_NAMESPACE, STATE_KEY, &mut buf) {
            Ok(len) => match ActuatorState::decode(&buf[..len]) {
                Some(state) => {
                    info!("store: loaded {} state {:?}", P::NAME, state);
                    Ok(state)
                }
                None => {
                    error!("store: unexpected state record ({len} bytes), resetting to default");
                    Ok(ActuatorState::rest())
                }
            },
            Err(StorageError::NotFound) => {
                info!("store: no stored state, using defaults");
                Ok(ActuatorState::rest())
            }
            Err(e) => Err(Error::Storage(e)),
        }
    }

    /// Synchronously persist the full record.
    pub fn save<P: Profile>(&mut self, state: &ActuatorState<P>) -> Result<()> {
        let bytes = state.encode()?;
        self.storage.write(STATE_NAMESPACE, STATE_KEY, &bytes)?;
        Ok(())
    }

    /// Erase the record (factory reset).
    pub fn purge(&mut self) -> Result<()> {
        self.storage.delete(STATE_NAMESPACE, STATE_KEY)?;
        info!("store: state record purged");
        Ok(())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }
}
