//! Port traits: the hexagonal boundary between the actuation core and
//! the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ActuationStateMachine (domain)
//! ```
//!
//! Driven adapters (GPIO, hardware timer, NVS, run loop) implement these
//! traits.  The [`ActuationStateMachine`](super::machine::ActuationStateMachine)
//! consumes them via generics, so the domain core never touches hardware
//! directly and every collaborator can be replaced by a recording mock.

use super::notify::{AccessoryId, CharacteristicId, Notification, ServiceId};

// ───────────────────────────────────────────────────────────────
// Actuator port (domain → GPIO)
// ───────────────────────────────────────────────────────────────

/// Binary physical output.  Setting the same level twice is harmless.
pub trait ActuatorPort {
    fn set_level(&mut self, on: bool);

    /// Last commanded level.
    fn level(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Timer port (domain → one-shot countdown)
// ───────────────────────────────────────────────────────────────

/// Single-slot one-shot countdown.
///
/// The expiry hook is bound when the timer is constructed and runs in
/// interrupt context; it must only post a wake signal.
pub trait TimerPort {
    /// Start counting from zero towards `duration_ms`.  A pending arm is
    /// silently discarded.
    fn arm(&mut self, duration_ms: u64);

    /// Halt counting without firing.  Pausing an idle timer is a no-op.
    fn pause(&mut self);

    /// Whether the current arm has reached its alarm.
    ///
    /// Lets the worker tell a genuine expiry from a wake that belongs to
    /// an arm which has since been replaced or paused.
    fn has_expired(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Notification port (domain → run loop)
// ───────────────────────────────────────────────────────────────

/// Announces a characteristic change.  Implementations must not raise the
/// event inline; they defer it to the run-loop context.
pub trait NotifyPort {
    fn notify(
        &mut self,
        accessory: AccessoryId,
        service: ServiceId,
        characteristic: CharacteristicId,
    );
}

/// The accessory server's event API.  Only ever called from the run loop.
pub trait EventRaiser {
    fn raise_event(&mut self, event: &Notification);
}

// ───────────────────────────────────────────────────────────────
// Storage port (domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage.
///
/// Write operations MUST be atomic: no partial writes on power loss.
/// The ESP-IDF NVS API guarantees this per `nvs_commit()`.
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`, which
    /// is capped at `buf.len()`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for StorageError {}
