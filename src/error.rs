//! Unified error type for the accessory firmware.
//!
//! Every fallible operation in the core funnels into [`Error`].  All
//! variants are `Copy` so they can cross the worker / run-loop boundary
//! without allocation.
//!
//! Storage failures other than "not found" are fatal: the caller hands
//! them to [`halt`] rather than keep driving a physical actuator with
//! possibly-torn state.

use core::fmt;

use crate::app::ports::StorageError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The key-value store failed with something other than "not found".
    Storage(StorageError),
    /// A characteristic write carried a value outside the valid enumeration.
    InvalidValue(u8),
    /// Peripheral or task initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::InvalidValue(v) => write!(f, "invalid characteristic value {v}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// Fatal path
// ---------------------------------------------------------------------------

/// Log `err` and stop the process.
///
/// On ESP-IDF the abort triggers the panic handler and a chip reset; the
/// next boot reloads the last durably written state.
pub fn halt(err: &Error) -> ! {
    log::error!("fatal: {err}, halting");
    std::process::abort()
}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
