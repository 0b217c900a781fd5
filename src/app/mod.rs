//! Application core: the timed actuation state machine and its ports.
//!
//! This module holds the actuator's business rules: what a target write
//! does, when the revert timer runs, and the order in which the output,
//! the store and the notifications are touched.  All interaction with
//! hardware happens through **port traits** defined in [`ports`], keeping
//! this layer fully testable without real peripherals.

pub mod handlers;
pub mod machine;
pub mod notify;
pub mod ports;
pub mod profile;
pub mod store;
