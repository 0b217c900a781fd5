//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements   | Connects to           |
//! |--------------|--------------|-----------------------|
//! | `log_raiser` | EventRaiser  | Serial log output     |
//! | `nvs`        | StoragePort  | NVS / in-memory store |

pub mod log_raiser;
pub mod nvs;
