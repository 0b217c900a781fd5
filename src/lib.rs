//! Garage-door / light accessory firmware library.
//!
//! Exposes the pure-logic modules for integration testing. All
//! ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod pins;
pub mod runloop;
pub mod worker;

pub mod adapters;
pub mod drivers;

mod esp_link_shims;
