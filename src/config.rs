//! Accessory configuration and identity.
//!
//! Board-level parameters live in [`AccessoryConfig`]; the protocol-facing
//! identity (name, model, serial) lives in [`AccessoryInfo`].  The
//! auto-revert window is a fixed constant and is deliberately not part of
//! either struct.

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::app::notify::AccessoryId;
use crate::pins;

/// How long an Active target is held before the automatic revert to Rest.
pub const AUTO_REVERT_MS: u64 = 5_000;

/// Hardware timer clock divider (APB clock / 16).
pub const TIMER_DIVIDER: u32 = 16;

/// Maximum length of an accessory information string.
pub const INFO_STRING_LEN: usize = 64;

/// Board configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessoryConfig {
    /// GPIO driving the opener remote (or the light relay).
    pub actuator_gpio: i32,
    /// Clock divider applied to the revert timer.
    pub timer_divider: u32,
    /// FreeRTOS priority of the revert worker task.
    pub worker_priority: u8,
    /// Stack size of the revert worker task (KiB).
    pub worker_stack_kb: usize,
}

impl Default for AccessoryConfig {
    fn default() -> Self {
        Self {
            actuator_gpio: pins::ACTUATOR_GPIO,
            timer_divider: TIMER_DIVIDER,
            worker_priority: 10,
            worker_stack_kb: 4,
        }
    }
}

/// Accessory category advertised to controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Category {
    GarageDoorOpener = 4,
    Lighting = 5,
}

/// Static identity of the accessory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessoryInfo {
    pub aid: u64,
    pub category: Category,
    pub name: String<INFO_STRING_LEN>,
    pub manufacturer: String<INFO_STRING_LEN>,
    pub model: String<INFO_STRING_LEN>,
    pub serial_number: String<INFO_STRING_LEN>,
    pub firmware_version: String<INFO_STRING_LEN>,
    pub hardware_version: String<INFO_STRING_LEN>,
}

impl AccessoryInfo {
    pub fn garage_door() -> Self {
        Self {
            aid: 1,
            category: Category::GarageDoorOpener,
            name: bounded("Garage Door"),
            manufacturer: bounded("DIY"),
            model: bounded("GarageDoor1,1"),
            serial_number: bounded("099DB48E9E28"),
            firmware_version: bounded("1"),
            hardware_version: bounded("1"),
        }
    }

    pub fn lightbulb() -> Self {
        Self {
            aid: 1,
            category: Category::Lighting,
            name: bounded("Light Bulb"),
            manufacturer: bounded("DIY"),
            model: bounded("LightBulb1,1"),
            serial_number: bounded("099DB48E9E29"),
            firmware_version: bounded("1"),
            hardware_version: bounded("1"),
        }
    }

    pub fn accessory_id(&self) -> AccessoryId {
        AccessoryId(self.aid)
    }
}

/// Copy `s` into a fixed-capacity string, truncating on a char boundary.
fn bounded(s: &str) -> String<INFO_STRING_LEN> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
