//! Log-backed event raiser.
//!
//! Implements [`EventRaiser`] by writing each raised characteristic event
//! to the ESP-IDF logger (UART / USB-CDC in production).  An accessory
//! server binding would implement the same trait and forward to its own
//! event API.

use log::info;

use crate::app::notify::Notification;
use crate::app::ports::EventRaiser;

#[derive(Debug, Default)]
pub struct LogEventRaiser {
    raised: u32,
}

impl LogEventRaiser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events raised so far.
    pub fn raised(&self) -> u32 {
        self.raised
    }
}

impl EventRaiser for LogEventRaiser {
    fn raise_event(&mut self, event: &Notification) {
        self.raised = self.raised.wrapping_add(1);
        info!(
            "EVENT | aid={} sid={:#x} cid={:#x}",
            event.accessory.0, event.service.0, event.characteristic.0
        );
    }
}
