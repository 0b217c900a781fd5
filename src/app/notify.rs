//! Characteristic-change notifications.
//!
//! A [`Notification`] is a self-contained message carrying identifiers
//! only, so it can be copied across execution contexts.  The
//! [`DeferredNotifier`] implements [`NotifyPort`] by posting these
//! messages onto the [`RunLoop`](crate::runloop::RunLoop); the event API
//! is then invoked from the run-loop context when the queue is drained.

use std::sync::Arc;

use log::debug;

use super::ports::NotifyPort;
use crate::runloop::RunLoop;

/// Accessory instance id (`aid`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccessoryId(pub u64);

/// Service instance id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceId(pub u64);

/// Characteristic instance id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CharacteristicId(pub u64);

/// "This characteristic changed" message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    pub accessory: AccessoryId,
    pub service: ServiceId,
    pub characteristic: CharacteristicId,
}

/// Marshals change notifications onto the run loop.
///
/// Safe to call from the worker or from the run loop itself; in both
/// cases the event is raised later, in posting order.
#[derive(Clone)]
pub struct DeferredNotifier {
    run_loop: Arc<RunLoop>,
}

impl DeferredNotifier {
    pub fn new(run_loop: Arc<RunLoop>) -> Self {
        Self { run_loop }
    }
}

impl NotifyPort for DeferredNotifier {
    fn notify(
        &mut self,
        accessory: AccessoryId,
        service: ServiceId,
        characteristic: CharacteristicId,
    ) {
        let msg = Notification {
            accessory,
            service,
            characteristic,
        };
        if self.run_loop.schedule(msg) {
            debug!(
                "notify: scheduled aid={} sid={} cid={}",
                accessory.0, service.0, characteristic.0
            );
        }
    }
}
