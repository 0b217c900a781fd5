//! Cooperative run loop for characteristic-change events.
//!
//! The accessory server's event API may only be called from one execution
//! context.  Producers on any other context (the revert worker, or the
//! run loop itself while handling a write) post a [`Notification`] here;
//! the run loop drains the queue and raises each event exactly once, in
//! FIFO order.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────────┐
//! │ Write handler│────▶│              │     │                  │
//! │ (run loop)   │     │  Callback    │────▶│  EventRaiser     │
//! │ Revert worker│────▶│  queue       │     │  (run loop only) │
//! └──────────────┘     └──────────────┘     └──────────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::app::notify::Notification;
use crate::app::ports::EventRaiser;

/// Maximum number of pending notifications.
///
/// A transition posts at most two.  Between drains the loop can see the
/// startup revert, a write and the worker's revert, so this leaves room
/// for several controller writes landing before the loop runs again.
pub const RUN_LOOP_DEPTH: usize = 16;

const _: () = assert!(RUN_LOOP_DEPTH >= 3 * 2);

/// Single-consumer notification queue owned by the run loop.
pub struct RunLoop {
    queue: Channel<CriticalSectionRawMutex, Notification, RUN_LOOP_DEPTH>,
}

impl Default for RunLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl RunLoop {
    pub const fn new() -> Self {
        Self {
            queue: Channel::new(),
        }
    }

    /// Post a notification.  Never blocks: a full queue drops the message
    /// and returns `false`.  The state is already durable by then, so a
    /// dropped event only delays a controller's view until its next read.
    pub fn schedule(&self, msg: Notification) -> bool {
        if self.queue.try_send(msg).is_err() {
            warn!(
                "run loop: queue full, dropping notification for cid={}",
                msg.characteristic.0
            );
            return false;
        }
        true
    }

    /// Raise every pending event.  Returns how many were raised.
    ///
    /// Must be called from the run-loop context.
    pub fn run_pending(&self, raiser: &mut impl EventRaiser) -> usize {
        let mut raised = 0;
        while let Ok(msg) = self.queue.try_receive() {
            raiser.raise_event(&msg);
            raised += 1;
        }
        raised
    }

    /// Park the calling thread and raise events as they arrive.
    pub fn run_forever(&self, raiser: &mut impl EventRaiser) -> ! {
        loop {
            let msg = futures_lite::future::block_on(self.queue.receive());
            raiser.raise_event(&msg);
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
