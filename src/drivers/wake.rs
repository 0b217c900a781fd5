//! Interrupt-to-worker wake signal.
//!
//! The timer's interrupt callback does exactly one thing: post a wake to
//! the parked revert worker.  [`RevertWake::post`] is safe to call from
//! interrupt context and never blocks; [`WakeReceiver::wait`] parks the
//! worker until a wake arrives.  Wakes posted while nobody is waiting
//! coalesce into one.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: a FreeRTOS task notification
//! (`vTaskNotifyGiveFromISR` / `ulTaskNotifyTake` via
//! `esp_idf_hal::task::notification`).  The notification belongs to the
//! task that creates it, so [`wake_pair`] must run on the worker task.
//!
//! On host/test: an `embassy_sync` signal awaited with
//! `futures_lite::future::block_on`.

#[cfg(target_os = "espidf")]
mod imp {
    use core::num::NonZeroU32;
    use std::sync::Arc;

    use esp_idf_hal::delay::BLOCK;
    use esp_idf_hal::task::notification::{Notification, Notifier};

    #[derive(Clone)]
    pub struct RevertWake {
        notifier: Arc<Notifier>,
    }

    impl RevertWake {
        pub fn post(&self) {
            // SAFETY: the notifier targets the worker task, which lives for
            // the rest of the program once spawned.
            unsafe {
                self.notifier.notify_and_yield(NonZeroU32::MIN);
            }
        }
    }

    pub struct WakeReceiver {
        notification: Notification,
    }

    impl WakeReceiver {
        pub fn wait(&self) {
            while self.notification.wait(BLOCK).is_none() {}
        }
    }

    /// Create a wake pair bound to the calling task.
    pub fn wake_pair() -> (RevertWake, WakeReceiver) {
        let notification = Notification::new();
        let wake = RevertWake {
            notifier: notification.notifier(),
        };
        (wake, WakeReceiver { notification })
    }
}

#[cfg(not(target_os = "espidf"))]
mod imp {
    use std::sync::Arc;

    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use embassy_sync::signal::Signal;

    type WakeSignal = Signal<CriticalSectionRawMutex, ()>;

    #[derive(Clone)]
    pub struct RevertWake {
        signal: Arc<WakeSignal>,
    }

    impl RevertWake {
        pub fn post(&self) {
            self.signal.signal(());
        }
    }

    pub struct WakeReceiver {
        signal: Arc<WakeSignal>,
    }

    impl WakeReceiver {
        pub fn wait(&self) {
            futures_lite::future::block_on(self.signal.wait());
        }

        /// Consume a pending wake without parking.
        pub fn try_take(&self) -> bool {
            self.signal.try_take().is_some()
        }
    }

    pub fn wake_pair() -> (RevertWake, WakeReceiver) {
        let signal = Arc::new(Signal::new());
        (
            RevertWake {
                signal: signal.clone(),
            },
            WakeReceiver { signal },
        )
    }
}

pub use imp::{RevertWake, WakeReceiver, wake_pair};
