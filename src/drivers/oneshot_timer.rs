//! One-shot countdown used for the auto-revert window.
//!
//! Single slot: arming resets the counter to zero and replaces any
//! pending alarm, so only the latest arm can ever expire.  The expiry hook
//! is bound once at construction and runs in interrupt context; it only
//! posts a [`RevertWake`](super::wake::RevertWake).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: general-purpose timer group 0 / unit 0, counting up from
//! zero with a divided APB clock, alarm interrupt enabled, no auto-reload.
//! On host/test: a sleeping thread per arm, invalidated by a generation
//! counter when the timer is re-armed or paused.

use crate::app::ports::TimerPort;

/// Convert milliseconds to timer ticks at `tick_hz`.
pub fn ms_to_ticks(duration_ms: u64, tick_hz: u64) -> u64 {
    duration_ms.saturating_mul(tick_hz) / 1000
}

// ── ESP-IDF backend ───────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use esp::OneShotTimer;

#[cfg(target_os = "espidf")]
mod esp {
    use esp_idf_hal::peripheral::Peripheral;
    use esp_idf_hal::timer::config::Config;
    use esp_idf_hal::timer::{Timer, TimerDriver};
    use log::{info, warn};

    use super::ms_to_ticks;
    use crate::app::ports::TimerPort;
    use crate::config::AccessoryConfig;
    use crate::drivers::wake::RevertWake;
    use crate::error::{Error, Result};

    pub struct OneShotTimer {
        driver: TimerDriver<'static>,
        alarm_ticks: u64,
        armed: bool,
    }

    impl OneShotTimer {
        /// Configure the timer unit and bind the expiry hook.
        pub fn new(
            timer: impl Peripheral<P = impl Timer> + 'static,
            config: &AccessoryConfig,
            wake: RevertWake,
        ) -> Result<Self> {
            let cfg = Config::new()
                .divider(config.timer_divider)
                .auto_reload(false);
            let mut driver =
                TimerDriver::new(timer, &cfg).map_err(|_| Error::Init("revert timer config"))?;

            // SAFETY: the callback only posts a task notification, which
            // is ISR-safe and borrows nothing from the stack.
            unsafe {
                driver
                    .subscribe(move || wake.post())
                    .map_err(|_| Error::Init("revert timer callback"))?;
            }
            info!(
                "Timer initialized (divider={}, {} Hz)",
                config.timer_divider,
                driver.tick_hz()
            );

            Ok(Self {
                driver,
                alarm_ticks: 0,
                armed: false,
            })
        }

        fn try_arm(&mut self, duration_ms: u64) -> core::result::Result<(), esp_idf_hal::sys::EspError> {
            self.driver.enable(false)?;
            self.driver.set_counter(0)?;
            self.alarm_ticks = ms_to_ticks(duration_ms, self.driver.tick_hz());
            self.driver.set_alarm(self.alarm_ticks)?;
            self.driver.enable_alarm(true)?;
            self.driver.enable_interrupt()?;
            self.driver.enable(true)?;
            Ok(())
        }
    }

    impl TimerPort for OneShotTimer {
        fn arm(&mut self, duration_ms: u64) {
            match self.try_arm(duration_ms) {
                Ok(()) => {
                    self.armed = true;
                    info!("Timer started ({} ms, {} ticks)", duration_ms, self.alarm_ticks);
                }
                Err(e) => warn!("revert timer: arm failed ({})", e),
            }
        }

        fn pause(&mut self) {
            self.armed = false;
            if let Err(e) = self.driver.enable(false) {
                warn!("revert timer: pause failed ({})", e);
            }
        }

        fn has_expired(&self) -> bool {
            self.armed
                && self
                    .driver
                    .counter()
                    .is_ok_and(|count| count >= self.alarm_ticks)
        }
    }
}

// ── Simulation backend ────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
pub struct OneShotTimer {
    shared: std::sync::Arc<std::sync::Mutex<SimSlot>>,
    on_expiry: std::sync::Arc<dyn Fn() + Send + Sync>,
}

#[cfg(not(target_os = "espidf"))]
#[derive(Default)]
struct SimSlot {
    generation: u64,
    running: bool,
    deadline: Option<std::time::Instant>,
}

#[cfg(not(target_os = "espidf"))]
impl OneShotTimer {
    /// Bind the expiry hook.  It runs on a timer thread, standing in for
    /// interrupt context.
    pub fn new(on_expiry: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            shared: std::sync::Arc::default(),
            on_expiry: std::sync::Arc::new(on_expiry),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, SimSlot> {
        self.shared
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn is_running(&self) -> bool {
        self.slot().running
    }
}

#[cfg(not(target_os = "espidf"))]
impl TimerPort for OneShotTimer {
    fn arm(&mut self, duration_ms: u64) {
        let duration = std::time::Duration::from_millis(duration_ms);
        let generation = {
            let mut slot = self.slot();
            slot.generation += 1;
            slot.running = true;
            slot.deadline = Some(std::time::Instant::now() + duration);
            slot.generation
        };
        log::info!("timer(sim): armed for {} ms", duration_ms);

        let shared = self.shared.clone();
        let on_expiry = self.on_expiry.clone();
        std::thread::spawn(move || {
            std::thread::sleep(duration);
            let fire = {
                let slot = shared
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner);
                slot.running && slot.generation == generation
            };
            if fire {
                on_expiry();
            }
        });
    }

    fn pause(&mut self) {
        let mut slot = self.slot();
        slot.running = false;
        slot.generation += 1;
    }

    fn has_expired(&self) -> bool {
        let slot = self.slot();
        slot.running && slot.deadline.is_some_and(|d| std::time::Instant::now() >= d)
    }
}
