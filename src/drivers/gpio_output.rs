//! Binary actuator output on a single GPIO.
//!
//! Generic over [`embedded_hal::digital::OutputPin`], so the same driver
//! wraps an `esp_idf_hal` `PinDriver` on target and a recording pin in
//! tests.  High means the Active position (door open / light on).
//!
//! A failed pin write is logged and otherwise ignored: the state record
//! stays authoritative and the next transition drives the pin again.

use embedded_hal::digital::{Error as _, OutputPin};
use log::{debug, warn};

use crate::app::ports::ActuatorPort;

pub struct GpioActuator<P> {
    pin: P,
    level: bool,
}

impl<P: OutputPin> GpioActuator<P> {
    /// Wrap `pin`.  The output is not touched until the first
    /// [`set_level`](ActuatorPort::set_level).
    pub fn new(pin: P) -> Self {
        Self { pin, level: false }
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> ActuatorPort for GpioActuator<P> {
    fn set_level(&mut self, on: bool) {
        let res = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        match res {
            Ok(()) => {
                self.level = on;
                debug!("actuator: output {}", if on { "high" } else { "low" });
            }
            Err(e) => warn!("actuator: pin write failed ({:?})", e.kind()),
        }
    }

    fn level(&self) -> bool {
        self.level
    }
}
