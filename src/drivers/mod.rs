//! Peripheral drivers: actuator output, revert timer, wake hand-off, and
//! task spawning.

pub mod gpio_output;
pub mod oneshot_timer;
pub mod task_pin;
pub mod wake;
