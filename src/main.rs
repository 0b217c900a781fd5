//! Garage-door opener firmware: main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  GpioActuator   OneShotTimer   NvsAdapter   DeferredNotifier │
//! │  (Actuator)     (Timer)        (Storage)    (Notify)         │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ─────────────────       │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │        ActuationStateMachine (pure logic)          │      │
//! │  └────────────────────────────────────────────────────┘      │
//! │                                                              │
//! │  revert worker (App core)  ·  run loop (main task)           │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex};

use anyhow::Result;
use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};
use esp_idf_hal::peripherals::Peripherals;
use log::info;

use garagedoor::adapters::log_raiser::LogEventRaiser;
use garagedoor::adapters::nvs::NvsAdapter;
use garagedoor::app::handlers::{CharacteristicHandlers, ServerState, server_state_changed};
use garagedoor::app::machine::ActuationStateMachine;
use garagedoor::app::notify::DeferredNotifier;
use garagedoor::app::profile::GarageDoor;
use garagedoor::app::store::StateStore;
use garagedoor::config::{AccessoryConfig, AccessoryInfo};
use garagedoor::drivers::gpio_output::GpioActuator;
use garagedoor::drivers::oneshot_timer::OneShotTimer;
use garagedoor::runloop::RunLoop;
use garagedoor::worker::spawn_revert_worker;

type DoorMachine = ActuationStateMachine<
    GarageDoor,
    NvsAdapter,
    GpioActuator<PinDriver<'static, AnyOutputPin, Output>>,
    OneShotTimer,
    DeferredNotifier,
>;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    let info = AccessoryInfo::garage_door();
    let config = AccessoryConfig::default();
    info!(
        "{} v{} ({} / {})",
        info.name,
        env!("CARGO_PKG_VERSION"),
        info.model,
        info.serial_number
    );

    let peripherals = Peripherals::take()?;

    // ── 2. Revert worker (needs to exist before the timer) ────
    let (wake, worker) = spawn_revert_worker::<DoorMachine>(&config)?;

    // ── 3. Peripherals ────────────────────────────────────────
    // SAFETY: the configured GPIO is driven only through this driver;
    // nothing else takes it out of `peripherals.pins`.
    let pin = unsafe { AnyOutputPin::new(config.actuator_gpio.try_into()?) };
    let pin = PinDriver::output(pin)?;
    info!("Actuator on GPIO{}", config.actuator_gpio);
    let actuator = GpioActuator::new(pin);
    let timer = OneShotTimer::new(peripherals.timer00, &config, wake)?;

    // ── 4. Store + run loop ───────────────────────────────────
    let store = StateStore::new(NvsAdapter::new()?);
    let run_loop = Arc::new(RunLoop::new());
    let notifier = DeferredNotifier::new(run_loop.clone());

    // ── 5. State machine ──────────────────────────────────────
    let mut machine =
        DoorMachine::new(info.accessory_id(), store, actuator, timer, notifier)?;
    machine.start()?;
    let machine = Arc::new(Mutex::new(machine));
    worker.attach(machine.clone())?;

    // Handed to the accessory server binding.
    let _handlers = CharacteristicHandlers::new(machine);
    server_state_changed(ServerState::Running);

    // ── 6. Run loop (never returns) ───────────────────────────
    let mut raiser = LogEventRaiser::new();
    run_loop.run_forever(&mut raiser)
}
