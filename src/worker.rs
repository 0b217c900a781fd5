//! Revert worker task.
//!
//! A dedicated task that parks on a [`WakeReceiver`] until the revert
//! timer's interrupt posts a wake, then runs
//! [`service_expiry`](Actuation::service_expiry) under the machine lock.
//! The state machine, the store and the notifier are never touched from
//! interrupt context.
//!
//! Startup is two-phase because the timer needs the wake before the
//! machine can be built, while the worker needs the machine to do
//! anything useful:
//!
//! ```text
//!  main                          worker task
//!  ────                          ───────────
//!  spawn_revert_worker ──spawn──▶ wake_pair()
//!          ◀────── RevertWake ───┘
//!  build timer + machine
//!  attach(machine) ─────────────▶ loop { wait; service_expiry }
//! ```
//!
//! Both hand-offs are single-slot `embassy_sync` channels; the blocking
//! side parks in `futures_lite::future::block_on`.

use std::sync::{Arc, Mutex};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use futures_lite::future::block_on;
use log::{debug, info};

use crate::app::machine::{Actuation, Outcome, SharedMachine, lock};
use crate::config::AccessoryConfig;
use crate::drivers::task_pin::{Core, spawn_on_core};
use crate::drivers::wake::{RevertWake, WakeReceiver, wake_pair};
use crate::error::{Error, Result, halt};

/// One value, handed over once.
type HandOff<T> = Channel<CriticalSectionRawMutex, T, 1>;

/// Handle to a spawned worker still waiting for its machine.
pub struct RevertWorker<M> {
    machine: Arc<HandOff<SharedMachine<M>>>,
}

impl<M> RevertWorker<M> {
    /// Hand the machine to the worker.  From here on every wake is
    /// serviced, including one posted before the call.
    pub fn attach(self, machine: SharedMachine<M>) -> Result<()> {
        self.machine
            .try_send(machine)
            .map_err(|_| Error::Init("revert worker already attached"))
    }
}

/// Spawn the worker on the application core and return the wake its
/// timer callback should post.
pub fn spawn_revert_worker<M>(config: &AccessoryConfig) -> Result<(RevertWake, RevertWorker<M>)>
where
    M: Actuation + Send + 'static,
{
    let wake_slot: Arc<HandOff<RevertWake>> = Arc::new(Channel::new());
    let machine_slot: Arc<HandOff<SharedMachine<M>>> = Arc::new(Channel::new());
    let (wake_tx, machine_rx) = (wake_slot.clone(), machine_slot.clone());

    spawn_on_core(
        Core::App,
        config.worker_priority,
        config.worker_stack_kb,
        "revert\0",
        move || {
            // The wake must be created on this task: it is the one parked.
            let (wake, receiver) = wake_pair();
            block_on(wake_tx.send(wake));
            let machine = block_on(machine_rx.receive());
            info!("revert worker: running");
            run(&receiver, &machine);
        },
    )?;

    let wake = block_on(wake_slot.receive());
    Ok((
        wake,
        RevertWorker {
            machine: machine_slot,
        },
    ))
}

fn run<M: Actuation>(receiver: &WakeReceiver, machine: &Mutex<M>) -> ! {
    loop {
        receiver.wait();
        if let Err(e) = service_wake(machine) {
            halt(&e);
        }
    }
}

/// Service one timer wake.
pub fn service_wake<M: Actuation>(machine: &Mutex<M>) -> Result<Outcome> {
    let outcome = lock(machine).service_expiry()?;
    debug!("revert worker: wake serviced ({:?})", outcome);
    Ok(outcome)
}
