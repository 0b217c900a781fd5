//! Timed actuation state machine: the hexagonal core.
//!
//! [`ActuationStateMachine`] owns the actuator's state record and the
//! single outstanding revert timer.  It is the only writer of the record:
//! external target writes arrive through
//! [`apply_target_request`](Actuation::apply_target_request) on the run
//! loop, and the automatic revert arrives through
//! [`service_expiry`](Actuation::service_expiry) on the revert worker.
//!
//! ```text
//!  write ──▶ ┌───────────────────────────┐ ──▶ ActuatorPort   (1)
//!            │   ActuationStateMachine   │ ──▶ StateStore     (2)
//!  expiry ─▶ │   state · timer slot      │ ──▶ NotifyPort     (3)
//!            └───────────────────────────┘ ──▶ TimerPort      (4)
//! ```
//!
//! Side effects of a transition are strictly ordered as numbered above, so
//! an observer reacting to a notification always re-reads durable data.
//!
//! Both contexts reach the machine through a [`SharedMachine`], so a revert
//! and a write can never interleave.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info};

use super::notify::AccessoryId;
use super::ports::{ActuatorPort, NotifyPort, StoragePort, TimerPort};
use super::profile::Profile;
use super::store::{ActuatorState, StateStore};
use crate::config::AUTO_REVERT_MS;
use crate::error::Result;

/// Whether a request changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Changed,
    Unchanged,
}

/// Operations the protocol handlers and the revert worker need.
pub trait Actuation {
    type Profile: Profile;

    fn current_state(&self) -> <Self::Profile as Profile>::Current;

    fn target_state(&self) -> <Self::Profile as Profile>::Target;

    /// Door only; always `false` for the light.
    fn obstruction_detected(&self) -> bool;

    /// Apply an external target write.  Writing the current target is a
    /// no-op: no output change, no store write, no notification and no
    /// timer change.
    fn apply_target_request(&mut self, target: <Self::Profile as Profile>::Target)
    -> Result<Outcome>;

    /// Return to the Rest target.  No-op if already at Rest.  Never touches
    /// the timer.
    fn apply_auto_revert(&mut self) -> Result<Outcome>;

    /// Worker entry point after a timer wake: pause the timer, then revert.
    fn service_expiry(&mut self) -> Result<Outcome>;
}

/// Machine shared between the run loop and the revert worker.
pub type SharedMachine<M> = Arc<Mutex<M>>;

/// Lock a shared machine.  A poisoned lock still yields the state; the
/// record itself is only ever replaced whole.
pub fn lock<M>(machine: &Mutex<M>) -> MutexGuard<'_, M> {
    machine.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct ActuationStateMachine<P, S, D, T, N>
where
    P: Profile,
    S: StoragePort,
{
    accessory: AccessoryId,
    state: ActuatorState<P>,
    store: StateStore<S>,
    driver: D,
    timer: T,
    notifier: N,
    /// The loaded record was normalized and differs from what is stored.
    resync: bool,
}

impl<P, S, D, T, N> ActuationStateMachine<P, S, D, T, N>
where
    P: Profile,
    S: StoragePort,
    D: ActuatorPort,
    T: TimerPort,
    N: NotifyPort,
{
    /// Load the persisted state and take ownership of the collaborators.
    ///
    /// The current state is normalized to the settled value of the loaded
    /// target.  Fails only on a fatal storage error.
    pub fn new(
        accessory: AccessoryId,
        store: StateStore<S>,
        driver: D,
        timer: T,
        notifier: N,
    ) -> Result<Self> {
        let loaded = store.load::<P>()?;
        let state = ActuatorState {
            current: P::settle(loaded.target),
            ..loaded
        };
        if state != loaded {
            info!(
                "{}: stored current {:?} normalized to {:?}",
                P::NAME,
                loaded.current,
                state.current
            );
        }
        Ok(Self {
            accessory,
            state,
            store,
            driver,
            timer,
            notifier,
            resync: state != loaded,
        })
    }

    /// Bring the hardware and the store in line with the loaded record.
    ///
    /// An Active target left over from before the reset is reverted
    /// immediately: output, record and notifications all report Rest.
    /// Otherwise the output is driven to Rest and a normalized record is
    /// written back.
    pub fn start(&mut self) -> Result<()> {
        if P::is_active(self.state.target) {
            info!(
                "{}: resumed with active target {:?}, reverting to {:?}",
                P::NAME,
                self.state.target,
                P::REST
            );
            self.transition(P::REST)?;
        } else {
            self.driver.set_level(P::level(P::REST));
            if self.resync {
                self.store.save(&self.state)?;
            }
        }
        self.resync = false;
        Ok(())
    }

    pub fn state(&self) -> &ActuatorState<P> {
        &self.state
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn store(&self) -> &StateStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut StateStore<S> {
        &mut self.store
    }

    /// Set target and settled current, drive, persist, notify.  One
    /// notification per distinct characteristic.
    fn transition(&mut self, target: P::Target) -> Result<()> {
        self.state.target = target;
        self.state.current = P::settle(target);

        self.driver.set_level(P::level(target));
        self.store.save(&self.state)?;

        self.notifier
            .notify(self.accessory, P::SERVICE, P::TARGET_CHARACTERISTIC);
        // The light's single On characteristic is both current and target.
        if P::CURRENT_CHARACTERISTIC != P::TARGET_CHARACTERISTIC {
            self.notifier
                .notify(self.accessory, P::SERVICE, P::CURRENT_CHARACTERISTIC);
        }
        Ok(())
    }
}

impl<P, S, D, T, N> Actuation for ActuationStateMachine<P, S, D, T, N>
where
    P: Profile,
    S: StoragePort,
    D: ActuatorPort,
    T: TimerPort,
    N: NotifyPort,
{
    type Profile = P;

    fn current_state(&self) -> P::Current {
        self.state.current
    }

    fn target_state(&self) -> P::Target {
        self.state.target
    }

    fn obstruction_detected(&self) -> bool {
        self.state.obstruction_detected
    }

    fn apply_target_request(&mut self, target: P::Target) -> Result<Outcome> {
        if target == self.state.target {
            debug!("{}: target already {:?}", P::NAME, target);
            return Ok(Outcome::Unchanged);
        }

        info!("{}: target {:?} -> {:?}", P::NAME, self.state.target, target);
        self.transition(target)?;

        if P::is_active(target) {
            self.timer.arm(AUTO_REVERT_MS);
        } else {
            self.timer.pause();
        }
        Ok(Outcome::Changed)
    }

    fn apply_auto_revert(&mut self) -> Result<Outcome> {
        if !P::is_active(self.state.target) {
            debug!("{}: revert skipped, already at rest", P::NAME);
            return Ok(Outcome::Unchanged);
        }

        info!("{}: auto-revert to {:?}", P::NAME, P::REST);
        self.transition(P::REST)?;
        Ok(Outcome::Changed)
    }

    fn service_expiry(&mut self) -> Result<Outcome> {
        if !self.timer.has_expired() {
            debug!("{}: stale timer wake ignored", P::NAME);
            return Ok(Outcome::Unchanged);
        }
        self.timer.pause();
        self.apply_auto_revert()
    }
}
