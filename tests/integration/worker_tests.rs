//! Integration tests for the revert worker: wake hand-off from the timer
//! context, servicing under the machine lock, and deferred notification
//! through the run loop.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use garagedoor::adapters::log_raiser::LogEventRaiser;
use garagedoor::app::machine::{Actuation, ActuationStateMachine, Outcome, lock};
use garagedoor::app::notify::DeferredNotifier;
use garagedoor::app::profile::{CurrentDoorState, GarageDoor, TargetDoorState};
use garagedoor::app::store::StateStore;
use garagedoor::config::{AUTO_REVERT_MS, AccessoryConfig};
use garagedoor::drivers::oneshot_timer::OneShotTimer;
use garagedoor::runloop::RunLoop;
use garagedoor::worker::{service_wake, spawn_revert_worker};

use crate::mock_hw::{AID, DoorMachine, MockActuator, MockStorage, MockTimer, door};

/// Poll `cond` until it holds or `timeout` elapses.
fn wait_for(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    cond()
}

#[test]
fn posted_wake_reverts_on_worker() {
    let (wake, worker) = spawn_revert_worker::<DoorMachine>(&AccessoryConfig::default()).unwrap();

    let machine = Arc::new(Mutex::new(door()));
    {
        let mut m = lock(&machine);
        m.apply_target_request(TargetDoorState::Open).unwrap();
        m.timer_mut().fire();
    }
    // Posted before attach: the first wake must not be lost.
    wake.post();
    worker.attach(machine.clone()).unwrap();

    assert!(wait_for(Duration::from_secs(2), || {
        lock(&machine).target_state() == TargetDoorState::Closed
    }));
    let m = lock(&machine);
    assert_eq!(m.current_state(), CurrentDoorState::Closed);
    assert_eq!(m.driver().levels, vec![false, true, false]);
    assert_eq!(m.timer().pauses, 1);
}

#[test]
fn workers_hand_off_independently() {
    let (wake_a, worker_a) = spawn_revert_worker::<DoorMachine>(&AccessoryConfig::default()).unwrap();
    let (_wake_b, worker_b) = spawn_revert_worker::<DoorMachine>(&AccessoryConfig::default()).unwrap();

    let a = Arc::new(Mutex::new(door()));
    let b = Arc::new(Mutex::new(door()));
    for m in [&a, &b] {
        let mut m = lock(m);
        m.apply_target_request(TargetDoorState::Open).unwrap();
        m.timer_mut().fire();
    }
    worker_b.attach(b.clone()).unwrap();
    worker_a.attach(a.clone()).unwrap();
    wake_a.post();

    assert!(wait_for(Duration::from_secs(2), || {
        lock(&a).target_state() == TargetDoorState::Closed
    }));
    // Only `a`'s worker was woken.
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(lock(&b).target_state(), TargetDoorState::Open);
}

#[test]
fn service_wake_ignores_unexpired_timer() {
    let machine = Mutex::new(door());
    lock(&machine)
        .apply_target_request(TargetDoorState::Open)
        .unwrap();
    assert_eq!(service_wake(&machine), Ok(Outcome::Unchanged));
    assert_eq!(lock(&machine).target_state(), TargetDoorState::Open);
}

type SimDoor =
    ActuationStateMachine<GarageDoor, MockStorage, MockActuator, OneShotTimer, DeferredNotifier>;

/// Full path with the simulated hardware timer: open, wait out the
/// window, and drain the notifications on the run loop.
#[test]
fn sim_timer_expiry_reverts_and_notifies_run_loop() {
    let (wake, worker) = spawn_revert_worker::<SimDoor>(&AccessoryConfig::default()).unwrap();
    let run_loop = Arc::new(RunLoop::new());

    let mut machine = SimDoor::new(
        AID,
        StateStore::new(MockStorage::new()),
        MockActuator::default(),
        OneShotTimer::new(move || wake.post()),
        DeferredNotifier::new(run_loop.clone()),
    )
    .unwrap();
    machine.start().unwrap();
    let machine = Arc::new(Mutex::new(machine));
    worker.attach(machine.clone()).unwrap();

    lock(&machine)
        .apply_target_request(TargetDoorState::Open)
        .unwrap();
    assert!(lock(&machine).timer().is_running());

    let mut raiser = LogEventRaiser::new();
    assert_eq!(run_loop.run_pending(&mut raiser), 2);

    let window = Duration::from_millis(AUTO_REVERT_MS + 2_000);
    assert!(wait_for(window, || {
        lock(&machine).target_state() == TargetDoorState::Closed
    }));
    assert!(!lock(&machine).timer().is_running());
    assert_eq!(lock(&machine).store().storage().writes, 2);

    assert_eq!(run_loop.run_pending(&mut raiser), 2);
    assert_eq!(raiser.raised(), 4);
}

type QueuedDoor =
    ActuationStateMachine<GarageDoor, MockStorage, MockActuator, MockTimer, DeferredNotifier>;

/// Startup revert, an open and the worker's revert all land before the
/// run loop gets to drain: none of the six events is dropped.
#[test]
fn run_loop_holds_every_transition_between_drains() {
    let run_loop = Arc::new(RunLoop::new());
    let mut machine = QueuedDoor::new(
        AID,
        StateStore::new(MockStorage::with_record(&[0, 0, 0])),
        MockActuator::default(),
        MockTimer::default(),
        DeferredNotifier::new(run_loop.clone()),
    )
    .unwrap();
    machine.start().unwrap();
    machine.apply_target_request(TargetDoorState::Open).unwrap();
    machine.timer_mut().fire();
    assert_eq!(machine.service_expiry(), Ok(Outcome::Changed));

    let mut raiser = LogEventRaiser::new();
    assert_eq!(run_loop.run_pending(&mut raiser), 6);
    assert_eq!(raiser.raised(), 6);
    assert!(run_loop.is_empty());
}
