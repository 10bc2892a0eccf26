//! Supervisor behaviour against a scripted host.

use kiosk_guard::{ControlError, ForegroundControl, GuardConfig, HostSignal, KioskGuard, SignalResponse};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::sleep;
use std::time::{Duration, Instant};

/// What the host does on the next `hide_system_bars` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fault {
    None,
    Panic,
    Teardown,
}

#[derive(Debug)]
struct ScriptedHost {
    faults: Mutex<Vec<Fault>>,
    cycles: AtomicUsize,
    fronts: AtomicU32,
    lock_tasks: AtomicU32,
    back_suppressions: AtomicU32,
    wake_releases: AtomicU32,
}

impl ScriptedHost {
    fn new(faults: Vec<Fault>) -> Self {
        Self {
            faults: Mutex::new(faults),
            cycles: AtomicUsize::new(0),
            fronts: AtomicU32::new(0),
            lock_tasks: AtomicU32::new(0),
            back_suppressions: AtomicU32::new(0),
            wake_releases: AtomicU32::new(0),
        }
    }

    fn next_fault(&self) -> Fault {
        let mut faults = self.faults.lock().unwrap_or_else(|e| e.into_inner());
        if faults.is_empty() {
            Fault::None
        } else {
            faults.remove(0)
        }
    }
}

impl ForegroundControl for ScriptedHost {
    fn is_foreground(&self) -> kiosk_guard::Result<bool> {
        self.cycles.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    fn bring_to_front(&self) -> kiosk_guard::Result<()> {
        self.fronts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn hide_system_bars(&self) -> kiosk_guard::Result<()> {
        match self.next_fault() {
            Fault::None => Ok(()),
            Fault::Panic => panic!("host killed the enforcement thread"),
            Fault::Teardown => Err(ControlError::HostTeardown("service destroyed".to_string())),
        }
    }

    fn renew_wake_lock(&self, _timeout: Duration) -> kiosk_guard::Result<()> {
        Err(ControlError::Denied("WAKE_LOCK".to_string()))
    }

    fn release_wake_lock(&self) -> kiosk_guard::Result<()> {
        self.wake_releases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn suppress_back_navigation(&self) -> kiosk_guard::Result<()> {
        self.back_suppressions.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn enter_lock_task(&self) -> kiosk_guard::Result<()> {
        self.lock_tasks.fetch_add(1, Ordering::SeqCst);
        Err(ControlError::Unsupported("not device owner".to_string()))
    }
}

fn fast_config() -> GuardConfig {
    GuardConfig {
        interval_ms: 500,
        ..GuardConfig::default()
    }
}

fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return;
        }
        sleep(Duration::from_millis(10));
    }
    panic!("Timed out waiting for condition");
}

#[test]
fn start_pins_app_and_suppresses_back() {
    let host = Arc::new(ScriptedHost::new(vec![]));
    let guard = KioskGuard::start(Arc::clone(&host), fast_config());

    assert_eq!(host.lock_tasks.load(Ordering::SeqCst), 1);
    wait_until(Duration::from_secs(5), || host.cycles.load(Ordering::SeqCst) >= 1);
    assert!(host.back_suppressions.load(Ordering::SeqCst) >= 1);

    guard.shutdown();
    assert_eq!(host.wake_releases.load(Ordering::SeqCst), 1);
}

#[test]
fn panicked_worker_is_restarted() {
    let host = Arc::new(ScriptedHost::new(vec![Fault::Panic]));
    let guard = KioskGuard::start(Arc::clone(&host), fast_config());

    wait_until(Duration::from_secs(5), || guard.restarts() == 1);
    wait_until(Duration::from_secs(5), || host.cycles.load(Ordering::SeqCst) >= 2);
    guard.shutdown();
}

#[test]
fn host_teardown_is_restarted() {
    let host = Arc::new(ScriptedHost::new(vec![Fault::Teardown, Fault::Teardown]));
    let guard = KioskGuard::start(Arc::clone(&host), fast_config());

    wait_until(Duration::from_secs(5), || guard.restarts() == 2);
    wait_until(Duration::from_secs(5), || host.cycles.load(Ordering::SeqCst) >= 3);
    guard.shutdown();
}

#[test]
fn shutdown_stops_cycles() {
    let host = Arc::new(ScriptedHost::new(vec![]));
    let guard = KioskGuard::start(Arc::clone(&host), fast_config());
    wait_until(Duration::from_secs(5), || host.cycles.load(Ordering::SeqCst) >= 1);

    guard.shutdown();
    let after = host.cycles.load(Ordering::SeqCst);
    sleep(Duration::from_millis(700));
    assert_eq!(host.cycles.load(Ordering::SeqCst), after);
}

#[test]
fn host_signals_are_answered_while_running() {
    let host = Arc::new(ScriptedHost::new(vec![]));
    let guard = KioskGuard::start(Arc::clone(&host), fast_config());

    assert_eq!(
        guard.on_host_signal(HostSignal::BackPressed),
        SignalResponse::SuppressDefault
    );
    assert_eq!(
        guard.on_host_signal(HostSignal::UserLeaveHint),
        SignalResponse::Reasserted
    );
    assert_eq!(host.fronts.load(Ordering::SeqCst), 1);
    guard.shutdown();
}
