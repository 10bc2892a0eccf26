//! Self-healing supervision of the enforcement loop.
//!
//! The loop runs on its own worker thread. A supervisor thread joins the
//! worker and starts a new one whenever it ends without a stop request,
//! whether it panicked or the host tore it down. Only [`KioskGuard::shutdown`]
//! (or dropping the guard) stops it for good.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::backoff::RestartBackoff;
use crate::config::GuardConfig;
use crate::control::ForegroundControl;
use crate::enforcement::{EnforcementLoop, WorkerExit};
use crate::signals::{respond_to_signal, HostSignal, SignalResponse};

/// One-way stop flag that interrupts waits.
#[derive(Debug, Default)]
pub struct StopSignal {
    raised: Mutex<bool>,
    wake: Condvar,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        let mut raised = self.raised.lock().unwrap_or_else(|e| e.into_inner());
        *raised = true;
        self.wake.notify_all();
    }

    pub fn is_raised(&self) -> bool {
        *self.raised.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Sleeps up to `timeout`. Returns `true` if the stop was raised.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let raised = self.raised.lock().unwrap_or_else(|e| e.into_inner());
        let (raised, _) = self
            .wake
            .wait_timeout_while(raised, timeout, |raised| !*raised)
            .unwrap_or_else(|e| e.into_inner());
        *raised
    }
}

pub struct KioskGuard<C: ForegroundControl + 'static> {
    control: Arc<C>,
    config: GuardConfig,
    stop: Arc<StopSignal>,
    restarts: Arc<AtomicU64>,
    supervisor: Option<JoinHandle<()>>,
}

impl<C: ForegroundControl + 'static> KioskGuard<C> {
    /// Pins the app (best-effort) and starts the supervised loop.
    pub fn start(control: Arc<C>, config: GuardConfig) -> Self {
        if let Err(err) = control.enter_lock_task() {
            tracing::warn!(error = %err, "Lock task mode not available");
        }
        if let Err(err) = control.suppress_back_navigation() {
            tracing::warn!(error = %err, "Failed to suppress back navigation");
        }

        let stop = Arc::new(StopSignal::new());
        let restarts = Arc::new(AtomicU64::new(0));
        let supervisor = spawn_supervisor(
            Arc::clone(&control),
            config.clone(),
            Arc::clone(&stop),
            Arc::clone(&restarts),
        );

        tracing::info!(
            interval_ms = config.interval().as_millis() as u64,
            "Kiosk guard started"
        );
        Self {
            control,
            config,
            stop,
            restarts,
            supervisor,
        }
    }

    /// Number of times the worker has been restarted.
    pub fn restarts(&self) -> u64 {
        self.restarts.load(Ordering::SeqCst)
    }

    pub fn on_host_signal(&self, signal: HostSignal) -> SignalResponse {
        respond_to_signal(self.control.as_ref(), &self.config, signal)
    }

    /// Stops the loop for good and lets the display sleep again. Only call
    /// this after a sanctioned exit.
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        let Some(supervisor) = self.supervisor.take() else {
            return;
        };
        self.stop.raise();
        if supervisor.join().is_err() {
            tracing::error!("Guard supervisor panicked during shutdown");
        }
        if let Err(err) = self.control.release_wake_lock() {
            tracing::warn!(error = %err, "Failed to release wake lock");
        }
        tracing::info!(restarts = self.restarts(), "Kiosk guard stopped");
    }
}

impl<C: ForegroundControl + 'static> Drop for KioskGuard<C> {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

fn spawn_supervisor<C: ForegroundControl + 'static>(
    control: Arc<C>,
    config: GuardConfig,
    stop: Arc<StopSignal>,
    restarts: Arc<AtomicU64>,
) -> Option<JoinHandle<()>> {
    let spawned = thread::Builder::new()
        .name("kiosk-guard-supervisor".to_string())
        .spawn(move || supervise(control, config, stop, restarts));
    match spawned {
        Ok(handle) => Some(handle),
        Err(err) => {
            tracing::error!(error = %err, "Failed to spawn guard supervisor; kiosk runs unguarded");
            None
        }
    }
}

fn supervise<C: ForegroundControl + 'static>(
    control: Arc<C>,
    config: GuardConfig,
    stop: Arc<StopSignal>,
    restarts: Arc<AtomicU64>,
) {
    let mut backoff = RestartBackoff::from_config(&config);

    loop {
        let exit = run_worker(Arc::clone(&control), config.clone(), Arc::clone(&stop));
        if exit == WorkerExit::Stopped || stop.is_raised() {
            return;
        }

        let count = restarts.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(delay) = backoff.record_restart(Utc::now()) {
            tracing::warn!(
                recent = backoff.recent_starts(),
                backoff_ms = delay.as_millis() as u64,
                "Enforcement restart backoff engaged"
            );
            if stop.wait_timeout(delay) {
                return;
            }
        }
        tracing::warn!(restarts = count, "Restarting enforcement worker");
    }
}

fn run_worker<C: ForegroundControl + 'static>(
    control: Arc<C>,
    config: GuardConfig,
    stop: Arc<StopSignal>,
) -> WorkerExit {
    let spawned = thread::Builder::new()
        .name("kiosk-enforcement".to_string())
        .spawn(move || EnforcementLoop::new(control, config).run_until_stopped(&stop));

    let worker = match spawned {
        Ok(worker) => worker,
        Err(err) => {
            tracing::warn!(error = %err, "Failed to spawn enforcement worker");
            return WorkerExit::Teardown;
        }
    };

    match worker.join() {
        Ok(exit) => exit,
        Err(_) => {
            tracing::warn!("Enforcement worker panicked");
            WorkerExit::Teardown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn wait_returns_early_when_raised() {
        let stop = Arc::new(StopSignal::new());
        let raiser = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            raiser.raise();
        });

        let started = Instant::now();
        assert!(stop.wait_timeout(Duration::from_secs(10)));
        assert!(started.elapsed() < Duration::from_secs(5));
        handle.join().unwrap();
    }

    #[test]
    fn wait_times_out_without_raise() {
        let stop = StopSignal::new();
        assert!(!stop.wait_timeout(Duration::from_millis(10)));
        assert!(!stop.is_raised());
    }
}
