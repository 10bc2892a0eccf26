//! Foreground enforcement loop.
//!
//! Each cycle re-asserts the kiosk against the host: foreground task,
//! hidden system bars, wake lock, back suppression. Actions are independent;
//! a failing action is logged and retried next cycle. The first failure of an
//! action and its recovery are logged at `warn`/`info`, repeats at `debug`.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::config::GuardConfig;
use crate::control::ForegroundControl;
use crate::error::ControlError;
use crate::supervisor::StopSignal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnforcementAction {
    EnsureForeground,
    HideSystemBars,
    RenewWakeLock,
    SuppressBack,
}

impl EnforcementAction {
    pub const ALL: [EnforcementAction; 4] = [
        EnforcementAction::EnsureForeground,
        EnforcementAction::HideSystemBars,
        EnforcementAction::RenewWakeLock,
        EnforcementAction::SuppressBack,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EnforcementAction::EnsureForeground => "ensure_foreground",
            EnforcementAction::HideSystemBars => "hide_system_bars",
            EnforcementAction::RenewWakeLock => "renew_wake_lock",
            EnforcementAction::SuppressBack => "suppress_back",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionStatus {
    Ok,
    /// Foreground check found another task on top and asked to come back.
    Corrected,
    Failed { error: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub actions: Vec<(EnforcementAction, ActionStatus)>,
    /// The host tore down the loop's context; the worker should end so the
    /// supervisor can restart it.
    pub teardown: bool,
}

impl CycleReport {
    pub fn failures(&self) -> usize {
        self.actions
            .iter()
            .filter(|(_, status)| matches!(status, ActionStatus::Failed { .. }))
            .count()
    }

    pub fn status(&self, action: EnforcementAction) -> Option<&ActionStatus> {
        self.actions
            .iter()
            .find(|(candidate, _)| *candidate == action)
            .map(|(_, status)| status)
    }
}

/// Why a worker stopped running cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// A stop was requested; do not restart.
    Stopped,
    /// The host tore the loop down; restart it.
    Teardown,
}

pub struct EnforcementLoop<C: ForegroundControl> {
    control: Arc<C>,
    config: GuardConfig,
    consecutive_failures: HashMap<EnforcementAction, u32>,
    cycles: u64,
}

impl<C: ForegroundControl> EnforcementLoop<C> {
    pub fn new(control: Arc<C>, config: GuardConfig) -> Self {
        Self {
            control,
            config,
            consecutive_failures: HashMap::new(),
            cycles: 0,
        }
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Runs every action once. Never fails.
    pub fn run_cycle(&mut self) -> CycleReport {
        self.cycles += 1;
        let mut report = CycleReport::default();

        for action in EnforcementAction::ALL {
            let result = self.perform(action);
            let status = match result {
                Ok(corrected) => {
                    self.note_success(action);
                    if corrected {
                        ActionStatus::Corrected
                    } else {
                        ActionStatus::Ok
                    }
                }
                Err(err) => {
                    if matches!(err, ControlError::HostTeardown(_)) {
                        report.teardown = true;
                    }
                    self.note_failure(action, &err);
                    ActionStatus::Failed {
                        error: err.to_string(),
                    }
                }
            };
            report.actions.push((action, status));
        }

        report
    }

    /// Runs cycles at the configured cadence until `stop` is raised or the
    /// host tears the context down.
    pub fn run_until_stopped(&mut self, stop: &StopSignal) -> WorkerExit {
        let interval = self.config.interval();
        loop {
            if stop.is_raised() {
                return WorkerExit::Stopped;
            }
            let report = self.run_cycle();
            if report.teardown {
                tracing::warn!(cycle = self.cycles, "Enforcement context torn down by host");
                return WorkerExit::Teardown;
            }
            if stop.wait_timeout(interval) {
                return WorkerExit::Stopped;
            }
        }
    }

    fn perform(&self, action: EnforcementAction) -> Result<bool, ControlError> {
        match action {
            EnforcementAction::EnsureForeground => {
                if self.control.is_foreground()? {
                    return Ok(false);
                }
                tracing::info!("Kiosk not in foreground, bringing it back");
                self.control.bring_to_front()?;
                Ok(true)
            }
            EnforcementAction::HideSystemBars => self.control.hide_system_bars().map(|_| false),
            EnforcementAction::RenewWakeLock => self
                .control
                .renew_wake_lock(self.config.wake_lock_timeout())
                .map(|_| false),
            EnforcementAction::SuppressBack => {
                self.control.suppress_back_navigation().map(|_| false)
            }
        }
    }

    fn note_success(&mut self, action: EnforcementAction) {
        if let Some(failures) = self.consecutive_failures.remove(&action) {
            tracing::info!(action = action.as_str(), failures, "Enforcement action recovered");
        }
    }

    fn note_failure(&mut self, action: EnforcementAction, err: &ControlError) {
        let failures = self.consecutive_failures.entry(action).or_insert(0);
        *failures += 1;
        if *failures == 1 {
            tracing::warn!(action = action.as_str(), error = %err, "Enforcement action failed");
        } else {
            tracing::debug!(
                action = action.as_str(),
                error = %err,
                failures = *failures,
                "Enforcement action still failing"
            );
        }
    }
}
