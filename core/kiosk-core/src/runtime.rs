//! Serialized event handling.
//!
//! [`KioskRuntime`] is the single writer for the session: participant input,
//! hidden-zone taps and timer firings all pass through it in arrival order.
//! It owns the clock and calls the process-termination capability.

use std::time::Duration;

use crate::clock::Clock;
use crate::gesture::GestureDetector;
use crate::session::{ExitReason, OvershareId, Outcome, SessionMachine, SessionSnapshot};

/// Process-termination capability provided by the host.
pub trait ProcessExit {
    fn request_exit(&self, reason: ExitReason);
}

/// Presentation-layer input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    SubmitPassword(String),
    /// Dismisses the instructions or the assessment prompt.
    Acknowledge,
    ToggleOvershare(OvershareId),
    SubmitFindings,
    RequestExit,
    CancelExit,
    SubmitExitCode(String),
    /// Tap on the invisible exit zone.
    HiddenTap,
}

pub struct KioskRuntime<C: Clock, X: ProcessExit> {
    machine: SessionMachine,
    gesture: GestureDetector,
    clock: C,
    exit: X,
    exit_requested: Option<ExitReason>,
}

impl<C: Clock, X: ProcessExit> KioskRuntime<C, X> {
    pub fn new(machine: SessionMachine, clock: C, exit: X) -> Self {
        let gesture = GestureDetector::from_config(machine.config());
        Self {
            machine,
            gesture,
            clock,
            exit,
            exit_requested: None,
        }
    }

    pub fn machine(&self) -> &SessionMachine {
        &self.machine
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.machine.snapshot()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn exit_requested(&self) -> Option<ExitReason> {
        self.exit_requested
    }

    /// Delivers due timer firings, then applies `input`.
    pub fn handle(&mut self, input: Input) -> Outcome {
        let now_ms = self.clock.now_ms();
        self.machine.poll_timers(now_ms);

        let outcome = match input {
            Input::SubmitPassword(attempt) => self.machine.submit_password(&attempt, now_ms),
            Input::Acknowledge => self.machine.acknowledge(now_ms),
            Input::ToggleOvershare(id) => self.machine.toggle_overshare(id),
            Input::SubmitFindings => self.machine.submit_findings(),
            Input::RequestExit => self.machine.request_exit(),
            Input::CancelExit => self.machine.cancel_exit(),
            Input::SubmitExitCode(code) => self.machine.submit_exit_code(&code),
            Input::HiddenTap => {
                if self.gesture.register_tap(now_ms) {
                    self.machine.hidden_gesture_matured()
                } else {
                    Outcome::Ignored
                }
            }
        };

        if let Outcome::Terminate(reason) = outcome {
            self.terminate(reason);
        }
        outcome
    }

    /// Delivers due timer firings only. Returns how many changed the state.
    pub fn poll(&mut self) -> usize {
        let now_ms = self.clock.now_ms();
        self.machine.poll_timers(now_ms)
    }

    /// How long the driver may block before the next timer firing is due.
    pub fn time_until_next_deadline(&self) -> Option<Duration> {
        let deadline = self.machine.timers().next_deadline_ms()?;
        let now_ms = self.clock.now_ms();
        Some(Duration::from_millis(deadline.saturating_sub(now_ms)))
    }

    fn terminate(&mut self, reason: ExitReason) {
        if let Some(first) = self.exit_requested {
            tracing::info!(reason = ?reason, first = ?first, "Termination already requested");
            return;
        }
        self.exit_requested = Some(reason);
        tracing::info!(reason = ?reason, "Requesting process termination");
        self.exit.request_exit(reason);
    }
}
