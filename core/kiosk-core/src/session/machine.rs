//! Session state machine.
//!
//! Owns the canonical [`SessionState`], the exit-prompt overlay and the two
//! session timers. All operations are synchronous; the caller serializes
//! events (see [`crate::runtime`]).
//!
//! ## Transitions
//!
//! ```text
//! Locked --password--> ShowingInstructions --ack--> Investigating
//! Investigating --submit (all found)--> AssessmentPrompt --ack--> CodeRevealed
//! CodeRevealed --last tick--> Investigating   (soft reset, auto-lock re-armed)
//! any authenticated --auto-lock--> Locked
//! ```

use crate::config::{KioskConfig, TOTAL_OVERSHARES};
use crate::timers::{TimerKind, TimerSubsystem};

use super::types::{
    findings_message, ExitPrompt, ExitReason, OvershareId, Outcome, SessionSnapshot,
    SessionState, Stage, EXIT_CODE_REJECTED, PASSWORD_REJECTED,
};

#[derive(Debug, Clone)]
pub struct SessionMachine {
    config: KioskConfig,
    state: SessionState,
    exit_prompt: Option<ExitPrompt>,
    timers: TimerSubsystem,
}

impl SessionMachine {
    pub fn new(config: KioskConfig) -> Self {
        let timers = TimerSubsystem::new(config.auto_lock_ms);
        Self {
            config,
            state: SessionState::locked(),
            exit_prompt: None,
            timers,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn exit_prompt(&self) -> Option<&ExitPrompt> {
        self.exit_prompt.as_ref()
    }

    pub fn timers(&self) -> &TimerSubsystem {
        &self.timers
    }

    pub fn config(&self) -> &KioskConfig {
        &self.config
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state.clone(),
            exit_prompt: self.exit_prompt.clone(),
        }
    }

    /// Parses a raw field number into an overshare id.
    pub fn overshare_id(&self, id: u32) -> crate::Result<OvershareId> {
        OvershareId::new(id)
    }

    // ── Participant input ────────────────────────────────────────────

    pub fn submit_password(&mut self, attempt: &str, now_ms: u64) -> Outcome {
        let SessionState::Locked { password_error } = &mut self.state else {
            return self.ignore("submit_password");
        };

        if attempt != self.config.password {
            *password_error = Some(PASSWORD_REJECTED.to_string());
            tracing::info!("Unlock password rejected");
            return Outcome::Rejected;
        }

        self.timers.start(TimerKind::AutoLock, now_ms);
        self.transition(SessionState::Authenticated {
            stage: Stage::ShowingInstructions,
        });
        Outcome::Applied
    }

    /// Dismisses the instructions or the assessment prompt.
    pub fn acknowledge(&mut self, now_ms: u64) -> Outcome {
        if self.exit_prompt.is_some() {
            return self.ignore("acknowledge");
        }
        let next = match self.state.stage() {
            Some(Stage::ShowingInstructions) => Stage::investigating(),
            Some(Stage::AssessmentPrompt) => Stage::CodeRevealed {
                seconds_remaining: self.config.reveal_seconds,
            },
            _ => return self.ignore("acknowledge"),
        };

        if matches!(next, Stage::CodeRevealed { .. }) {
            self.timers.start(TimerKind::RevealCountdown, now_ms);
        }
        self.transition(SessionState::Authenticated { stage: next });
        Outcome::Applied
    }

    pub fn toggle_overshare(&mut self, id: OvershareId) -> Outcome {
        if self.exit_prompt.is_some() {
            return self.ignore("toggle_overshare");
        }
        let SessionState::Authenticated {
            stage: Stage::Investigating { found, .. },
        } = &mut self.state
        else {
            return self.ignore("toggle_overshare");
        };

        let flagged = if found.remove(&id) {
            false
        } else {
            found.insert(id);
            true
        };
        tracing::debug!(overshare = %id, flagged, found = found.len(), "Overshare toggled");
        Outcome::Applied
    }

    pub fn submit_findings(&mut self) -> Outcome {
        if self.exit_prompt.is_some() {
            return self.ignore("submit_findings");
        }
        let total = TOTAL_OVERSHARES;
        let SessionState::Authenticated {
            stage: Stage::Investigating {
                found,
                submit_error,
            },
        } = &mut self.state
        else {
            return self.ignore("submit_findings");
        };

        if found.len() != usize::from(total) {
            tracing::info!(found = found.len(), total, "Findings incomplete");
            *submit_error = Some(findings_message(found.len(), total));
            return Outcome::Rejected;
        }

        self.transition(SessionState::Authenticated {
            stage: Stage::AssessmentPrompt,
        });
        Outcome::Applied
    }

    // ── Timer events ─────────────────────────────────────────────────

    /// One second of the reveal countdown.
    pub fn tick(&mut self, now_ms: u64) -> Outcome {
        let SessionState::Authenticated {
            stage: Stage::CodeRevealed { seconds_remaining },
        } = &mut self.state
        else {
            return self.ignore("tick");
        };

        if *seconds_remaining > 1 {
            *seconds_remaining -= 1;
            return Outcome::Applied;
        }

        // Soft reset: back to the profile, still unlocked.
        self.timers.cancel(TimerKind::RevealCountdown);
        self.timers.start(TimerKind::AutoLock, now_ms);
        self.transition(SessionState::Authenticated {
            stage: Stage::investigating(),
        });
        Outcome::Applied
    }

    pub fn auto_lock_timeout(&mut self) -> Outcome {
        if self.state.is_locked() {
            return self.ignore("auto_lock_timeout");
        }
        self.timers.cancel_all();
        self.exit_prompt = None;
        self.transition(SessionState::locked());
        Outcome::Applied
    }

    /// Delivers every due, non-stale timer firing. Returns how many applied.
    ///
    /// Timers re-armed while handling a firing are collected again, so a
    /// long stall plays out in order within one call.
    pub fn poll_timers(&mut self, now_ms: u64) -> usize {
        let mut applied = 0;
        loop {
            let firings = self.timers.due(now_ms);
            if firings.is_empty() {
                return applied;
            }
            for firing in firings {
                if !self.timers.accept(&firing) {
                    continue;
                }
                let outcome = match firing.kind {
                    TimerKind::AutoLock => self.auto_lock_timeout(),
                    TimerKind::RevealCountdown => self.tick(firing.due_at_ms),
                };
                if outcome == Outcome::Applied {
                    applied += 1;
                }
            }
        }
    }

    // ── Exit paths ───────────────────────────────────────────────────

    pub fn request_exit(&mut self) -> Outcome {
        if self.state.is_locked() {
            return self.ignore("request_exit");
        }
        self.exit_prompt = Some(ExitPrompt::default());
        tracing::info!(state = self.state.name(), "Exit prompt opened");
        Outcome::Applied
    }

    pub fn cancel_exit(&mut self) -> Outcome {
        if self.exit_prompt.take().is_none() {
            return self.ignore("cancel_exit");
        }
        tracing::info!(state = self.state.name(), "Exit prompt cancelled");
        Outcome::Applied
    }

    pub fn submit_exit_code(&mut self, code: &str) -> Outcome {
        let Some(prompt) = self.exit_prompt.as_mut() else {
            return self.ignore("submit_exit_code");
        };
        if code != self.config.exit_code {
            prompt.code_error = Some(EXIT_CODE_REJECTED.to_string());
            tracing::info!("Exit code rejected");
            return Outcome::Rejected;
        }
        tracing::info!("Exit code accepted");
        Outcome::Terminate(ExitReason::ExitCode)
    }

    /// The hidden gesture works from every state and never changes it.
    pub fn hidden_gesture_matured(&mut self) -> Outcome {
        tracing::info!(state = self.state.name(), "Hidden exit gesture accepted");
        Outcome::Terminate(ExitReason::HiddenGesture)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn transition(&mut self, next: SessionState) {
        tracing::info!(from = self.state.name(), to = next.name(), "Session transition");
        self.state = next;
    }

    fn ignore(&self, event: &'static str) -> Outcome {
        tracing::debug!(
            event,
            state = self.state.name(),
            exit_prompt = self.exit_prompt.is_some(),
            "Event ignored in current state"
        );
        Outcome::Ignored
    }
}
