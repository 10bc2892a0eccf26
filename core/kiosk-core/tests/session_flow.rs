use kiosk_core::config::{EXIT_CODE, UNLOCK_PASSWORD};
use kiosk_core::{
    ExitReason, Input, KioskConfig, KioskRuntime, ManualClock, Outcome, OvershareId,
    ProcessExit, SessionMachine, SessionState, Stage, TimerKind,
};
use std::cell::Cell;
use std::collections::BTreeSet;
use std::rc::Rc;

#[derive(Clone, Default)]
struct CountingExit(Rc<Cell<u32>>);

impl ProcessExit for CountingExit {
    fn request_exit(&self, _reason: ExitReason) {
        self.0.set(self.0.get() + 1);
    }
}

struct Harness {
    runtime: KioskRuntime<ManualClock, CountingExit>,
    clock: ManualClock,
    exits: CountingExit,
}

impl Harness {
    fn new() -> Self {
        let clock = ManualClock::at_default_base();
        let exits = CountingExit::default();
        let runtime = KioskRuntime::new(
            SessionMachine::new(KioskConfig::default()),
            clock.clone(),
            exits.clone(),
        );
        Self {
            runtime,
            clock,
            exits,
        }
    }

    fn send(&mut self, input: Input) -> Outcome {
        self.runtime.handle(input)
    }

    fn wait_ms(&mut self, ms: u64) {
        self.clock.advance(ms);
        self.runtime.poll();
    }

    fn state(&self) -> SessionState {
        self.runtime.snapshot().state
    }

    fn toggle(&mut self, n: u32) -> Outcome {
        let id = OvershareId::new(n).expect("valid id");
        self.send(Input::ToggleOvershare(id))
    }

    fn unlock_and_investigate(&mut self) {
        assert_eq!(
            self.send(Input::SubmitPassword(UNLOCK_PASSWORD.to_string())),
            Outcome::Applied
        );
        assert_eq!(self.send(Input::Acknowledge), Outcome::Applied);
    }
}

fn authenticated(stage: Stage) -> SessionState {
    SessionState::Authenticated { stage }
}

#[test]
fn full_visit_ends_in_soft_reset_with_fresh_auto_lock() {
    let mut h = Harness::new();
    assert_eq!(h.state(), SessionState::locked());

    h.send(Input::SubmitPassword(UNLOCK_PASSWORD.to_string()));
    assert_eq!(h.state(), authenticated(Stage::ShowingInstructions));

    h.send(Input::Acknowledge);
    assert_eq!(h.state(), authenticated(Stage::investigating()));

    for n in 1..=6 {
        h.toggle(n);
    }
    assert_eq!(h.send(Input::SubmitFindings), Outcome::Applied);
    assert_eq!(h.state(), authenticated(Stage::AssessmentPrompt));

    h.clock.advance(10_000);
    h.send(Input::Acknowledge);
    assert_eq!(
        h.state(),
        authenticated(Stage::CodeRevealed {
            seconds_remaining: 60
        })
    );

    for _ in 0..59 {
        h.wait_ms(1000);
    }
    assert_eq!(
        h.state(),
        authenticated(Stage::CodeRevealed {
            seconds_remaining: 1
        })
    );

    h.wait_ms(1000);
    assert_eq!(h.state(), authenticated(Stage::investigating()));

    let timers = h.runtime.machine().timers();
    assert!(!timers.is_armed(TimerKind::RevealCountdown));
    // Re-armed at the soft reset (t = 70 s), not at authentication.
    assert_eq!(timers.next_deadline_ms(), Some(70_000 + 120_000));
    assert_eq!(h.exits.0.get(), 0);
}

#[test]
fn auto_lock_fires_from_every_authenticated_stage() {
    // The reveal stage is covered by late_reveal_is_cut_short_by_auto_lock:
    // reached early, its own soft reset re-arms the auto-lock.
    let stages: [fn(&mut Harness); 3] = [
        |_| {},
        |h| {
            h.send(Input::Acknowledge);
            h.toggle(3);
        },
        |h| {
            h.send(Input::Acknowledge);
            for n in 1..=6 {
                h.toggle(n);
            }
            h.send(Input::SubmitFindings);
        },
    ];

    for reach in stages {
        let mut h = Harness::new();
        h.send(Input::SubmitPassword(UNLOCK_PASSWORD.to_string()));
        reach(&mut h);
        assert!(!h.state().is_locked());

        h.wait_ms(119_999);
        assert!(!h.state().is_locked());

        h.wait_ms(1);
        assert_eq!(h.state(), SessionState::locked());
        assert_eq!(h.runtime.machine().timers().next_deadline_ms(), None);
    }
}

#[test]
fn user_activity_does_not_extend_auto_lock() {
    let mut h = Harness::new();
    h.unlock_and_investigate();
    for step in 0..119 {
        h.wait_ms(1000);
        h.toggle(step % 6 + 1);
    }
    h.wait_ms(1000);
    assert_eq!(h.state(), SessionState::locked());
}

#[test]
fn relock_clears_findings_for_next_visit() {
    let mut h = Harness::new();
    h.unlock_and_investigate();
    h.toggle(1);
    h.toggle(2);
    h.wait_ms(120_000);

    h.unlock_and_investigate();
    assert_eq!(h.state(), authenticated(Stage::investigating()));
}

#[test]
fn late_reveal_is_cut_short_by_auto_lock() {
    let mut h = Harness::new();
    h.unlock_and_investigate();
    for n in 1..=6 {
        h.toggle(n);
    }
    h.send(Input::SubmitFindings);
    h.clock.advance(100_000);
    h.send(Input::Acknowledge);

    h.wait_ms(19_000);
    assert_eq!(
        h.state(),
        authenticated(Stage::CodeRevealed {
            seconds_remaining: 41
        })
    );
    h.wait_ms(1000);
    assert_eq!(h.state(), SessionState::locked());
    assert!(!h
        .runtime
        .machine()
        .timers()
        .is_armed(TimerKind::RevealCountdown));
}

#[test]
fn long_stall_delivers_ticks_then_drops_stale_ones() {
    let mut h = Harness::new();
    h.unlock_and_investigate();
    for n in 1..=6 {
        h.toggle(n);
    }
    h.send(Input::SubmitFindings);
    h.send(Input::Acknowledge);

    // 65 ticks come due at once; the 60th soft-resets and the rest are stale.
    h.clock.advance(65_000);
    h.runtime.poll();
    assert_eq!(h.state(), authenticated(Stage::investigating()));
}

#[test]
fn stall_past_rearmed_auto_lock_locks_in_one_poll() {
    let mut h = Harness::new();
    h.unlock_and_investigate();
    for n in 1..=6 {
        h.toggle(n);
    }
    h.send(Input::SubmitFindings);
    h.send(Input::Acknowledge);

    // Soft reset at 60 s re-arms the auto-lock for 180 s; both are past.
    h.clock.advance(200_000);
    h.runtime.poll();
    assert_eq!(h.state(), SessionState::locked());
}

#[test]
fn exit_prompt_flow_terminates_exactly_once() {
    let mut h = Harness::new();
    h.unlock_and_investigate();
    h.toggle(4);

    assert_eq!(h.send(Input::RequestExit), Outcome::Applied);
    let snapshot = h.runtime.snapshot();
    assert!(snapshot.exit_prompt.is_some());
    assert_eq!(
        snapshot.state,
        authenticated(Stage::Investigating {
            found: BTreeSet::from([OvershareId::new(4).unwrap()]),
            submit_error: None,
        })
    );

    assert_eq!(
        h.send(Input::SubmitExitCode("9999".to_string())),
        Outcome::Rejected
    );
    let prompt = h.runtime.snapshot().exit_prompt.expect("prompt stays open");
    assert!(prompt.code_error.is_some());
    assert_eq!(h.exits.0.get(), 0);

    assert_eq!(
        h.send(Input::SubmitExitCode(EXIT_CODE.to_string())),
        Outcome::Terminate(ExitReason::ExitCode)
    );
    assert_eq!(h.exits.0.get(), 1);
}

#[test]
fn hidden_gesture_works_while_locked_and_leaves_state_alone() {
    let mut h = Harness::new();
    for t in [0, 1000, 2000, 3000, 4000] {
        h.clock.set(t);
        assert_eq!(h.send(Input::HiddenTap), Outcome::Ignored);
    }
    h.clock.set(4999);
    assert_eq!(
        h.send(Input::HiddenTap),
        Outcome::Terminate(ExitReason::HiddenGesture)
    );
    assert_eq!(h.exits.0.get(), 1);
    assert_eq!(h.state(), SessionState::locked());
}

#[test]
fn slow_hidden_taps_never_exit() {
    let mut h = Harness::new();
    for t in [0, 1000, 2000, 3000, 4000, 6000] {
        h.clock.set(t);
        h.send(Input::HiddenTap);
    }
    assert_eq!(h.exits.0.get(), 0);
}

#[test]
fn reveal_soft_reset_keeps_open_exit_prompt() {
    let mut h = Harness::new();
    h.unlock_and_investigate();
    for n in 1..=6 {
        h.toggle(n);
    }
    h.send(Input::SubmitFindings);
    h.send(Input::Acknowledge);
    h.send(Input::RequestExit);

    h.wait_ms(60_000);
    let snapshot = h.runtime.snapshot();
    assert_eq!(snapshot.state, authenticated(Stage::investigating()));
    assert!(snapshot.exit_prompt.is_some());

    h.send(Input::CancelExit);
    assert!(h.runtime.snapshot().exit_prompt.is_none());
}

#[test]
fn only_the_compiled_exit_code_and_six_fields_exist() {
    let mut h = Harness::new();
    h.unlock_and_investigate();
    assert!(OvershareId::new(7).is_err());
    assert_eq!(h.runtime.machine().config().overshare_count(), 6);

    h.send(Input::RequestExit);
    assert_eq!(h.send(Input::SubmitExitCode("1".to_string())), Outcome::Rejected);
    assert_eq!(h.exits.0.get(), 0);
    assert_eq!(
        h.send(Input::SubmitExitCode(EXIT_CODE.to_string())),
        Outcome::Terminate(ExitReason::ExitCode)
    );
}
