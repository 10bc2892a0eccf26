//! Deterministic rehearsal of a command script on a manual clock.

use std::cell::Cell;
use std::io::Write;
use std::path::Path;
use std::rc::Rc;

use kiosk_core::{
    project, Clock, ExitReason, KioskConfig, KioskRuntime, ManualClock, ProcessExit,
    SessionMachine,
};
use kiosk_guard::{respond_to_signal, GuardConfig, HeadlessControl};

use crate::commands::{parse_line, Action};
use crate::error::ShellError;
use crate::render::render;

/// Records the termination request instead of ending the process.
#[derive(Clone, Default)]
struct RecordedExit(Rc<Cell<Option<ExitReason>>>);

impl ProcessExit for RecordedExit {
    fn request_exit(&self, reason: ExitReason) {
        self.0.set(Some(reason));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaySummary {
    pub steps: usize,
    pub exit: Option<ExitReason>,
    pub final_screen: String,
}

pub fn run(script: &Path, config: KioskConfig, quiet: bool) -> Result<(), ShellError> {
    let text = fs_err::read_to_string(script)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    replay(&text, config, quiet, &mut out)?;
    Ok(())
}

/// Replays `script` line by line. Stops at the first termination.
pub fn replay<W: Write>(
    script: &str,
    config: KioskConfig,
    quiet: bool,
    out: &mut W,
) -> Result<ReplaySummary, ShellError> {
    let clock = ManualClock::at_default_base();
    let exit = RecordedExit::default();
    let mut runtime = KioskRuntime::new(
        SessionMachine::new(config.clone()),
        clock.clone(),
        exit.clone(),
    );
    let control = HeadlessControl::new();
    let guard_config = GuardConfig::default();
    let mut steps = 0;

    for (index, line) in script.lines().enumerate() {
        let line_no = index + 1;
        let command = parse_line(line).map_err(|source| ShellError::Script {
            line: line_no,
            source,
        })?;
        let Some(command) = command else {
            continue;
        };
        let action = command
            .into_action(runtime.machine())
            .map_err(|source| ShellError::Script {
                line: line_no,
                source,
            })?;

        steps += 1;
        let note = match action {
            Action::Session(input) => format!("{:?}", runtime.handle(input)),
            Action::Host(signal) => {
                format!("{:?}", respond_to_signal(&control, &guard_config, signal))
            }
            Action::Wait(duration) => {
                clock.advance(duration.as_millis() as u64);
                format!("{} firing(s)", runtime.poll())
            }
        };
        tracing::debug!(line = line_no, note = %note, "Replayed step");

        if !quiet {
            writeln!(out, ">> {} ({note})", line.trim())?;
            write!(out, "{}", screen_text(&runtime, &config))?;
        }
        if let Some(reason) = exit.0.get() {
            writeln!(out, "Kiosk exited: {reason:?}")?;
            break;
        }
    }

    let final_screen = screen_text(&runtime, &config);
    if quiet {
        write!(out, "{final_screen}")?;
    }
    Ok(ReplaySummary {
        steps,
        exit: exit.0.get(),
        final_screen,
    })
}

fn screen_text<X: ProcessExit>(
    runtime: &KioskRuntime<ManualClock, X>,
    config: &KioskConfig,
) -> String {
    render(&project(
        &runtime.snapshot(),
        config,
        runtime.clock().wall_time(),
    ))
}
