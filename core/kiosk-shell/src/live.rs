//! Live kiosk in the terminal.
//!
//! One loop owns the runtime. Stdin lines and a one-second ticker arrive over
//! a channel; timer deadlines bound each wait, so firings are delivered on
//! time even between ticks. The guard runs beside it on its own threads.
//!
//! Terminal echo is off for the whole session so a typed password or exit
//! code never appears in clear. Killing the process with a signal skips the
//! restore; `stty echo` brings echo back.

use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use kiosk_core::{
    project, Clock, ExitReason, KioskConfig, KioskRuntime, ProcessExit, SessionMachine,
    SystemClock,
};
use kiosk_guard::{GuardConfig, HeadlessControl, KioskGuard};

use crate::commands::{parse_line, Action};
use crate::error::ShellError;
use crate::render::render;
use crate::tty::{masked_echo, EchoGuard};

const TICK: Duration = Duration::from_secs(1);

enum Event {
    Line(String),
    StdinClosed,
    Tick,
}

/// Marks the process for exit; the loop notices after the current event.
#[derive(Clone, Default)]
struct ExitFlag(Arc<AtomicBool>);

impl ExitFlag {
    fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl ProcessExit for ExitFlag {
    fn request_exit(&self, reason: ExitReason) {
        tracing::info!(reason = ?reason, "Sanctioned exit");
        self.0.store(true, Ordering::SeqCst);
    }
}

pub fn run(config: KioskConfig, guard_config: GuardConfig) -> Result<(), ShellError> {
    let (tx, rx) = mpsc::channel();
    spawn_stdin_reader(tx.clone())?;
    spawn_ticker(tx)?;

    let _echo = EchoGuard::disable();
    let guard = KioskGuard::start(Arc::new(HeadlessControl::new()), guard_config);
    let exit = ExitFlag::default();
    let mut runtime = KioskRuntime::new(
        SessionMachine::new(config.clone()),
        SystemClock::new(),
        exit.clone(),
    );
    let mut last_line: Option<String> = None;
    let mut notice: Option<String> = None;
    draw(&runtime, &config, last_line.as_deref(), notice.as_deref())?;

    while !exit.is_set() {
        let wait = runtime
            .time_until_next_deadline()
            .map_or(TICK, |until| until.min(TICK));

        match rx.recv_timeout(wait) {
            Ok(Event::Line(line)) => {
                last_line = Some(masked_echo(&line));
                notice = apply_line(&mut runtime, &guard, &line);
            }
            Ok(Event::StdinClosed) => {
                tracing::info!("Stdin closed; kiosk keeps running until a sanctioned exit");
            }
            Ok(Event::Tick) | Err(RecvTimeoutError::Timeout) => {
                runtime.poll();
            }
            Err(RecvTimeoutError::Disconnected) => {
                thread::sleep(wait);
                runtime.poll();
            }
        }

        if !exit.is_set() {
            draw(&runtime, &config, last_line.as_deref(), notice.as_deref())?;
        }
    }

    guard.shutdown();
    Ok(())
}

/// Applies one stdin line. Returns a notice to show under the screen.
fn apply_line(
    runtime: &mut KioskRuntime<SystemClock, ExitFlag>,
    guard: &KioskGuard<HeadlessControl>,
    line: &str,
) -> Option<String> {
    let command = match parse_line(line) {
        Ok(Some(command)) => command,
        Ok(None) => return None,
        Err(err) => {
            tracing::info!(error = %err, "Ignoring unrecognized input");
            return Some(err.to_string());
        }
    };

    match command.into_action(runtime.machine()) {
        Ok(Action::Session(input)) => {
            let outcome = runtime.handle(input);
            tracing::debug!(outcome = ?outcome, "Input handled");
            None
        }
        Ok(Action::Host(signal)) => {
            let response = guard.on_host_signal(signal);
            tracing::debug!(signal = ?signal, response = ?response, "Host signal handled");
            None
        }
        Ok(Action::Wait(_)) => Some("wait is only available in replay".to_string()),
        Err(err) => {
            tracing::info!(error = %err, "Ignoring invalid input");
            Some(err.to_string())
        }
    }
}

fn draw<X: ProcessExit>(
    runtime: &KioskRuntime<SystemClock, X>,
    config: &KioskConfig,
    last_line: Option<&str>,
    notice: Option<&str>,
) -> io::Result<()> {
    let screen = project(&runtime.snapshot(), config, runtime.clock().wall_time());
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if out.is_terminal() {
        write!(out, "\x1b[2J\x1b[H")?;
    }
    write!(out, "{}", render(&screen))?;
    if let Some(line) = last_line {
        writeln!(out, "> {line}")?;
    }
    if let Some(notice) = notice {
        writeln!(out, "? {notice}")?;
    }
    out.flush()
}

fn spawn_stdin_reader(tx: Sender<Event>) -> io::Result<()> {
    thread::Builder::new()
        .name("kiosk-stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        tracing::warn!(error = %err, "Failed to read stdin");
                        break;
                    }
                };
                if tx.send(Event::Line(line)).is_err() {
                    return;
                }
            }
            let _ = tx.send(Event::StdinClosed);
        })?;
    Ok(())
}

fn spawn_ticker(tx: Sender<Event>) -> io::Result<()> {
    thread::Builder::new()
        .name("kiosk-ticker".to_string())
        .spawn(move || loop {
            thread::sleep(TICK);
            if tx.send(Event::Tick).is_err() {
                return;
            }
        })?;
    Ok(())
}
