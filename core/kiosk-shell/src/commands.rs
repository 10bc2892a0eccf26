//! Line commands shared by the live shell and rehearsal scripts.

use std::time::Duration;

use kiosk_core::{Input, KioskError, SessionMachine};
use kiosk_guard::HostSignal;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command '{0}'")]
    Unknown(String),

    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),

    #[error("Invalid argument for '{command}': {value}")]
    InvalidArgument { command: &'static str, value: String },

    #[error(transparent)]
    Overshare(#[from] KioskError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Password(String),
    Acknowledge,
    Toggle(u32),
    Submit,
    Exit,
    Cancel,
    Code(String),
    Tap,
    Back,
    Leave,
    /// Rehearsal only: advance the clock.
    Wait(Duration),
}

/// Where a command is routed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Session(Input),
    Host(HostSignal),
    Wait(Duration),
}

/// Parses one line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "password" => Command::Password(required("password", rest)?.to_string()),
        "ack" => Command::Acknowledge,
        "toggle" => {
            let value = required("toggle", rest)?;
            let id = value.parse().map_err(|_| CommandError::InvalidArgument {
                command: "toggle",
                value: value.to_string(),
            })?;
            Command::Toggle(id)
        }
        "submit" => Command::Submit,
        "exit" => Command::Exit,
        "cancel" => Command::Cancel,
        "code" => Command::Code(required("code", rest)?.to_string()),
        "tap" => Command::Tap,
        "back" => Command::Back,
        "leave" => Command::Leave,
        "wait" => Command::Wait(parse_wait(required("wait", rest)?)?),
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

impl Command {
    pub fn into_action(self, machine: &SessionMachine) -> Result<Action, CommandError> {
        let action = match self {
            Command::Password(attempt) => Action::Session(Input::SubmitPassword(attempt)),
            Command::Acknowledge => Action::Session(Input::Acknowledge),
            Command::Toggle(id) => {
                Action::Session(Input::ToggleOvershare(machine.overshare_id(id)?))
            }
            Command::Submit => Action::Session(Input::SubmitFindings),
            Command::Exit => Action::Session(Input::RequestExit),
            Command::Cancel => Action::Session(Input::CancelExit),
            Command::Code(code) => Action::Session(Input::SubmitExitCode(code)),
            Command::Tap => Action::Session(Input::HiddenTap),
            Command::Back => Action::Host(HostSignal::BackPressed),
            Command::Leave => Action::Host(HostSignal::UserLeaveHint),
            Command::Wait(duration) => Action::Wait(duration),
        };
        Ok(action)
    }
}

fn required<'a>(command: &'static str, rest: &'a str) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument(command))
    } else {
        Ok(rest)
    }
}

fn parse_wait(value: &str) -> Result<Duration, CommandError> {
    let invalid = || CommandError::InvalidArgument {
        command: "wait",
        value: value.to_string(),
    };
    if let Some(ms) = value.strip_suffix("ms") {
        return ms.parse().map(Duration::from_millis).map_err(|_| invalid());
    }
    if let Some(secs) = value.strip_suffix('s') {
        return secs.parse().map(Duration::from_secs).map_err(|_| invalid());
    }
    Err(invalid())
}
