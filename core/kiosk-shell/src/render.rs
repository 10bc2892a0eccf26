//! Plain-text rendering of a projected screen.

use std::fmt;

use kiosk_core::view::{ASSESSMENT_TEXT, INSTRUCTIONS_TEXT};
use kiosk_core::{Modal, Screen};

const RULE: &str = "----------------------------------------";

pub fn render(screen: &Screen) -> String {
    ScreenText(screen).to_string()
}

struct ScreenText<'a>(&'a Screen);

impl fmt::Display for ScreenText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Screen::Lock { time, date, error } => {
                writeln!(f, "{RULE}")?;
                writeln!(f, "{time}")?;
                writeln!(f, "{date}")?;
                writeln!(f, "{RULE}")?;
                if let Some(error) = error {
                    writeln!(f, "! {error}")?;
                }
                writeln!(f, "Enter password:  password <p>")
            }
            Screen::Profile {
                fields,
                submit_error,
                modal,
            } => {
                writeln!(f, "{RULE}")?;
                writeln!(f, "Kyle's profile")?;
                writeln!(f, "{RULE}")?;
                for field in fields {
                    let mark = if field.flagged { "x" } else { " " };
                    writeln!(f, "[{mark}] {} {}", field.id, field.section.label())?;
                }
                if let Some(error) = submit_error {
                    writeln!(f, "! {error}")?;
                }
                writeln!(f, "toggle <n> | submit")?;
                match modal {
                    Some(modal) => write_modal(f, modal),
                    None => Ok(()),
                }
            }
        }
    }
}

fn write_modal(f: &mut fmt::Formatter<'_>, modal: &Modal) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "== {} ==", modal.title())?;
    match modal {
        Modal::Instructions => {
            writeln!(f, "{INSTRUCTIONS_TEXT}")?;
            writeln!(f, "ack to start")
        }
        Modal::Assessment => {
            writeln!(f, "{ASSESSMENT_TEXT}")?;
            writeln!(f, "ack to continue")
        }
        Modal::CodeReveal {
            pin,
            seconds_remaining,
        } => {
            writeln!(f, "PIN: {pin}")?;
            writeln!(f, "Closes in {seconds_remaining}s")
        }
        Modal::ExitPrompt { error } => {
            if let Some(error) = error {
                writeln!(f, "! {error}")?;
            }
            writeln!(f, "code <c> | cancel")
        }
    }
}
