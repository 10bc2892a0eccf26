//! Presentation projection.
//!
//! A pure function from a session snapshot to a screen description. Renderers
//! draw [`Screen`]; they never read the machine directly.

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::clock::{format_lock_date, format_lock_time};
use crate::config::KioskConfig;
use crate::session::{OvershareId, ProfileSection, SessionSnapshot, SessionState, Stage};

pub const INSTRUCTIONS_TITLE: &str = "Analyze the Compromised Profile";
pub const INSTRUCTIONS_TEXT: &str = "You are reviewing a LinkedIn profile that may have been used by hackers. Your goal is to identify overshared personal information. Click on any field that you think should have been kept private.";
pub const ASSESSMENT_TITLE: &str = "Security Assessment";
pub const ASSESSMENT_TEXT: &str =
    "Did you have a good look at Kyle's LinkedIn Profile and what he has shared?";
pub const REVEAL_TITLE: &str = "Access Granted";
pub const EXIT_TITLE: &str = "Exit Kiosk Mode";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    Lock {
        time: String,
        date: String,
        error: Option<String>,
    },
    Profile {
        fields: Vec<ProfileField>,
        submit_error: Option<String>,
        modal: Option<Modal>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileField {
    pub id: OvershareId,
    pub section: ProfileSection,
    pub flagged: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "modal", rename_all = "snake_case")]
pub enum Modal {
    Instructions,
    Assessment,
    CodeReveal { pin: String, seconds_remaining: u32 },
    ExitPrompt { error: Option<String> },
}

impl Modal {
    pub fn title(&self) -> &'static str {
        match self {
            Modal::Instructions => INSTRUCTIONS_TITLE,
            Modal::Assessment => ASSESSMENT_TITLE,
            Modal::CodeReveal { .. } => REVEAL_TITLE,
            Modal::ExitPrompt { .. } => EXIT_TITLE,
        }
    }
}

pub fn project(snapshot: &SessionSnapshot, config: &KioskConfig, now: DateTime<Local>) -> Screen {
    let stage = match &snapshot.state {
        SessionState::Locked { password_error } => {
            return Screen::Lock {
                time: format_lock_time(&now),
                date: format_lock_date(&now),
                error: password_error.clone(),
            }
        }
        SessionState::Authenticated { stage } => stage,
    };

    let (found, submit_error) = match stage {
        Stage::Investigating {
            found,
            submit_error,
        } => (Some(found), submit_error.clone()),
        _ => (None, None),
    };

    let fields = OvershareId::all()
        .map(|id| ProfileField {
            id,
            section: id.section(),
            flagged: found.map(|set| set.contains(&id)).unwrap_or(false),
        })
        .collect();

    let stage_modal = match stage {
        Stage::ShowingInstructions => Some(Modal::Instructions),
        Stage::Investigating { .. } => None,
        Stage::AssessmentPrompt => Some(Modal::Assessment),
        Stage::CodeRevealed { seconds_remaining } => Some(Modal::CodeReveal {
            pin: config.pin.clone(),
            seconds_remaining: *seconds_remaining,
        }),
    };
    let modal = match &snapshot.exit_prompt {
        Some(prompt) => Some(Modal::ExitPrompt {
            error: prompt.code_error.clone(),
        }),
        None => stage_modal,
    };

    Screen::Profile {
        fields,
        submit_error,
        modal,
    }
}
