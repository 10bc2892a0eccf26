//! Session state types.
//!
//! One tagged variant is active at a time. The exit prompt is an overlay kept
//! beside the variant, so closing it restores whatever was underneath.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::config::TOTAL_OVERSHARES;
use crate::error::{KioskError, Result};

pub const PASSWORD_REJECTED: &str = "Incorrect password. Please try again.";
pub const EXIT_CODE_REJECTED: &str = "Incorrect code. Please try again.";

/// One of the inspectable profile fields, numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct OvershareId(u8);

impl OvershareId {
    /// Accepts `1..=TOTAL_OVERSHARES` only.
    pub fn new(id: u32) -> Result<Self> {
        if id == 0 || id > u32::from(TOTAL_OVERSHARES) {
            return Err(KioskError::UnknownOvershare {
                id,
                max: TOTAL_OVERSHARES,
            });
        }
        Ok(Self(id as u8))
    }

    /// Every id on the profile, in page order.
    pub fn all() -> impl Iterator<Item = OvershareId> {
        (1..=TOTAL_OVERSHARES).map(OvershareId)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Where the field sits on the profile page.
    pub fn section(self) -> ProfileSection {
        match self.0 {
            1 => ProfileSection::About,
            2..=4 => ProfileSection::Post(self.0 - 1),
            5 => ProfileSection::ContactInfo,
            _ => ProfileSection::Experience,
        }
    }
}

impl fmt::Display for OvershareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileSection {
    About,
    /// 1-based position in the post feed.
    Post(u8),
    ContactInfo,
    Experience,
}

impl ProfileSection {
    pub fn label(self) -> String {
        match self {
            ProfileSection::About => "About".to_string(),
            ProfileSection::Post(n) => format!("Post {n}"),
            ProfileSection::ContactInfo => "Contact info".to_string(),
            ProfileSection::Experience => "Experience".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Locked {
        password_error: Option<String>,
    },
    Authenticated {
        stage: Stage,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    ShowingInstructions,
    Investigating {
        found: BTreeSet<OvershareId>,
        submit_error: Option<String>,
    },
    AssessmentPrompt,
    CodeRevealed {
        seconds_remaining: u32,
    },
}

impl SessionState {
    pub fn locked() -> Self {
        SessionState::Locked {
            password_error: None,
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, SessionState::Locked { .. })
    }

    pub fn stage(&self) -> Option<&Stage> {
        match self {
            SessionState::Locked { .. } => None,
            SessionState::Authenticated { stage } => Some(stage),
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Locked { .. } => "locked",
            SessionState::Authenticated { stage } => stage.name(),
        }
    }
}

impl Stage {
    pub fn investigating() -> Self {
        Stage::Investigating {
            found: BTreeSet::new(),
            submit_error: None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Stage::ShowingInstructions => "showing_instructions",
            Stage::Investigating { .. } => "investigating",
            Stage::AssessmentPrompt => "assessment_prompt",
            Stage::CodeRevealed { .. } => "code_revealed",
        }
    }
}

/// Staff exit prompt, drawn over an authenticated stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExitPrompt {
    pub code_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    HiddenGesture,
    ExitCode,
}

/// Result of feeding one event to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The state changed.
    Applied,
    /// The input was rejected and an error message is now attached.
    Rejected,
    /// The event does not apply in the current state.
    Ignored,
    /// The process should terminate.
    Terminate(ExitReason),
}

/// Read-only view of the session handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub exit_prompt: Option<ExitPrompt>,
}

pub fn findings_message(found: usize, total: u8) -> String {
    format!("You have found {found} of {total} overshares. Keep looking!")
}
