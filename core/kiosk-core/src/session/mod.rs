//! Visit session: state types and the state machine that drives them.

mod machine;
mod types;

pub use machine::SessionMachine;
pub use types::{
    findings_message, ExitPrompt, ExitReason, OvershareId, Outcome, ProfileSection,
    SessionSnapshot, SessionState, Stage, EXIT_CODE_REJECTED, PASSWORD_REJECTED,
};
