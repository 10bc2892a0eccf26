//! Errors reported by a foreground-control capability.
//!
//! None of these is fatal. The enforcement loop logs them and retries on the
//! next cycle.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControlError {
    #[error("Not supported on this host: {0}")]
    Unsupported(String),

    #[error("Permission denied: {0}")]
    Denied(String),

    /// The host tore down the context the loop runs in; the supervisor
    /// restarts the worker.
    #[error("Host tore down the enforcement context: {0}")]
    HostTeardown(String),

    #[error("{action} failed: {details}")]
    Failed {
        action: &'static str,
        details: String,
    },
}

/// Convenience type alias for Results using ControlError.
pub type Result<T> = std::result::Result<T, ControlError>;
