//! Error types for kiosk-core operations.
//!
//! Rejected participant input (wrong password, wrong exit code, incomplete
//! findings) is never an error here. Those are messages attached to the
//! session state. `KioskError` covers input that cannot be expressed at all.

/// Errors raised while turning raw input into session values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KioskError {
    #[error("Unknown overshare id {id} (expected 1..={max})")]
    UnknownOvershare { id: u32, max: u8 },
}

/// Convenience type alias for Results using KioskError.
pub type Result<T> = std::result::Result<T, KioskError>;
