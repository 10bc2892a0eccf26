//! Kiosk configuration.
//!
//! Every value is compiled in. [`KioskConfig::default`] is the only way to
//! build one, so nothing read at runtime can change the secrets, the
//! overshare count or the timings.

use serde::Serialize;

/// Shared password that unlocks the device.
pub const UNLOCK_PASSWORD: &str = "W@m+(5+2n5wh1";
/// Staff code accepted by the exit prompt.
pub const EXIT_CODE: &str = "0000";
/// Code revealed to participants who find every overshare.
pub const REVEAL_PIN: &str = "9856";
/// Number of overshare items on the profile.
pub const TOTAL_OVERSHARES: u8 = 6;
/// Fixed auto-lock window, measured from authentication (not from activity).
pub const AUTO_LOCK_MS: u64 = 2 * 60 * 1000;
/// How long the revealed PIN stays on screen before the soft reset.
pub const REVEAL_SECONDS: u32 = 60;
/// Taps on the hidden zone needed to mature the exit gesture.
pub const EXIT_TAPS_REQUIRED: u32 = 6;
/// Window (from the first tap of a burst) in which the taps must land.
pub const EXIT_WINDOW_MS: u64 = 5000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KioskConfig {
    pub(crate) password: String,
    pub(crate) exit_code: String,
    pub(crate) pin: String,
    pub(crate) auto_lock_ms: u64,
    pub(crate) reveal_seconds: u32,
    pub(crate) exit_taps_required: u32,
    pub(crate) exit_window_ms: u64,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            password: UNLOCK_PASSWORD.to_string(),
            exit_code: EXIT_CODE.to_string(),
            pin: REVEAL_PIN.to_string(),
            auto_lock_ms: AUTO_LOCK_MS,
            reveal_seconds: REVEAL_SECONDS,
            exit_taps_required: EXIT_TAPS_REQUIRED,
            exit_window_ms: EXIT_WINDOW_MS,
        }
    }
}

impl KioskConfig {
    pub fn overshare_count(&self) -> u8 {
        TOTAL_OVERSHARES
    }

    pub fn auto_lock_ms(&self) -> u64 {
        self.auto_lock_ms
    }

    pub fn reveal_seconds(&self) -> u32 {
        self.reveal_seconds
    }

    /// Copy with the secrets replaced, for printing and logging.
    pub fn masked(&self) -> Self {
        Self {
            password: mask(&self.password),
            exit_code: mask(&self.exit_code),
            pin: mask(&self.pin),
            ..self.clone()
        }
    }
}

fn mask(secret: &str) -> String {
    "*".repeat(secret.chars().count().max(4))
}
