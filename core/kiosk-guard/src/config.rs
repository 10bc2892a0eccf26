//! Guard settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_INTERVAL_MS: u64 = 1000;
pub const MIN_INTERVAL_MS: u64 = 500;
pub const MAX_INTERVAL_MS: u64 = 2000;
/// Wake lock held for an hour, renewed every cycle.
pub const DEFAULT_WAKE_LOCK_SECS: u64 = 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GuardConfig {
    pub interval_ms: u64,
    pub wake_lock_secs: u64,
    pub restart_window_secs: i64,
    pub restart_free_starts: usize,
    pub restart_step_ms: u64,
    pub restart_max_ms: u64,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            wake_lock_secs: DEFAULT_WAKE_LOCK_SECS,
            restart_window_secs: 60,
            restart_free_starts: 5,
            restart_step_ms: 1000,
            restart_max_ms: 10_000,
        }
    }
}

impl GuardConfig {
    /// Cycle cadence, clamped to the supported range.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.clamp(MIN_INTERVAL_MS, MAX_INTERVAL_MS))
    }

    pub fn wake_lock_timeout(&self) -> Duration {
        Duration::from_secs(self.wake_lock_secs)
    }
}
