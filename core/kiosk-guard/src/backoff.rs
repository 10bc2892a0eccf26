use chrono::{DateTime, Utc};
use std::cmp;
use std::time::Duration;

use crate::config::GuardConfig;

/// Rate limit for worker restarts.
///
/// Restarts inside the rolling window beyond the free allowance wait
/// `step × excess`, capped at `max`.
#[derive(Debug, Clone)]
pub struct RestartBackoff {
    starts: Vec<DateTime<Utc>>,
    window_secs: i64,
    free_starts: usize,
    step_ms: u64,
    max_ms: u64,
}

impl RestartBackoff {
    pub fn new(window_secs: i64, free_starts: usize, step_ms: u64, max_ms: u64) -> Self {
        Self {
            starts: Vec::new(),
            window_secs,
            free_starts,
            step_ms,
            max_ms,
        }
    }

    pub fn from_config(config: &GuardConfig) -> Self {
        Self::new(
            config.restart_window_secs,
            config.restart_free_starts,
            config.restart_step_ms,
            config.restart_max_ms,
        )
    }

    pub fn recent_starts(&self) -> usize {
        self.starts.len()
    }

    /// Records a restart at `now` and returns how long to wait before it.
    pub fn record_restart(&mut self, now: DateTime<Utc>) -> Option<Duration> {
        self.starts
            .retain(|start| now.signed_duration_since(*start).num_seconds() <= self.window_secs);
        self.starts.push(now);

        if self.starts.len() <= self.free_starts {
            return None;
        }

        let extra = self.starts.len().saturating_sub(self.free_starts) as u64;
        let backoff = self.step_ms.saturating_mul(extra);
        Some(Duration::from_millis(cmp::min(backoff, self.max_ms)))
    }
}
