//! Hidden exit gesture.
//!
//! Staff leave the kiosk by tapping an invisible zone `taps_required` times
//! within `window_ms`. The detector is a synchronous fold over tap
//! timestamps; it knows nothing about the session state.
//!
//! Policy:
//! - A burst starts with the first tap after a reset. A tap that lands more
//!   than `window_ms` after the burst's first tap starts a new burst.
//! - The count is incremented before it is compared, so exactly the
//!   `taps_required`-th tap of a burst matures the gesture.
//! - Maturation resets the count to zero; re-triggering needs a fresh burst.

use serde::Serialize;

use crate::config::KioskConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct GestureCounter {
    pub count: u32,
    pub last_tap_at: Option<u64>,
    pub burst_started_at: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct GestureDetector {
    counter: GestureCounter,
    taps_required: u32,
    window_ms: u64,
}

impl GestureDetector {
    pub fn new(taps_required: u32, window_ms: u64) -> Self {
        Self {
            counter: GestureCounter::default(),
            taps_required: taps_required.max(1),
            window_ms,
        }
    }

    pub fn from_config(config: &KioskConfig) -> Self {
        Self::new(config.exit_taps_required, config.exit_window_ms)
    }

    pub fn counter(&self) -> GestureCounter {
        self.counter
    }

    /// Registers one tap. Returns `true` when this tap matures the gesture.
    pub fn register_tap(&mut self, now_ms: u64) -> bool {
        let in_burst = self.counter.count > 0
            && self
                .counter
                .burst_started_at
                .map(|start| now_ms.saturating_sub(start) <= self.window_ms)
                .unwrap_or(false);

        if in_burst {
            self.counter.count += 1;
        } else {
            self.counter.count = 1;
            self.counter.burst_started_at = Some(now_ms);
        }
        self.counter.last_tap_at = Some(now_ms);

        if self.counter.count >= self.taps_required {
            tracing::info!(taps = self.counter.count, "Hidden exit gesture matured");
            self.counter.count = 0;
            self.counter.burst_started_at = None;
            return true;
        }

        tracing::debug!(taps = self.counter.count, "Hidden zone tap");
        false
    }
}
