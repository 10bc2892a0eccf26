//! Time sources.
//!
//! Timers and the gesture detector work on monotonic milliseconds from
//! [`Clock::now_ms`]. Wall time is only used for the lock-screen display.

use chrono::{DateTime, Duration, Local, TimeZone};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

pub trait Clock {
    /// Monotonic milliseconds since an arbitrary, fixed origin.
    fn now_ms(&self) -> u64;

    /// Local wall-clock time.
    fn wall_time(&self) -> DateTime<Local>;
}

/// Real clock: monotonic time measured from construction.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn wall_time(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Hand-driven clock for tests and scripted rehearsals.
///
/// Clones share the same time, so a test can keep one handle while the
/// runtime owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now_ms: Arc<AtomicU64>,
    wall_base: DateTime<Local>,
}

impl ManualClock {
    pub fn new(wall_base: DateTime<Local>) -> Self {
        Self {
            now_ms: Arc::new(AtomicU64::new(0)),
            wall_base,
        }
    }

    /// Starts at 09:00 local time on 19 October 2026.
    pub fn at_default_base() -> Self {
        let base = Local
            .with_ymd_and_hms(2026, 10, 19, 9, 0, 0)
            .earliest()
            .unwrap_or_else(Local::now);
        Self::new(base)
    }

    pub fn advance(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: u64) {
        self.now_ms.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    fn wall_time(&self) -> DateTime<Local> {
        self.wall_base + Duration::milliseconds(self.now_ms() as i64)
    }
}

/// "09:05 AM"
pub fn format_lock_time<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%I:%M %p").to_string()
}

/// "Monday, 19 October"
pub fn format_lock_date<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%A, %-d %B").to_string()
}
