//! Foreground-control capability.
//!
//! The host platform implements [`ForegroundControl`]; only this crate calls
//! it. Every operation is idempotent and may fail without consequence.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::error::{ControlError, Result};

pub trait ForegroundControl: Send + Sync {
    /// Whether this application is the foreground task.
    fn is_foreground(&self) -> Result<bool>;

    fn bring_to_front(&self) -> Result<()>;

    /// Hide status/navigation bars and system gesture areas.
    fn hide_system_bars(&self) -> Result<()>;

    /// Acquire the display wake lock, or renew it for another `timeout`.
    fn renew_wake_lock(&self, timeout: Duration) -> Result<()>;

    fn release_wake_lock(&self) -> Result<()>;

    /// Make the hardware back input a no-op.
    fn suppress_back_navigation(&self) -> Result<()>;

    /// Pin the app as the only task (lock-task / single-app mode).
    fn enter_lock_task(&self) -> Result<()>;
}

/// Control for hosts without a window manager to fight, such as a terminal.
///
/// The process is always "in front"; display and navigation requests are
/// logged. Wake locks are not available.
#[derive(Debug, Default)]
pub struct HeadlessControl {
    back_suppressed: AtomicBool,
}

impl HeadlessControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn back_suppressed(&self) -> bool {
        self.back_suppressed.load(Ordering::SeqCst)
    }
}

impl ForegroundControl for HeadlessControl {
    fn is_foreground(&self) -> Result<bool> {
        Ok(true)
    }

    fn bring_to_front(&self) -> Result<()> {
        tracing::debug!("Headless host: bring to front is a no-op");
        Ok(())
    }

    fn hide_system_bars(&self) -> Result<()> {
        Ok(())
    }

    fn renew_wake_lock(&self, _timeout: Duration) -> Result<()> {
        Err(ControlError::Unsupported("display wake lock".to_string()))
    }

    fn release_wake_lock(&self) -> Result<()> {
        Ok(())
    }

    fn suppress_back_navigation(&self) -> Result<()> {
        self.back_suppressed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn enter_lock_task(&self) -> Result<()> {
        Err(ControlError::Unsupported("lock task mode".to_string()))
    }
}
