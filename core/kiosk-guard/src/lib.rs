//! # kiosk-guard
//!
//! Keeps the kiosk in front of the participant. A supervised worker thread
//! re-asserts foreground, fullscreen, wake lock and back suppression on a
//! fixed cadence, independent of the session state.
//!
//! Lockdown is best-effort: every host action may fail, and failures are
//! logged and retried, never propagated. The worker restarts itself (with
//! backoff) if it dies; only [`KioskGuard::shutdown`] stops it.
//!
//! ```rust,ignore
//! let guard = KioskGuard::start(Arc::new(platform_control), GuardConfig::default());
//! // ... session runs ...
//! guard.shutdown(); // after a sanctioned exit only
//! ```

pub mod backoff;
pub mod config;
pub mod control;
pub mod enforcement;
pub mod error;
pub mod signals;
pub mod supervisor;

pub use backoff::RestartBackoff;
pub use config::GuardConfig;
pub use control::{ForegroundControl, HeadlessControl};
pub use enforcement::{ActionStatus, CycleReport, EnforcementAction, EnforcementLoop, WorkerExit};
pub use error::{ControlError, Result};
pub use signals::{respond_to_signal, HostSignal, SignalResponse};
pub use supervisor::{KioskGuard, StopSignal};
