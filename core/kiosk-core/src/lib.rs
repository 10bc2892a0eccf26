//! # kiosk-core
//!
//! Core library for the profile kiosk: a single-device escape-room prop where
//! a participant unlocks a simulated social profile, flags the overshared
//! fields and is shown a PIN.
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime and no internal threads. Timers are
//!   wall-clock deadlines the caller polls.
//! - **Single writer**: All mutation goes through [`KioskRuntime`], which
//!   serializes input, taps and timer firings.
//! - **No invalid combinations**: The session is one tagged [`SessionState`]
//!   plus an exit-prompt overlay.
//! - **Errors stay local**: Rejected input is a message on the state, never an
//!   `Err`.
//! - **Ephemeral**: Nothing is persisted; a new process starts locked.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kiosk_core::{Input, KioskConfig, KioskRuntime, SessionMachine, SystemClock};
//!
//! let machine = SessionMachine::new(KioskConfig::default());
//! let mut runtime = KioskRuntime::new(machine, SystemClock::new(), exit_capability);
//! runtime.handle(Input::SubmitPassword(attempt));
//! let screen = kiosk_core::view::project(&runtime.snapshot(), &config, clock.wall_time());
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod gesture;
pub mod runtime;
pub mod session;
pub mod timers;
pub mod view;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::KioskConfig;
pub use error::{KioskError, Result};
pub use gesture::{GestureCounter, GestureDetector};
pub use runtime::{Input, KioskRuntime, ProcessExit};
pub use session::{
    ExitPrompt, ExitReason, OvershareId, Outcome, ProfileSection, SessionMachine,
    SessionSnapshot, SessionState, Stage,
};
pub use timers::{TimerFiring, TimerHandle, TimerKind, TimerSubsystem};
pub use view::{project, Modal, ProfileField, Screen};
