//! Host lifecycle signals.
//!
//! Besides its periodic cycle, the guard reacts immediately when the host
//! reports that the participant tried to navigate away.

use serde::Serialize;

use crate::config::GuardConfig;
use crate::control::ForegroundControl;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HostSignal {
    /// Hardware back input.
    BackPressed,
    /// Home or recents was pressed; the app is about to leave the foreground.
    UserLeaveHint,
    /// The app's UI is no longer visible.
    UiHidden,
    FocusGained,
    Resumed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalResponse {
    /// The host must not run its default action (e.g. back-navigation).
    SuppressDefault,
    /// The kiosk was re-asserted; the host may continue normally.
    Reasserted,
}

pub fn respond_to_signal<C: ForegroundControl>(
    control: &C,
    config: &GuardConfig,
    signal: HostSignal,
) -> SignalResponse {
    match signal {
        HostSignal::BackPressed => {
            tracing::debug!("Back input suppressed; use the hidden exit");
            SignalResponse::SuppressDefault
        }
        HostSignal::UserLeaveHint | HostSignal::UiHidden => {
            tracing::info!(signal = ?signal, "Participant left the kiosk, bringing it back");
            if let Err(err) = control.bring_to_front() {
                tracing::warn!(error = %err, signal = ?signal, "Failed to bring kiosk to front");
            }
            SignalResponse::Reasserted
        }
        HostSignal::FocusGained | HostSignal::Resumed => {
            if let Err(err) = control.hide_system_bars() {
                tracing::warn!(error = %err, signal = ?signal, "Failed to hide system bars");
            }
            if let Err(err) = control.renew_wake_lock(config.wake_lock_timeout()) {
                tracing::debug!(error = %err, signal = ?signal, "Failed to renew wake lock");
            }
            SignalResponse::Reasserted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::HeadlessControl;

    #[test]
    fn back_is_always_suppressed() {
        let control = HeadlessControl::new();
        assert_eq!(
            respond_to_signal(&control, &GuardConfig::default(), HostSignal::BackPressed),
            SignalResponse::SuppressDefault
        );
    }

    #[test]
    fn leaving_reasserts_even_when_actions_fail() {
        let control = HeadlessControl::new();
        for signal in [
            HostSignal::UserLeaveHint,
            HostSignal::UiHidden,
            HostSignal::FocusGained,
            HostSignal::Resumed,
        ] {
            assert_eq!(
                respond_to_signal(&control, &GuardConfig::default(), signal),
                SignalResponse::Reasserted
            );
        }
    }
}
