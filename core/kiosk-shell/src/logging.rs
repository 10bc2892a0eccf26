//! Tracing setup.
//!
//! The terminal shows the kiosk screen, so logs go to a daily file under
//! `~/.kiosk/logs/`. Without a home directory they fall back to stderr.

use std::env;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "kiosk-shell.log";

/// Installs the global subscriber. Keep the returned guard alive until the
/// process exits or buffered lines are lost.
pub fn init() -> Option<WorkerGuard> {
    let filter = env_filter();

    let Some(dir) = log_dir() else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        tracing::warn!("Home directory not found, logging to stderr");
        return None;
    };

    if let Err(err) = fs_err::create_dir_all(&dir) {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        tracing::warn!(error = %err, "Failed to create log directory, logging to stderr");
        return None;
    }

    let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    tracing::debug!(dir = %dir.display(), "Logging initialized");
    Some(guard)
}

fn env_filter() -> EnvFilter {
    if debug_forced(env::var("KIOSK_DEBUG_LOG").ok().as_deref()) {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

fn debug_forced(value: Option<&str>) -> bool {
    matches!(value, Some("1" | "true" | "TRUE" | "yes" | "YES"))
}

fn log_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".kiosk").join("logs"))
}
