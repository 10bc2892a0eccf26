//! kiosk-shell: terminal front end for the profile kiosk.
//!
//! ## Subcommands
//!
//! - `run`: live kiosk; reads participant input from stdin
//! - `replay`: rehearse a command script on a simulated clock
//! - `check-config`: print the compiled configuration with secrets masked

mod commands;
mod error;
mod live;
mod logging;
mod render;
mod replay;
mod tty;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use kiosk_core::KioskConfig;
use kiosk_guard::GuardConfig;

use crate::error::ShellError;

#[derive(Parser)]
#[command(name = "kiosk-shell")]
#[command(about = "Profile kiosk for the escape-room exercise")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the kiosk (one command per stdin line)
    Run,

    /// Replay a rehearsal script on a simulated clock
    Replay {
        /// Script with one command per line; `wait <n>s|<n>ms` advances time
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Print only the final screen
        #[arg(long)]
        quiet: bool,
    },

    /// Print the compiled configuration with secrets masked
    CheckConfig,
}

fn main() {
    let cli = Cli::parse();
    let _logging_guard = logging::init();

    let config = KioskConfig::default();

    let result = match cli.command {
        Commands::Run => live::run(config, GuardConfig::default()),
        Commands::Replay { script, quiet } => replay::run(&script, config, quiet),
        Commands::CheckConfig => check_config(&config),
    };

    if let Err(err) = result {
        fail(err);
    }
}

fn check_config(config: &KioskConfig) -> Result<(), ShellError> {
    let report = serde_json::json!({
        "kiosk": config.masked(),
        "overshares": config.overshare_count(),
        "guard": GuardConfig::default(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn fail(err: ShellError) -> ! {
    tracing::error!(error = %err, "kiosk-shell failed");
    eprintln!("kiosk-shell: {err}");
    std::process::exit(1);
}
