//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "boardweigh", version, about = "Balance-board scale CLI")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/boardweigh.toml")]
    pub config: PathBuf,

    /// Optional persisted offsets CSV (strict header)
    #[arg(long, value_name = "FILE")]
    pub offsets: Option<PathBuf>,

    /// Log and print results as JSON instead of pretty text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Measure a stabilized weight
    Weigh {
        /// Override convergence: max samples examined before giving up
        #[arg(long, value_name = "N")]
        max_iterations: Option<u32>,
        /// Override convergence: trailing window size in samples
        #[arg(long, value_name = "N")]
        window_size: Option<usize>,
        /// Read the board inside the control loop (no sampler thread)
        #[arg(long, action = ArgAction::SetTrue)]
        direct: bool,
        /// Skip zero-load calibration (requires persisted offsets)
        #[arg(long, action = ArgAction::SetTrue)]
        skip_calibration: bool,
    },
    /// Quick health check (board presence / sim ok)
    SelfCheck,
}
