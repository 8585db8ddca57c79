//! Binary entry point: argument parsing, logging setup, and dispatch.

mod cli;
mod error_fmt;
mod weigh;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    let _ = color_eyre::install();

    match run(&cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            if JSON_MODE.get().copied().unwrap_or(false) {
                eprintln!("{}", error_fmt::format_error_json(&err));
            } else {
                eprintln!("{}", error_fmt::humanize(&err));
            }
            std::process::exit(error_fmt::exit_code_for_error(&err));
        }
    }
}

fn run(cli: &Cli) -> eyre::Result<i32> {
    let cfg = load_config(cli)?;
    init_logging(cli, &cfg.logging)?;

    // Ctrl-c flips the flag; the session polls it before every frame.
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || {
            cancel.store(true, Ordering::SeqCst);
        })
        .wrap_err("install ctrl-c handler")?;
    }

    match &cli.cmd {
        Commands::Weigh {
            max_iterations,
            window_size,
            direct,
            skip_calibration,
        } => weigh::run_weigh(
            cli,
            &cfg,
            weigh::WeighOpts {
                max_iterations: *max_iterations,
                window_size: *window_size,
                direct: *direct,
                skip_calibration: *skip_calibration,
            },
            cancel,
        ),
        Commands::SelfCheck => weigh::run_self_check(cli, &cfg),
    }
}

fn load_config(cli: &Cli) -> eyre::Result<boardweigh_config::Config> {
    if !cli.config.exists() {
        tracing::debug!(path = %cli.config.display(), "config file not found; using defaults");
        return Ok(boardweigh_config::Config::default());
    }
    let text = std::fs::read_to_string(&cli.config)
        .wrap_err_with(|| format!("read config {:?}", cli.config))?;
    let cfg = boardweigh_config::load_toml(&text)
        .map_err(|e| eyre::eyre!("parse config {:?}: {}", cli.config, e))?;
    cfg.validate()
        .wrap_err_with(|| format!("invalid configuration in {:?}", cli.config))?;
    Ok(cfg)
}

fn init_logging(cli: &Cli, logging: &boardweigh_config::Logging) -> eyre::Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    // RUST_LOG wins over --log-level when set.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .map_err(|e| eyre::eyre!("invalid log level {:?}: {e}", cli.log_level))?;

    let file_layer = match logging.file.as_deref() {
        Some(path) => {
            let p = std::path::Path::new(path);
            let dir = p
                .parent()
                .filter(|d| !d.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let name = p
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file has no file name: {path}"))?;
            let appender = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(fmt::layer().json().with_writer(writer).with_ansi(false))
        }
        None => None,
    };

    // Console logs always go to stderr; stdout is reserved for results.
    let registry = tracing_subscriber::registry().with(filter).with(file_layer);
    if cli.json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
    Ok(())
}
