//! Weigh command: config mapping, source assembly, and session execution.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use boardweigh_config::Config;
use boardweigh_core::{
    CalibrationCfg, ConvergenceCfg, CornerOffsets, Measurement, SamplingMode, Timeouts,
    WeighSession,
};
use boardweigh_traits::BoardSource;

use crate::cli::{Cli, JSON_MODE};

pub struct WeighOpts {
    pub max_iterations: Option<u32>,
    pub window_size: Option<usize>,
    pub direct: bool,
    pub skip_calibration: bool,
}

/// Exit code for a measurement that gave up before settling.
pub const EXIT_UNSETTLED: i32 = 3;

fn json_mode() -> bool {
    JSON_MODE.get().copied().unwrap_or(false)
}

fn make_source(cfg: &Config) -> eyre::Result<Box<dyn BoardSource + Send>> {
    #[cfg(all(feature = "hardware", target_os = "linux"))]
    {
        let board = match cfg.board.device.as_deref() {
            Some(path) => boardweigh_hardware::EvdevBoard::open(path)?,
            None => boardweigh_hardware::EvdevBoard::discover()?,
        };
        Ok(Box::new(board))
    }
    #[cfg(not(all(feature = "hardware", target_os = "linux")))]
    {
        let _ = cfg; // board.device only applies to the hardware backend
        Ok(Box::new(boardweigh_hardware::SimulatedBoard::from_env()))
    }
}

/// Persisted offsets: the CSV flag wins over the config table.
fn persisted_offsets(cli: &Cli, cfg: &Config) -> eyre::Result<Option<CornerOffsets>> {
    if let Some(path) = &cli.offsets {
        let p = boardweigh_config::load_offsets_csv(path)?;
        return Ok(Some((&p).into()));
    }
    Ok(cfg.offsets.as_ref().map(CornerOffsets::from))
}

pub fn run_weigh(
    cli: &Cli,
    cfg: &Config,
    opts: WeighOpts,
    cancel: Arc<AtomicBool>,
) -> eyre::Result<i32> {
    let mut convergence: ConvergenceCfg = (&cfg.convergence).into();
    if let Some(n) = opts.max_iterations {
        convergence.max_iterations = n;
    }
    if let Some(n) = opts.window_size {
        convergence.window_size = n;
    }
    let calibration: CalibrationCfg = (&cfg.calibration).into();
    let timeouts: Timeouts = (&cfg.timeouts).into();
    let mode = if opts.direct {
        SamplingMode::Direct
    } else {
        SamplingMode::from(cfg.runner.mode)
    };

    let persisted = persisted_offsets(cli, cfg)?;
    if opts.skip_calibration && persisted.is_none() {
        eyre::bail!(
            "--skip-calibration requires persisted offsets (--offsets or [offsets] in config)"
        );
    }

    let source = make_source(cfg)?;
    let mut builder = WeighSession::builder()
        .with_source(source)
        .with_calibration(calibration)
        .with_convergence(convergence)
        .with_timeouts(timeouts)
        .with_mode(mode)
        .with_cancel_check(move || cancel.load(Ordering::SeqCst));
    if let Some(offsets) = persisted {
        builder = builder.with_offsets(offsets);
    }
    let mut session = builder.build()?;

    if session.offsets().is_none() {
        if !json_mode() {
            println!("Keep the board unloaded; measuring zero offsets...");
        }
        session.calibrate()?;
    }
    if !json_mode() {
        println!("Step on the board and stand still...");
    }

    match session.weigh()? {
        Measurement::Converged(est) => {
            if json_mode() {
                println!(
                    "{}",
                    serde_json::json!({
                        "converged": true,
                        "kg": est.kilograms(),
                        "uncertainty_kg": est.spread_kilograms(),
                        "center_units": est.center,
                        "spread_units": est.spread,
                    })
                );
            } else {
                println!("{:.2} kg +/- {:.2} kg", est.kilograms(), est.spread_kilograms());
            }
            Ok(0)
        }
        Measurement::Unsettled => {
            if json_mode() {
                println!("{}", serde_json::json!({ "converged": false }));
            } else {
                println!("Measurement did not settle; stand still and try again.");
            }
            Ok(EXIT_UNSETTLED)
        }
    }
}

pub fn run_self_check(cli: &Cli, cfg: &Config) -> eyre::Result<i32> {
    // Validate a supplied offsets CSV even in self-check, so a broken file
    // is caught before anyone stands on the board.
    if let Some(path) = &cli.offsets {
        boardweigh_config::load_offsets_csv(path)?;
    }

    let mut source = make_source(cfg)?;
    let timeout = Duration::from_millis(cfg.timeouts.sample_ms);
    let frame = source
        .read(timeout)
        .map_err(|e| eyre::eyre!("board read failed: {e}"))?;
    tracing::info!(?frame, "self-check frame");
    if json_mode() {
        println!(
            "{}",
            serde_json::json!({
                "ok": true,
                "frame": {
                    "top_left": frame.top_left,
                    "top_right": frame.top_right,
                    "bottom_right": frame.bottom_right,
                    "bottom_left": frame.bottom_left,
                }
            })
        );
    } else {
        println!(
            "ok: frame tl={} tr={} br={} bl={}",
            frame.top_left, frame.top_right, frame.bottom_right, frame.bottom_left
        );
    }
    Ok(0)
}
