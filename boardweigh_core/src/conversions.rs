//! `From` implementations bridging `boardweigh_config` types to
//! `boardweigh_core` types.
//!
//! These eliminate manual field-by-field mapping in the CLI.

use crate::calibration::CornerOffsets;
use crate::config::{CalibrationCfg, CenterMethod, ConvergenceCfg, Timeouts};
use crate::runner::SamplingMode;

// ── ConvergenceCfg ───────────────────────────────────────────────────────────

impl From<&boardweigh_config::Convergence> for ConvergenceCfg {
    fn from(c: &boardweigh_config::Convergence) -> Self {
        Self {
            window_size: c.window_size,
            max_spread: c.max_spread,
            min_center: c.min_center,
            max_iterations: c.max_iterations,
            center: match c.center {
                boardweigh_config::CenterMode::Mean => CenterMethod::Mean,
                boardweigh_config::CenterMode::Median => CenterMethod::Median,
            },
        }
    }
}

// ── CalibrationCfg ───────────────────────────────────────────────────────────

impl From<&boardweigh_config::Calibration> for CalibrationCfg {
    fn from(c: &boardweigh_config::Calibration) -> Self {
        Self { repeats: c.repeats }
    }
}

// ── Timeouts ─────────────────────────────────────────────────────────────────

impl From<&boardweigh_config::Timeouts> for Timeouts {
    fn from(c: &boardweigh_config::Timeouts) -> Self {
        Self {
            sensor_ms: c.sample_ms,
        }
    }
}

// ── SamplingMode ─────────────────────────────────────────────────────────────

impl From<boardweigh_config::RunMode> for SamplingMode {
    fn from(m: boardweigh_config::RunMode) -> Self {
        match m {
            boardweigh_config::RunMode::Event => SamplingMode::Event,
            boardweigh_config::RunMode::Direct => SamplingMode::Direct,
        }
    }
}

// ── CornerOffsets ────────────────────────────────────────────────────────────

impl From<&boardweigh_config::PersistedOffsets> for CornerOffsets {
    fn from(p: &boardweigh_config::PersistedOffsets) -> Self {
        CornerOffsets::new([p.top_left, p.top_right, p.bottom_right, p.bottom_left])
    }
}
