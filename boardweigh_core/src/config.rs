//! Runtime configuration for the stabilization engine.
//!
//! These are the structs consumed by `Stabilizer` and `WeighSession`. They
//! are separate from the TOML-deserialized config in `boardweigh_config`.

/// Which statistic is reported as the window's center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CenterMethod {
    /// Arithmetic mean over the window.
    #[default]
    Mean,
    /// Median over the window; more robust against weight-shift spikes.
    Median,
}

/// Convergence loop parameters.
#[derive(Debug, Clone)]
pub struct ConvergenceCfg {
    /// Number of most-recent samples considered (window capacity).
    pub window_size: usize,
    /// Dispersion (population standard deviation, board units) below which
    /// the window counts as settled.
    pub max_spread: f64,
    /// Minimum center value (board units); keeps an empty board's noise
    /// floor from reporting a converged near-zero weight.
    pub min_center: f64,
    /// Hard cap on evaluated samples; guarantees termination when the
    /// signal never settles.
    pub max_iterations: u32,
    /// Center statistic.
    pub center: CenterMethod,
}

impl Default for ConvergenceCfg {
    fn default() -> Self {
        Self {
            window_size: 600,
            max_spread: 30.0,
            min_center: 100.0,
            max_iterations: 5000,
            center: CenterMethod::Mean,
        }
    }
}

/// Zero-load calibration parameters.
#[derive(Debug, Clone, Copy)]
pub struct CalibrationCfg {
    /// Consecutive frames averaged per corner while the board is unloaded.
    pub repeats: u32,
}

impl Default for CalibrationCfg {
    fn default() -> Self {
        Self { repeats: 10 }
    }
}

/// Timeouts and watchdogs.
#[derive(Debug, Clone)]
pub struct Timeouts {
    /// Max wait per frame read (ms).
    pub sensor_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { sensor_ms: 150 }
    }
}
