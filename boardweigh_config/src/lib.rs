#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and persisted-offset parsing for the weighing system.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - The offsets CSV loader enforces strict headers and exactly one row
//!   per corner, so a stale or hand-mangled file fails loudly instead of
//!   skewing every measurement.
use serde::Deserialize;

/// Offsets CSV schema.
///
/// Expected headers:
/// corner,offset
///
/// Example:
/// corner,offset
/// tl,37
/// tr,-12
/// br,8
/// bl,-3
#[derive(Debug, Deserialize, Clone)]
pub struct OffsetRow {
    pub corner: String,
    pub offset: i32,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Board {
    /// Path to the balance-board input device (e.g. /dev/input/event16).
    /// When absent, the hardware backend discovers the first board.
    pub device: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Calibration {
    /// Consecutive zero-load frames averaged per corner.
    pub repeats: u32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self { repeats: 10 }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum CenterMode {
    #[default]
    Mean,
    Median,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Convergence {
    /// Trailing window capacity in samples.
    pub window_size: usize,
    /// Settle once the window's standard deviation drops below this
    /// (board units, 1 unit = 0.01 kg).
    pub max_spread: f64,
    /// Minimum window center (board units) for a reportable weight; keeps
    /// an empty board from converging on its own noise floor.
    pub min_center: f64,
    /// Hard cap on evaluated samples per attempt.
    pub max_iterations: u32,
    /// Center statistic: "mean" or "median".
    pub center: CenterMode,
}

impl Default for Convergence {
    fn default() -> Self {
        Self {
            window_size: 600,
            max_spread: 30.0,
            min_center: 100.0,
            max_iterations: 5000,
            center: CenterMode::Mean,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Frame read timeout per read (ms). Also accepts alias "sensor_ms".
    #[serde(alias = "sensor_ms")]
    pub sample_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { sample_ms: 150 }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Event,
    Direct,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Runner {
    /// Default frame feed: "event" (background sampler) or "direct".
    pub mode: RunMode,
}

/// Persisted per-corner offsets; preferred at runtime over live
/// calibration when present.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct PersistedOffsets {
    pub top_left: i32,
    pub top_right: i32,
    pub bottom_right: i32,
    pub bottom_left: i32,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub board: Board,
    pub calibration: Calibration,
    pub convergence: Convergence,
    pub timeouts: Timeouts,
    pub logging: Logging,
    pub runner: Runner,
    /// Optional persisted offsets; skips the live zero-load calibration.
    pub offsets: Option<PersistedOffsets>,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Calibration
        if self.calibration.repeats == 0 {
            eyre::bail!("calibration.repeats must be > 0");
        }
        if self.calibration.repeats > 10_000 {
            eyre::bail!("calibration.repeats is unreasonably large (>10000)");
        }

        // Convergence
        if self.convergence.window_size == 0 {
            eyre::bail!("convergence.window_size must be > 0");
        }
        if self.convergence.window_size > 1_000_000 {
            eyre::bail!("convergence.window_size is unreasonably large (>1e6)");
        }
        if !self.convergence.max_spread.is_finite() || self.convergence.max_spread < 0.0 {
            eyre::bail!("convergence.max_spread must be finite and >= 0");
        }
        if !self.convergence.min_center.is_finite() {
            eyre::bail!("convergence.min_center must be finite");
        }
        if self.convergence.max_iterations == 0 {
            eyre::bail!("convergence.max_iterations must be > 0");
        }
        if (self.convergence.window_size as u64) > u64::from(self.convergence.max_iterations) {
            eyre::bail!("convergence.window_size exceeds max_iterations; the window can never fill");
        }

        // Timeouts
        if self.timeouts.sample_ms == 0 {
            eyre::bail!("timeouts.sample_ms must be >= 1");
        }

        // Logging
        if let Some(rotation) = self.logging.rotation.as_deref()
            && !matches!(rotation, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}

/// Load persisted per-corner offsets from a strict `corner,offset` CSV with
/// exactly one row per corner (tl, tr, br, bl in any order).
pub fn load_offsets_csv(path: &std::path::Path) -> eyre::Result<PersistedOffsets> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open offsets CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["corner", "offset"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "offsets CSV must have headers 'corner,offset', got: {}",
            actual.join(",")
        );
    }

    let mut slots: [Option<i32>; 4] = [None; 4];
    for (idx, rec) in rdr.deserialize::<OffsetRow>().enumerate() {
        let row = match rec {
            Ok(row) => row,
            Err(e) => eyre::bail!("invalid CSV row {}: {}", idx + 2, e),
        };
        let slot: usize = match row.corner.as_str() {
            "tl" => 0,
            "tr" => 1,
            "br" => 2,
            "bl" => 3,
            other => eyre::bail!(
                "unknown corner {:?} at row {} (expected tl|tr|br|bl)",
                other,
                idx + 2
            ),
        };
        if slots[slot].replace(row.offset).is_some() {
            eyre::bail!("duplicate corner {:?} at row {}", row.corner, idx + 2);
        }
    }

    match slots {
        [Some(tl), Some(tr), Some(br), Some(bl)] => Ok(PersistedOffsets {
            top_left: tl,
            top_right: tr,
            bottom_right: br,
            bottom_left: bl,
        }),
        _ => {
            let missing: Vec<&str> = ["tl", "tr", "br", "bl"]
                .iter()
                .zip(slots.iter())
                .filter(|(_, s)| s.is_none())
                .map(|(n, _)| *n)
                .collect();
            eyre::bail!("offsets CSV missing corners: {}", missing.join(","))
        }
    }
}
