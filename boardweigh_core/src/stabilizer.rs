//! The convergence loop: decides, sample by sample, when the trailing
//! window has settled enough to report a weight.

use crate::config::{CenterMethod, ConvergenceCfg};
use crate::error::BuildError;
use crate::window::SampleWindow;

/// A stabilized weight estimate, in board units of 0.01 kg.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// Center of the trailing window (mean or median).
    pub center: f64,
    /// Population standard deviation of the trailing window.
    pub spread: f64,
}

impl Estimate {
    pub fn kilograms(&self) -> f64 {
        self.center / 100.0
    }

    pub fn spread_kilograms(&self) -> f64 {
        self.spread / 100.0
    }
}

/// Outcome of one full convergence attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measurement {
    /// The trailing window settled; a stable estimate is available.
    Converged(Estimate),
    /// The iteration cap elapsed before the signal settled.
    Unsettled,
}

impl Measurement {
    pub fn estimate(&self) -> Option<Estimate> {
        match self {
            Self::Converged(e) => Some(*e),
            Self::Unsettled => None,
        }
    }

    /// Legacy wire shape: `(center, spread)`, with `(0.0, 0.0)` standing in
    /// for an unsettled run. Prefer matching on the variants; in this form
    /// a true zero-weight reading is indistinguishable from a give-up.
    pub fn into_pair(self) -> (f64, f64) {
        match self {
            Self::Converged(e) => (e.center, e.spread),
            Self::Unsettled => (0.0, 0.0),
        }
    }
}

/// Public status of a single step of the convergence loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StabilizeStatus {
    /// Keep going; not settled yet.
    Sampling,
    /// Window settled; the estimate is final.
    Converged(Estimate),
    /// Iteration cap reached without settling.
    Unsettled,
}

/// Online stabilization filter over a live stream of normalized samples.
///
/// Each `step` folds one sample into the trailing window and re-evaluates
/// the stop condition, so termination adapts to how quickly the person
/// steps on and stands still instead of waiting a fixed duration. The
/// iteration cap is purely a liveness guarantee against a signal that
/// never settles.
pub struct Stabilizer {
    cfg: ConvergenceCfg,
    window: SampleWindow,
    iterations: u32,
    // Scratch for the median sort, reused across steps.
    sort_buf: Vec<i32>,
}

impl Stabilizer {
    pub fn new(cfg: ConvergenceCfg) -> Result<Self, BuildError> {
        if cfg.max_iterations == 0 {
            return Err(BuildError::InvalidConfig("max_iterations must be > 0"));
        }
        if !cfg.max_spread.is_finite() || cfg.max_spread < 0.0 {
            return Err(BuildError::InvalidConfig(
                "max_spread must be finite and >= 0",
            ));
        }
        if !cfg.min_center.is_finite() {
            return Err(BuildError::InvalidConfig("min_center must be finite"));
        }
        let window = SampleWindow::new(cfg.window_size)?;
        let cap = window.capacity();
        Ok(Self {
            cfg,
            window,
            iterations: 0,
            sort_buf: Vec::with_capacity(cap),
        })
    }

    /// Samples evaluated so far in this attempt.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Reset per-attempt state; the window re-zeroes.
    pub fn reset(&mut self) {
        self.window.clear();
        self.iterations = 0;
    }

    /// Feed one normalized sample and evaluate the stop condition.
    ///
    /// Converges once the window is full, the spread is below `max_spread`,
    /// and the center exceeds `min_center`. Gives up (`Unsettled`) after
    /// `max_iterations + 1` evaluated samples; no stream can hold the loop
    /// open past that.
    pub fn step(&mut self, sample: i32) -> StabilizeStatus {
        self.window.push(sample);
        let (center, spread) = self.center_and_spread();
        tracing::trace!(sample, center, spread, "convergence step");

        if self.window.is_full() && spread < self.cfg.max_spread && center > self.cfg.min_center {
            tracing::debug!(center, spread, iterations = self.iterations, "settled");
            return StabilizeStatus::Converged(Estimate { center, spread });
        }
        self.iterations += 1;
        if self.iterations > self.cfg.max_iterations {
            tracing::debug!(
                iterations = self.iterations,
                "iteration cap reached before settling"
            );
            return StabilizeStatus::Unsettled;
        }
        StabilizeStatus::Sampling
    }

    /// Full recompute over the window snapshot. O(n) per sample (O(n log n)
    /// for the median), acceptable because windows are a few hundred
    /// entries and the sensor delivers tens of frames per second.
    fn center_and_spread(&mut self) -> (f64, f64) {
        let snap = self.window.snapshot();
        let n = snap.len() as f64;
        let mean = snap.iter().map(|&v| f64::from(v)).sum::<f64>() / n;
        let var = snap
            .iter()
            .map(|&v| {
                let d = f64::from(v) - mean;
                d * d
            })
            .sum::<f64>()
            / n;
        let center = match self.cfg.center {
            CenterMethod::Mean => mean,
            CenterMethod::Median => self.median(),
        };
        (center, var.sqrt())
    }

    fn median(&mut self) -> f64 {
        self.sort_buf.clear();
        self.sort_buf.extend_from_slice(self.window.snapshot());
        self.sort_buf.sort_unstable();
        let n = self.sort_buf.len();
        let mid = n / 2;
        if n.is_multiple_of(2) {
            // n >= 2 here, so mid >= 1 and mid-1 is safe
            f64::from(self.sort_buf[mid - 1]) / 2.0 + f64::from(self.sort_buf[mid]) / 2.0
        } else {
            f64::from(self.sort_buf[mid])
        }
    }
}

impl core::fmt::Debug for Stabilizer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Stabilizer")
            .field("window_size", &self.window.capacity())
            .field("iterations", &self.iterations)
            .field("full", &self.window.is_full())
            .finish()
    }
}

/// Drive a fresh stabilizer over an already-normalized sample stream.
///
/// A stream that ends before convergence counts as unsettled, the same as
/// exhausting the iteration cap.
pub fn stabilize<I>(samples: I, cfg: ConvergenceCfg) -> Result<Measurement, BuildError>
where
    I: IntoIterator<Item = i32>,
{
    let mut stab = Stabilizer::new(cfg)?;
    for sample in samples {
        match stab.step(sample) {
            StabilizeStatus::Sampling => {}
            StabilizeStatus::Converged(est) => return Ok(Measurement::Converged(est)),
            StabilizeStatus::Unsettled => return Ok(Measurement::Unsettled),
        }
    }
    Ok(Measurement::Unsettled)
}
