//! Session orchestration: calibrate against the unloaded board, then drive
//! the convergence loop to a stable weight.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use boardweigh_traits::clock::{Clock, MonotonicClock};
use boardweigh_traits::{BoardSource, RawFrame};
use eyre::WrapErr;

use crate::calibration::{self, CornerOffsets};
use crate::config::{CalibrationCfg, ConvergenceCfg, Timeouts};
use crate::error::{BuildError, Report, Result, WeighError, map_source_error};
use crate::sampler::FrameSampler;
use crate::stabilizer::{Measurement, StabilizeStatus, Stabilizer};

/// How frames reach the session.
#[derive(Debug, Clone, Copy, Default)]
pub enum SamplingMode {
    /// Read the source inside the session loop via `BoardSource::read`.
    Direct,
    /// A background sampler thread owns the source; a stall watchdog bounds
    /// wall-clock time even when the source goes silent mid-read.
    #[default]
    Event,
}

/// Stall watchdog threshold for the event feed: four missed per-read
/// timeouts, never below 1 ms.
#[inline]
fn stall_threshold_ms(sensor_timeout_ms: u64) -> u64 {
    sensor_timeout_ms.saturating_mul(4).max(1)
}

enum Feed {
    Direct(Box<dyn BoardSource + Send>),
    Event(FrameSampler),
}

/// One board-connection session: owns the frame feed, the zero-load
/// calibration state, and the convergence parameters.
///
/// Lifecycle: `calibrate()` once per session (or seed persisted offsets),
/// then `weigh()` as often as needed; each weigh runs a fresh window.
pub struct WeighSession {
    feed: Feed,
    calibration: CalibrationCfg,
    convergence: ConvergenceCfg,
    timeouts: Timeouts,
    clock: Arc<dyn Clock + Send + Sync>,
    cancel_check: Option<Box<dyn Fn() -> bool>>,
    offsets: Option<CornerOffsets>,
    stall_ms: u64,
}

impl core::fmt::Debug for WeighSession {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WeighSession")
            .field("window_size", &self.convergence.window_size)
            .field("calibrated", &self.offsets.is_some())
            .finish()
    }
}

impl WeighSession {
    /// Start building a session.
    pub fn builder() -> SessionBuilder<Missing> {
        SessionBuilder::default()
    }

    pub fn offsets(&self) -> Option<CornerOffsets> {
        self.offsets
    }

    /// Seed persisted offsets instead of running `calibrate`.
    pub fn set_offsets(&mut self, offsets: CornerOffsets) {
        self.offsets = Some(offsets);
    }

    fn cancelled(&self) -> bool {
        self.cancel_check.as_ref().is_some_and(|check| check())
    }

    /// Pull the next frame from the feed, honoring cancellation and the
    /// event-mode stall watchdog.
    fn next_frame(&mut self) -> Result<RawFrame> {
        if self.cancelled() {
            return Err(Report::new(WeighError::Cancelled));
        }
        let timeout = Duration::from_millis(self.timeouts.sensor_ms);
        match &mut self.feed {
            Feed::Direct(source) => source
                .read(timeout)
                .map_err(|e| Report::new(map_source_error(e.as_ref())))
                .wrap_err("reading board frame"),
            Feed::Event(sampler) => loop {
                if let Some(frame) = sampler.latest() {
                    return Ok(frame);
                }
                if sampler.stalled_for_now() > self.stall_ms {
                    return Err(Report::new(WeighError::Timeout)).wrap_err("board stream stalled");
                }
                if self.cancel_check.as_ref().is_some_and(|check| check()) {
                    return Err(Report::new(WeighError::Cancelled));
                }
                self.clock.sleep(Duration::from_millis(1));
            },
        }
    }

    /// Compute the per-corner zero-load baseline from the live feed. The
    /// board must stay unloaded until this returns.
    pub fn calibrate(&mut self) -> Result<CornerOffsets> {
        let repeats = self.calibration.repeats;
        tracing::info!(repeats, "calibration start");
        let offsets = calibration::calibrate_from(|| self.next_frame(), repeats)?;
        self.offsets = Some(offsets);
        Ok(offsets)
    }

    /// Run one convergence attempt over the live feed.
    ///
    /// Returns `Measurement::Unsettled` when the iteration cap elapses
    /// first; source faults, stalls, and cancellation surface as errors.
    pub fn weigh(&mut self) -> Result<Measurement> {
        let offsets = self.offsets.ok_or_else(|| {
            Report::new(WeighError::Config(
                "no calibration offsets; call calibrate() or seed persisted offsets".into(),
            ))
        })?;
        let mut stabilizer = Stabilizer::new(self.convergence.clone()).map_err(Report::new)?;
        tracing::info!(
            window = self.convergence.window_size,
            max_iterations = self.convergence.max_iterations,
            "measurement start"
        );
        loop {
            let frame = self.next_frame()?;
            let sample = calibration::normalize(&frame, &offsets);
            match stabilizer.step(sample) {
                StabilizeStatus::Sampling => continue,
                StabilizeStatus::Converged(est) => {
                    tracing::info!(
                        kg = est.kilograms(),
                        spread_kg = est.spread_kilograms(),
                        iterations = stabilizer.iterations(),
                        "measurement settled"
                    );
                    return Ok(Measurement::Converged(est));
                }
                StabilizeStatus::Unsettled => {
                    tracing::warn!(
                        iterations = stabilizer.iterations(),
                        "measurement gave up before settling"
                    );
                    return Ok(Measurement::Unsettled);
                }
            }
        }
    }
}

// Type-state markers for the builder
pub struct Missing;
pub struct Set;

/// Builder for `WeighSession`. All config values are validated on `build()`.
pub struct SessionBuilder<S> {
    source: Option<Box<dyn BoardSource + Send>>,
    calibration: Option<CalibrationCfg>,
    convergence: Option<ConvergenceCfg>,
    timeouts: Option<Timeouts>,
    mode: SamplingMode,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    cancel_check: Option<Box<dyn Fn() -> bool>>,
    offsets: Option<CornerOffsets>,
    _s: PhantomData<S>,
}

impl Default for SessionBuilder<Missing> {
    fn default() -> Self {
        Self {
            source: None,
            calibration: None,
            convergence: None,
            timeouts: None,
            mode: SamplingMode::default(),
            clock: None,
            cancel_check: None,
            offsets: None,
            _s: PhantomData,
        }
    }
}

/// Chainable setters that do not affect type-state
impl<S> SessionBuilder<S> {
    pub fn with_calibration(mut self, calibration: CalibrationCfg) -> Self {
        self.calibration = Some(calibration);
        self
    }
    pub fn with_convergence(mut self, convergence: ConvergenceCfg) -> Self {
        self.convergence = Some(convergence);
        self
    }
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = Some(timeouts);
        self
    }
    pub fn with_mode(mut self, mode: SamplingMode) -> Self {
        self.mode = mode;
        self
    }
    /// Provide a custom clock; defaults to MonotonicClock when not provided.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
    /// Cooperative cancellation, polled before every frame; when it returns
    /// true the run aborts with `WeighError::Cancelled`.
    pub fn with_cancel_check<F>(mut self, f: F) -> Self
    where
        F: Fn() -> bool + 'static,
    {
        self.cancel_check = Some(Box::new(f));
        self
    }
    /// Seed persisted per-corner offsets, skipping the live calibration.
    pub fn with_offsets(mut self, offsets: CornerOffsets) -> Self {
        self.offsets = Some(offsets);
        self
    }

    /// Fallible build available in any type-state; returns a typed
    /// `BuildError` for missing pieces.
    pub fn try_build(self) -> Result<WeighSession> {
        let source = self
            .source
            .ok_or_else(|| Report::new(BuildError::MissingSource))?;
        let calibration = self.calibration.unwrap_or_default();
        let convergence = self.convergence.unwrap_or_default();
        let timeouts = self.timeouts.unwrap_or_default();
        let clock: Arc<dyn Clock + Send + Sync> = match self.clock {
            Some(b) => Arc::from(b),
            None => Arc::new(MonotonicClock::new()),
        };

        if calibration.repeats == 0 {
            return Err(Report::new(BuildError::InvalidConfig(
                "calibration repeats must be > 0",
            )));
        }
        if timeouts.sensor_ms == 0 {
            return Err(Report::new(BuildError::InvalidConfig(
                "sensor_ms must be >= 1",
            )));
        }
        if convergence.window_size == 0 {
            return Err(Report::new(BuildError::InvalidConfig(
                "window_size must be > 0",
            )));
        }
        if convergence.max_iterations == 0 {
            return Err(Report::new(BuildError::InvalidConfig(
                "max_iterations must be > 0",
            )));
        }
        if !convergence.max_spread.is_finite() || convergence.max_spread < 0.0 {
            return Err(Report::new(BuildError::InvalidConfig(
                "max_spread must be finite and >= 0",
            )));
        }
        if !convergence.min_center.is_finite() {
            return Err(Report::new(BuildError::InvalidConfig(
                "min_center must be finite",
            )));
        }

        let stall_ms = stall_threshold_ms(timeouts.sensor_ms);
        let feed = match self.mode {
            SamplingMode::Direct => Feed::Direct(source),
            SamplingMode::Event => Feed::Event(FrameSampler::spawn(
                source,
                Duration::from_millis(timeouts.sensor_ms),
                MonotonicClock::new(),
            )),
        };

        Ok(WeighSession {
            feed,
            calibration,
            convergence,
            timeouts,
            clock,
            cancel_check: self.cancel_check,
            offsets: self.offsets,
            stall_ms,
        })
    }
}

// Setter that advances type-state when providing the mandatory source
impl SessionBuilder<Missing> {
    pub fn with_source(self, source: impl BoardSource + Send + 'static) -> SessionBuilder<Set> {
        let SessionBuilder {
            source: _,
            calibration,
            convergence,
            timeouts,
            mode,
            clock,
            cancel_check,
            offsets,
            _s: _,
        } = self;
        SessionBuilder {
            source: Some(Box::new(source)),
            calibration,
            convergence,
            timeouts,
            mode,
            clock,
            cancel_check,
            offsets,
            _s: PhantomData,
        }
    }
}

impl SessionBuilder<Set> {
    /// Validate and build the session. Only available once a source is set.
    pub fn build(self) -> Result<WeighSession> {
        self.try_build()
    }
}
