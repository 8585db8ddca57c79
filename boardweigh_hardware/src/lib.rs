pub mod error;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod evdev_board;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use evdev_board::EvdevBoard;

use std::time::Duration;

use boardweigh_traits::{BoardSource, RawFrame};

/// Simulated balance board.
///
/// Plays an empty board for the first `settle_after` frames, then a person
/// of `weight_units` total load standing still, with a little deterministic
/// corner noise throughout. Frames are paced at `frame_period` to mimic the
/// real board's delivery rate; it never errors.
pub struct SimulatedBoard {
    frame_no: u32,
    settle_after: u32,
    weight_units: i32,
    noise_amp: i32,
    frame_period: Duration,
    rng: u32,
}

impl SimulatedBoard {
    /// `weight_units` is the standing load in board units (1 unit = 0.01 kg).
    pub fn new(weight_units: i32) -> Self {
        Self {
            frame_no: 0,
            settle_after: 50,
            weight_units,
            noise_amp: 1,
            // The real board reports at roughly 100 Hz.
            frame_period: Duration::from_millis(10),
            rng: 0x9E37_79B9,
        }
    }

    /// Frames of empty-board noise before the person steps on.
    pub fn with_settle_after(mut self, frames: u32) -> Self {
        self.settle_after = frames;
        self
    }

    /// Peak per-corner noise amplitude in board units.
    pub fn with_noise_amp(mut self, amp: i32) -> Self {
        self.noise_amp = amp.max(0);
        self
    }

    /// Delay per frame; `Duration::ZERO` runs at full speed.
    pub fn with_frame_period(mut self, period: Duration) -> Self {
        self.frame_period = period;
        self
    }

    /// Build from environment overrides, for CLI tests:
    /// BOARDWEIGH_SIM_KG (default 80.0), BOARDWEIGH_SIM_SETTLE (default 50)
    /// and BOARDWEIGH_SIM_HZ (default 100).
    pub fn from_env() -> Self {
        let kg = std::env::var("BOARDWEIGH_SIM_KG")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(80.0);
        let settle = std::env::var("BOARDWEIGH_SIM_SETTLE")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(50);
        let hz = std::env::var("BOARDWEIGH_SIM_HZ")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(100)
            .max(1);
        Self::new((kg * 100.0).round() as i32)
            .with_settle_after(settle)
            .with_frame_period(Duration::from_micros(1_000_000 / u64::from(hz)))
    }

    // xorshift32; deterministic across runs for reproducible tests
    fn next_noise(&mut self) -> i32 {
        let mut x = self.rng;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng = x;
        if self.noise_amp == 0 {
            return 0;
        }
        (x % (2 * self.noise_amp as u32 + 1)) as i32 - self.noise_amp
    }
}

impl BoardSource for SimulatedBoard {
    fn read(
        &mut self,
        _timeout: Duration,
    ) -> Result<RawFrame, Box<dyn std::error::Error + Send + Sync>> {
        if !self.frame_period.is_zero() {
            std::thread::sleep(self.frame_period);
        }

        let standing = self.frame_no >= self.settle_after;
        self.frame_no = self.frame_no.saturating_add(1);

        let total = if standing { self.weight_units } else { 0 };
        let q = total / 4;
        let mut corners = [total - 3 * q, q, q, q];
        for c in &mut corners {
            *c += self.next_noise();
        }
        let frame = RawFrame::new(corners[0], corners[1], corners[2], corners[3]);
        tracing::trace!(?frame, standing, "sim frame");
        Ok(frame)
    }
}
