//! Zero-load calibration and frame normalization.

use std::time::Duration;

use boardweigh_traits::{BoardSource, RawFrame};

use crate::error::{Report, Result, WeighError};

/// Per-corner zero-load baselines, in board units.
///
/// Computed once per connection session, before any reported measurement,
/// and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CornerOffsets([i32; 4]);

impl CornerOffsets {
    /// Offsets in fixed (tl, tr, br, bl) order.
    pub const fn new(offsets: [i32; 4]) -> Self {
        Self(offsets)
    }

    pub const fn as_array(&self) -> [i32; 4] {
        self.0
    }
}

/// Signed division rounded to nearest, ties away from zero. `d` must be > 0.
#[inline]
fn div_round_nearest_i64(n: i64, d: i64) -> i64 {
    debug_assert!(d > 0);
    if n >= 0 { (n + d / 2) / d } else { (n - d / 2) / d }
}

/// Estimate the zero-load baseline from `repeats` consecutive frames
/// supplied by `next`. The board must be unloaded while this runs.
///
/// Per-corner sums accumulate in `i64` and are divided once at the end,
/// rounded to nearest. A frame error before `repeats` frames were obtained
/// fails with `InsufficientSamples`; there are no retries here.
pub fn calibrate_from<F>(mut next: F, repeats: u32) -> Result<CornerOffsets>
where
    F: FnMut() -> Result<RawFrame>,
{
    if repeats == 0 {
        return Err(Report::new(WeighError::Config(
            "calibration repeats must be > 0".into(),
        )));
    }
    let need = repeats as usize;
    let mut sums = [0i64; 4];
    for got in 0..need {
        let frame = match next() {
            Ok(f) => f,
            Err(e) => {
                if e.downcast_ref::<WeighError>()
                    .is_some_and(|w| matches!(w, WeighError::Cancelled))
                {
                    return Err(e);
                }
                tracing::warn!(error = %e, got, need, "calibration frame read failed");
                return Err(Report::new(WeighError::InsufficientSamples { got, need }));
            }
        };
        for (sum, ch) in sums.iter_mut().zip(frame.channels()) {
            *sum += i64::from(ch);
        }
    }
    // Quotients of i32-valued sums over `repeats` always fit back in i32.
    let mut offsets = [0i32; 4];
    for (o, sum) in offsets.iter_mut().zip(sums) {
        *o = div_round_nearest_i64(sum, i64::from(repeats)) as i32;
    }
    tracing::debug!(?offsets, repeats, "zero-load calibration complete");
    Ok(CornerOffsets(offsets))
}

/// Convenience wrapper: calibrate by reading directly from a source with a
/// per-frame timeout.
pub fn calibrate<S: BoardSource + ?Sized>(
    source: &mut S,
    repeats: u32,
    timeout: Duration,
) -> Result<CornerOffsets> {
    calibrate_from(
        || {
            source
                .read(timeout)
                .map_err(|e| Report::new(crate::error::map_source_error(e.as_ref())))
        },
        repeats,
    )
}

/// Calibrated total load for one frame: each corner minus its baseline,
/// summed into one scalar.
///
/// Pure and stateless. The sum runs in `i64` and saturates into `i32`;
/// raw magnitudes anywhere near that bound indicate a sensor fault rather
/// than a weight, so saturation is the documented overflow policy.
#[inline]
pub fn normalize(frame: &RawFrame, offsets: &CornerOffsets) -> i32 {
    let mut total: i64 = 0;
    for (raw, off) in frame.channels().into_iter().zip(offsets.as_array()) {
        total += i64::from(raw) - i64::from(off);
    }
    total.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
