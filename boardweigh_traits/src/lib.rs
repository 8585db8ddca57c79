pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// One reading of the board's four load cells, in board units of 0.01 kg.
///
/// Corner order follows the sensor layout as seen from above, standing on
/// the board: top-left, top-right, bottom-right, bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawFrame {
    pub top_left: i32,
    pub top_right: i32,
    pub bottom_right: i32,
    pub bottom_left: i32,
}

impl RawFrame {
    pub const fn new(top_left: i32, top_right: i32, bottom_right: i32, bottom_left: i32) -> Self {
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    /// Corner values in fixed (tl, tr, br, bl) order.
    pub const fn channels(&self) -> [i32; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }
}

/// Blocking source of raw four-corner frames.
///
/// `read` blocks until the next frame is available or `timeout` expires.
/// No buffering or replay is assumed; each call yields the next frame the
/// underlying transport produces.
pub trait BoardSource {
    fn read(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<RawFrame, Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: BoardSource + ?Sized> BoardSource for Box<T> {
    fn read(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<RawFrame, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read(timeout)
    }
}
