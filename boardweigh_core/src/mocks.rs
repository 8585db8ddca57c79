//! Test and helper mocks for boardweigh_core

use boardweigh_traits::{BoardSource, RawFrame};

/// A board source that always errors on read; useful as a placeholder when
/// frames are supplied from elsewhere.
pub struct NoopBoard;

impl BoardSource for NoopBoard {
    fn read(
        &mut self,
        _timeout: std::time::Duration,
    ) -> Result<RawFrame, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("noop board")))
    }
}

/// Replays a fixed frame sequence. After the sequence is exhausted it
/// either repeats the last frame forever or errors, depending on how it
/// was constructed.
pub struct ReplayBoard {
    frames: Vec<RawFrame>,
    idx: usize,
    repeat_last: bool,
}

impl ReplayBoard {
    /// Repeat the last frame once the sequence runs out.
    pub fn repeating(frames: impl Into<Vec<RawFrame>>) -> Self {
        Self {
            frames: frames.into(),
            idx: 0,
            repeat_last: true,
        }
    }

    /// Error once the sequence runs out (a stream that ends early).
    pub fn finite(frames: impl Into<Vec<RawFrame>>) -> Self {
        Self {
            frames: frames.into(),
            idx: 0,
            repeat_last: false,
        }
    }
}

impl BoardSource for ReplayBoard {
    fn read(
        &mut self,
        _timeout: std::time::Duration,
    ) -> Result<RawFrame, Box<dyn std::error::Error + Send + Sync>> {
        if self.idx < self.frames.len() {
            let f = self.frames[self.idx];
            self.idx += 1;
            return Ok(f);
        }
        if self.repeat_last
            && let Some(last) = self.frames.last()
        {
            return Ok(*last);
        }
        Err(Box::new(std::io::Error::other("frame sequence exhausted")))
    }
}
