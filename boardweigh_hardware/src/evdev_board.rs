//! Balance board over the kernel `hid-wiimote` input device.
//!
//! The kernel exposes the four load cells as absolute axes on an evdev
//! node: ABS_HAT1X = top left, ABS_HAT0X = top right, ABS_HAT0Y = bottom
//! right, ABS_HAT1Y = bottom left, each in units of 0.01 kg. A frame is
//! complete at SYN_REPORT.

use std::path::Path;
use std::time::{Duration, Instant};

use evdev::{AbsoluteAxisType, Device, InputEventKind, Synchronization};
use tracing::{debug, info, trace};

use crate::error::{HwError, Result};
use boardweigh_traits::{BoardSource, RawFrame};

/// Device-name fragment the kernel driver reports for the board.
const BOARD_NAME_HINT: &str = "Balance Board";

pub struct EvdevBoard {
    device: Device,
    frame: RawFrame,
}

impl EvdevBoard {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let device = Device::open(path.as_ref())?;
        debug!(path = %path.as_ref().display(), name = device.name().unwrap_or("?"), "opened board device");
        Ok(Self {
            device,
            frame: RawFrame::default(),
        })
    }

    /// Scan /dev/input for the first connected balance board.
    pub fn discover() -> Result<Self> {
        for (path, device) in evdev::enumerate() {
            if device.name().is_some_and(|n| n.contains(BOARD_NAME_HINT)) {
                info!(path = %path.display(), "found balance board");
                return Ok(Self {
                    device,
                    frame: RawFrame::default(),
                });
            }
        }
        Err(HwError::NotFound)
    }
}

impl BoardSource for EvdevBoard {
    /// Block until the next complete four-corner frame.
    ///
    /// The deadline is checked between event batches; a board that stops
    /// mid-stream is additionally bounded by the session's stall watchdog.
    fn read(
        &mut self,
        timeout: Duration,
    ) -> std::result::Result<RawFrame, Box<dyn std::error::Error + Send + Sync>> {
        let deadline = Instant::now() + timeout;

        loop {
            let events = self.device.fetch_events().map_err(HwError::Io)?;
            for ev in events {
                match ev.kind() {
                    InputEventKind::AbsAxis(AbsoluteAxisType::ABS_HAT1X) => {
                        self.frame.top_left = ev.value();
                    }
                    InputEventKind::AbsAxis(AbsoluteAxisType::ABS_HAT0X) => {
                        self.frame.top_right = ev.value();
                    }
                    InputEventKind::AbsAxis(AbsoluteAxisType::ABS_HAT0Y) => {
                        self.frame.bottom_right = ev.value();
                    }
                    InputEventKind::AbsAxis(AbsoluteAxisType::ABS_HAT1Y) => {
                        self.frame.bottom_left = ev.value();
                    }
                    InputEventKind::Synchronization(Synchronization::SYN_REPORT) => {
                        trace!(frame = ?self.frame, "board frame");
                        return Ok(self.frame);
                    }
                    _ => {}
                }
            }
            if Instant::now() >= deadline {
                return Err(Box::new(HwError::Timeout));
            }
        }
    }
}
