//! Background frame sampling.
//!
//! Spawns a thread that owns the `BoardSource`, forwards frames over a
//! bounded channel, and tracks the last-ok timestamp for the session's
//! stall watchdog. The board delivers frames at its own rate, so the
//! thread simply blocks in `read` between frames.
//!
//! Safety: each `FrameSampler` spawns exactly one thread that is shut down
//! when the sampler is dropped, preventing thread leaks.

use boardweigh_traits::clock::Clock;
use boardweigh_traits::{BoardSource, RawFrame};
use crossbeam_channel as xch;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

pub struct FrameSampler {
    rx: xch::Receiver<RawFrame>,
    last_ok: Arc<AtomicU64>,
    epoch: Instant,
    /// Shutdown flag for immediate response (atomic for lock-free check)
    shutdown: Arc<AtomicBool>,
    /// Join handle for graceful thread cleanup
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl FrameSampler {
    /// Event-driven sampler: `source.read(timeout)` blocks until the board
    /// delivers the next frame or the timeout expires; no pacing is added.
    pub fn spawn<S, C>(mut source: S, timeout: Duration, clock: C) -> Self
    where
        S: BoardSource + Send + 'static,
        C: Clock + Send + Sync + 'static,
    {
        let (tx, rx) = xch::bounded(1);
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let last_ok = Arc::new(AtomicU64::new(0));
        let last_ok_clone = last_ok.clone();
        let epoch = clock.now();

        let join_handle = std::thread::spawn(move || {
            loop {
                if shutdown_clone.load(Ordering::Relaxed) {
                    tracing::debug!("frame sampler received shutdown signal");
                    break;
                }

                match source.read(timeout) {
                    Ok(frame) => {
                        match tx.try_send(frame) {
                            Ok(()) => {}
                            // Consumer lagging: keep only the freshest frame.
                            Err(xch::TrySendError::Full(_)) => {}
                            Err(xch::TrySendError::Disconnected(_)) => {
                                tracing::debug!("frame consumer disconnected, exiting thread");
                                break;
                            }
                        }
                        let now = clock.ms_since(epoch);
                        last_ok_clone.store(now, Ordering::Relaxed);
                    }
                    Err(_) => {
                        // Timeout or transient error; the session watchdog decides.
                    }
                }
            }
            tracing::trace!("frame sampler thread exiting cleanly");
        });

        Self {
            rx,
            last_ok,
            epoch,
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    /// Latest frame delivered since the previous call, if any.
    pub fn latest(&self) -> Option<RawFrame> {
        self.rx.try_iter().last()
    }

    pub fn stalled_for(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_ok.load(Ordering::Relaxed))
    }

    /// Convenience helper: compute stall using this sampler's epoch and a
    /// real monotonic clock.
    pub fn stalled_for_now(&self) -> u64 {
        let now_ms = {
            let dur = Instant::now().saturating_duration_since(self.epoch);
            let ms = dur.as_millis();
            (ms.min(u128::from(u64::MAX))) as u64
        };
        now_ms.saturating_sub(self.last_ok.load(Ordering::Relaxed))
    }
}

impl Drop for FrameSampler {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);

        // The thread exits immediately if it is between reads, or after the
        // current read completes (up to the per-read timeout, worst case).
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("frame sampler thread joined successfully");
                }
                Err(e) => {
                    // Thread panicked; log but don't propagate (we're in Drop)
                    tracing::warn!(?e, "frame sampler thread panicked during shutdown");
                }
            }
        }
    }
}
