//! Quick start: calibrate and weigh against a replayed frame sequence.
//!
//! Run with `cargo run -p boardweigh_core --example quick_start`. A real
//! deployment swaps `ReplayBoard` for a live `BoardSource` (see the
//! boardweigh_hardware crate).

use boardweigh_core::mocks::ReplayBoard;
use boardweigh_core::{
    CalibrationCfg, ConvergenceCfg, Measurement, SamplingMode, Timeouts, WeighSession,
};
use boardweigh_traits::{MonotonicClock, RawFrame};

fn main() -> Result<(), eyre::Report> {
    // Ten unloaded frames (small per-corner bias), then an 82.4 kg person
    // standing still: 8240 board units split across the four corners.
    let mut frames = vec![RawFrame::new(3, -2, 4, 1); 10];
    frames.push(RawFrame::new(2063, 2058, 2064, 2061));

    let mut session = WeighSession::builder()
        .with_source(ReplayBoard::repeating(frames))
        .with_calibration(CalibrationCfg { repeats: 10 })
        .with_convergence(ConvergenceCfg {
            window_size: 100,
            ..ConvergenceCfg::default()
        })
        .with_timeouts(Timeouts { sensor_ms: 50 })
        .with_mode(SamplingMode::Direct)
        .with_clock(Box::new(MonotonicClock::new()))
        .build()?;

    let offsets = session.calibrate()?;
    println!("zero-load offsets: {:?}", offsets.as_array());

    match session.weigh()? {
        Measurement::Converged(est) => {
            println!(
                "{:.2} kg +/- {:.2} kg",
                est.kilograms(),
                est.spread_kilograms()
            );
        }
        Measurement::Unsettled => println!("did not settle"),
    }
    Ok(())
}
