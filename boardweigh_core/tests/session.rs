use boardweigh_core::mocks::ReplayBoard;
use boardweigh_core::{
    CalibrationCfg, CenterMethod, ConvergenceCfg, CornerOffsets, Measurement, SamplingMode,
    Timeouts, WeighError, WeighSession,
};
use boardweigh_traits::RawFrame;

fn convergence(window_size: usize, max_iterations: u32) -> ConvergenceCfg {
    ConvergenceCfg {
        window_size,
        max_spread: 1.0,
        min_center: 100.0,
        max_iterations,
        center: CenterMethod::Mean,
    }
}

#[test]
fn calibrate_then_weigh_direct() {
    // Three unloaded frames with a constant per-corner bias of 5, then a
    // steady load of 50 per corner: normalized total is 4 * (55 - 5) = 200.
    let mut frames = vec![RawFrame::new(5, 5, 5, 5); 3];
    frames.push(RawFrame::new(55, 55, 55, 55));
    let board = ReplayBoard::repeating(frames);

    let mut session = WeighSession::builder()
        .with_source(board)
        .with_calibration(CalibrationCfg { repeats: 3 })
        .with_convergence(convergence(4, 5000))
        .with_timeouts(Timeouts { sensor_ms: 10 })
        .with_mode(SamplingMode::Direct)
        .build()
        .expect("build session");

    let offsets = session.calibrate().expect("calibration succeeds");
    assert_eq!(offsets, CornerOffsets::new([5, 5, 5, 5]));

    match session.weigh().expect("weigh succeeds") {
        Measurement::Converged(est) => {
            assert_eq!(est.center, 200.0);
            assert_eq!(est.spread, 0.0);
            assert_eq!(est.kilograms(), 2.0);
        }
        Measurement::Unsettled => panic!("steady load must settle"),
    }
}

#[test]
fn weigh_without_calibration_is_a_config_error() {
    let board = ReplayBoard::repeating([RawFrame::new(1, 1, 1, 1)]);
    let mut session = WeighSession::builder()
        .with_source(board)
        .with_mode(SamplingMode::Direct)
        .build()
        .expect("build session");

    let err = session.weigh().expect_err("offsets are required");
    assert!(matches!(
        err.downcast_ref::<WeighError>(),
        Some(WeighError::Config(_))
    ));
}

#[test]
fn persisted_offsets_skip_live_calibration() {
    let board = ReplayBoard::repeating([RawFrame::new(55, 55, 55, 55)]);
    let mut session = WeighSession::builder()
        .with_source(board)
        .with_convergence(convergence(4, 5000))
        .with_timeouts(Timeouts { sensor_ms: 10 })
        .with_mode(SamplingMode::Direct)
        .build()
        .expect("build session");

    assert!(session.offsets().is_none());
    session.set_offsets(CornerOffsets::new([5, 5, 5, 5]));

    match session.weigh().expect("weigh succeeds") {
        Measurement::Converged(est) => assert_eq!(est.center, 200.0),
        Measurement::Unsettled => panic!("steady load must settle"),
    }
}

#[test]
fn empty_board_gives_up_unsettled() {
    let board = ReplayBoard::repeating([RawFrame::new(0, 1, 0, -1)]);
    let mut session = WeighSession::builder()
        .with_source(board)
        .with_convergence(convergence(4, 30))
        .with_timeouts(Timeouts { sensor_ms: 10 })
        .with_mode(SamplingMode::Direct)
        .with_offsets(CornerOffsets::new([0, 0, 0, 0]))
        .build()
        .expect("build session");

    assert_eq!(session.weigh().expect("weigh runs"), Measurement::Unsettled);
}

#[test]
fn cancellation_aborts_calibration() {
    let board = ReplayBoard::repeating([RawFrame::new(0, 0, 0, 0)]);
    let mut session = WeighSession::builder()
        .with_source(board)
        .with_mode(SamplingMode::Direct)
        .with_cancel_check(|| true)
        .build()
        .expect("build session");

    let err = session.calibrate().expect_err("cancelled immediately");
    assert!(matches!(
        err.downcast_ref::<WeighError>(),
        Some(WeighError::Cancelled)
    ));
}

#[test]
fn source_fault_surfaces_during_weigh() {
    // Finite sequence: frames run out mid-measurement.
    let board = ReplayBoard::finite(vec![RawFrame::new(55, 55, 55, 55); 2]);
    let mut session = WeighSession::builder()
        .with_source(board)
        .with_convergence(convergence(4, 5000))
        .with_timeouts(Timeouts { sensor_ms: 10 })
        .with_mode(SamplingMode::Direct)
        .with_offsets(CornerOffsets::new([0, 0, 0, 0]))
        .build()
        .expect("build session");

    let err = session.weigh().expect_err("source runs dry");
    assert!(matches!(
        err.downcast_ref::<WeighError>(),
        Some(WeighError::Source(_))
    ));
}

// The event feed keeps only the freshest frame, so these tests use steady
// boards to stay deterministic regardless of which frames get skipped.

#[test]
fn event_mode_calibrates_through_the_sampler() {
    let board = ReplayBoard::repeating([RawFrame::new(5, 5, 5, 5)]);
    let mut session = WeighSession::builder()
        .with_source(board)
        .with_calibration(CalibrationCfg { repeats: 3 })
        .with_timeouts(Timeouts { sensor_ms: 20 })
        .with_mode(SamplingMode::Event)
        .build()
        .expect("build session");

    let offsets = session.calibrate().expect("calibration succeeds");
    assert_eq!(offsets, CornerOffsets::new([5, 5, 5, 5]));
}

#[test]
fn event_mode_weighs_through_the_sampler() {
    let board = ReplayBoard::repeating([RawFrame::new(50, 50, 50, 50)]);
    let mut session = WeighSession::builder()
        .with_source(board)
        .with_convergence(convergence(4, 5000))
        .with_timeouts(Timeouts { sensor_ms: 20 })
        .with_mode(SamplingMode::Event)
        .with_offsets(CornerOffsets::new([0, 0, 0, 0]))
        .build()
        .expect("build session");

    match session.weigh().expect("weigh succeeds") {
        Measurement::Converged(est) => assert_eq!(est.center, 200.0),
        Measurement::Unsettled => panic!("steady load must settle"),
    }
}

#[test]
fn builder_rejects_invalid_convergence() {
    let board = ReplayBoard::repeating([RawFrame::new(0, 0, 0, 0)]);
    let err = WeighSession::builder()
        .with_source(board)
        .with_convergence(ConvergenceCfg {
            window_size: 0,
            ..ConvergenceCfg::default()
        })
        .build()
        .expect_err("zero window must be rejected");
    assert!(format!("{err}").contains("window_size"));
}

#[test]
fn try_build_without_source_reports_missing_source() {
    let err = WeighSession::builder()
        .try_build()
        .expect_err("source is mandatory");
    assert!(format!("{err}").contains("missing board source"));
}
