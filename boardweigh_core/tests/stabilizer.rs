use boardweigh_core::{
    CenterMethod, ConvergenceCfg, Estimate, Measurement, StabilizeStatus, Stabilizer, stabilize,
};

fn cfg(window_size: usize, max_spread: f64, min_center: f64, max_iterations: u32) -> ConvergenceCfg {
    ConvergenceCfg {
        window_size,
        max_spread,
        min_center,
        max_iterations,
        center: CenterMethod::Mean,
    }
}

#[test]
fn constant_stream_converges_exactly() {
    // A constant V > min_center settles the moment the window fills, with
    // center == V and spread == 0.
    let mut stab = Stabilizer::new(cfg(10, 5.0, 100.0, 5000)).expect("valid cfg");
    for _ in 0..9 {
        assert_eq!(stab.step(200), StabilizeStatus::Sampling);
    }
    match stab.step(200) {
        StabilizeStatus::Converged(Estimate { center, spread }) => {
            assert_eq!(center, 200.0);
            assert_eq!(spread, 0.0);
        }
        other => panic!("expected convergence on the 10th sample, got {other:?}"),
    }
}

#[test]
fn step_on_scenario_converges_once_window_is_clean() {
    // [10,10,10,200,200,200,200,200]: no convergence through sample six
    // (window not full, then spread too high), convergence with (200, 0)
    // once five consecutive 200s occupy the whole window.
    let mut stab = Stabilizer::new(cfg(5, 2.0, 50.0, 5000)).expect("valid cfg");
    let samples = [10, 10, 10, 200, 200, 200, 200];
    for (i, s) in samples.into_iter().enumerate() {
        assert_eq!(
            stab.step(s),
            StabilizeStatus::Sampling,
            "sample {} should not converge",
            i + 1
        );
    }
    match stab.step(200) {
        StabilizeStatus::Converged(Estimate { center, spread }) => {
            assert_eq!(center, 200.0);
            assert_eq!(spread, 0.0);
        }
        other => panic!("expected convergence on the 8th sample, got {other:?}"),
    }
}

#[test]
fn low_signal_gives_up_after_cap_plus_one() {
    // A stream that never exceeds min_center returns the bounded failure
    // after exactly max_iterations + 1 evaluated samples.
    let max_iterations = 50;
    let mut stab = Stabilizer::new(cfg(5, 30.0, 100.0, max_iterations)).expect("valid cfg");
    for i in 0..max_iterations {
        assert_eq!(
            stab.step(50),
            StabilizeStatus::Sampling,
            "gave up early at sample {}",
            i + 1
        );
    }
    assert_eq!(stab.step(50), StabilizeStatus::Unsettled);
    assert_eq!(stab.iterations(), max_iterations + 1);
}

#[test]
fn spread_must_drop_below_threshold() {
    // Alternating values keep the spread high forever.
    let mut stab = Stabilizer::new(cfg(4, 2.0, 100.0, 20)).expect("valid cfg");
    let mut last = StabilizeStatus::Sampling;
    let mut toggle = false;
    for _ in 0..=20 {
        toggle = !toggle;
        last = stab.step(if toggle { 150 } else { 450 });
        if last != StabilizeStatus::Sampling {
            break;
        }
    }
    assert_eq!(last, StabilizeStatus::Unsettled);
}

#[test]
fn median_center_ignores_a_single_spike() {
    let cfg = ConvergenceCfg {
        window_size: 5,
        max_spread: 1e6,
        min_center: 100.0,
        max_iterations: 100,
        center: CenterMethod::Median,
    };
    let mut stab = Stabilizer::new(cfg).expect("valid cfg");
    for s in [200, 200, 9000, 200] {
        assert_eq!(stab.step(s), StabilizeStatus::Sampling);
    }
    match stab.step(200) {
        StabilizeStatus::Converged(est) => assert_eq!(est.center, 200.0),
        other => panic!("expected convergence, got {other:?}"),
    }
}

#[test]
fn reset_starts_a_fresh_attempt() {
    let mut stab = Stabilizer::new(cfg(3, 5.0, 100.0, 10)).expect("valid cfg");
    for _ in 0..3 {
        stab.step(400);
    }
    stab.reset();
    assert_eq!(stab.iterations(), 0);
    // After reset the window must refill before convergence.
    assert_eq!(stab.step(400), StabilizeStatus::Sampling);
}

#[test]
fn stabilize_drives_an_iterator_to_convergence() {
    let samples = std::iter::repeat_n(300, 50);
    let m = stabilize(samples, cfg(10, 5.0, 100.0, 5000)).expect("valid cfg");
    let est = m.estimate().expect("constant stream must converge");
    assert_eq!(est.center, 300.0);
    assert_eq!(est.kilograms(), 3.0);
}

#[test]
fn stabilize_treats_early_stream_end_as_unsettled() {
    let m = stabilize([200, 200, 200], cfg(10, 5.0, 100.0, 5000)).expect("valid cfg");
    assert_eq!(m, Measurement::Unsettled);
    assert_eq!(m.into_pair(), (0.0, 0.0));
}
