use boardweigh_config::{CenterMode, Config, RunMode, load_toml};
use rstest::rstest;

#[test]
fn defaults_are_valid() {
    let cfg = Config::default();
    cfg.validate().expect("defaults must validate");
}

#[test]
fn full_document_parses() {
    let cfg = load_toml(
        r#"
[board]
device = "/dev/input/event16"

[calibration]
repeats = 10

[convergence]
window_size = 600
max_spread = 30.0
min_center = 100.0
max_iterations = 5000
center = "median"

[timeouts]
sample_ms = 150

[logging]
file = "var/boardweigh.log"
level = "debug"
rotation = "daily"

[runner]
mode = "direct"

[offsets]
top_left = 37
top_right = -12
bottom_right = 8
bottom_left = -3
"#,
    )
    .expect("parse full config");
    cfg.validate().expect("full config validates");

    assert_eq!(cfg.board.device.as_deref(), Some("/dev/input/event16"));
    assert!(matches!(cfg.convergence.center, CenterMode::Median));
    assert!(matches!(cfg.runner.mode, RunMode::Direct));
    let offsets = cfg.offsets.expect("offsets present");
    assert_eq!(offsets.top_left, 37);
    assert_eq!(offsets.bottom_left, -3);
}

#[test]
fn sensor_ms_alias_is_accepted() {
    let cfg = load_toml("[timeouts]\nsensor_ms = 75\n").expect("alias parses");
    assert_eq!(cfg.timeouts.sample_ms, 75);
}

#[test]
fn empty_document_falls_back_to_defaults() {
    let cfg = load_toml("").expect("empty config parses");
    assert_eq!(cfg.convergence.window_size, 600);
    assert_eq!(cfg.calibration.repeats, 10);
    assert!(matches!(cfg.runner.mode, RunMode::Event));
}

#[rstest]
#[case("[calibration]\nrepeats = 0\n", "calibration.repeats")]
#[case("[convergence]\nwindow_size = 0\n", "window_size")]
#[case("[convergence]\nmax_iterations = 0\n", "max_iterations")]
#[case("[convergence]\nmax_spread = -1.0\n", "max_spread")]
#[case("[timeouts]\nsample_ms = 0\n", "sample_ms")]
#[case("[logging]\nrotation = \"weekly\"\n", "rotation")]
#[case(
    "[convergence]\nwindow_size = 600\nmax_iterations = 10\n",
    "window can never fill"
)]
fn invalid_values_are_rejected(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("syntactically valid");
    let err = cfg.validate().expect_err("must be rejected");
    assert!(
        format!("{err}").contains(needle),
        "error {err} does not mention {needle}"
    );
}

#[test]
fn unknown_center_mode_fails_to_parse() {
    assert!(load_toml("[convergence]\ncenter = \"mode\"\n").is_err());
}
