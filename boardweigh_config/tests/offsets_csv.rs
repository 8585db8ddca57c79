use std::fs;
use std::path::PathBuf;

use boardweigh_config::load_offsets_csv;
use rstest::rstest;
use tempfile::tempdir;

fn write_csv(dir: &tempfile::TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("offsets.csv");
    fs::write(&path, body).unwrap();
    path
}

#[rstest]
fn loads_all_four_corners() {
    let dir = tempdir().unwrap();
    let path = write_csv(&dir, "corner,offset\ntl,37\ntr,-12\nbr,8\nbl,-3\n");

    let offsets = load_offsets_csv(&path).expect("valid CSV loads");
    assert_eq!(offsets.top_left, 37);
    assert_eq!(offsets.top_right, -12);
    assert_eq!(offsets.bottom_right, 8);
    assert_eq!(offsets.bottom_left, -3);
}

#[rstest]
fn corner_order_does_not_matter() {
    let dir = tempdir().unwrap();
    let path = write_csv(&dir, "corner,offset\nbl,4\ntl,1\nbr,3\ntr,2\n");

    let offsets = load_offsets_csv(&path).expect("valid CSV loads");
    assert_eq!(
        (
            offsets.top_left,
            offsets.top_right,
            offsets.bottom_right,
            offsets.bottom_left
        ),
        (1, 2, 3, 4)
    );
}

#[rstest]
#[case("corner,value\ntl,1\n", "must have headers")]
#[case("corner,offset\ntl,1\ntr,2\nbr,3\n", "missing corners: bl")]
#[case("corner,offset\ntl,1\ntl,2\ntr,3\nbr,4\nbl,5\n", "duplicate corner")]
#[case("corner,offset\nmiddle,1\n", "unknown corner")]
#[case("corner,offset\ntl,notanumber\n", "invalid CSV row")]
fn malformed_csv_fails_loudly(#[case] body: &str, #[case] needle: &str) {
    let dir = tempdir().unwrap();
    let path = write_csv(&dir, body);

    let err = load_offsets_csv(&path).expect_err("must be rejected");
    assert!(
        format!("{err}").contains(needle),
        "error {err} does not mention {needle}"
    );
}

#[rstest]
fn missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nope.csv");
    assert!(load_offsets_csv(&path).is_err());
}
