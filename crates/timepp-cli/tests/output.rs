//! Integration tests for CSV output of result frames.

use std::fs;

use polars::df;
use timepp_cli::output::{replace_column, write_frame};

#[test]
fn writes_header_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let mut frame = df! {
        "date" => &["2024-01-01", "2024-01-02"],
        "sales" => &[1i64, 0],
    }
    .unwrap();

    write_frame(&mut frame, Some(&path)).unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert_eq!(written, "date,sales\n2024-01-01,1\n2024-01-02,0\n");
}

#[test]
fn label_replacement_writes_codes_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("encoded.csv");
    let frame = df! {
        "weather" => &["rain", "sun"],
        "sales" => &[3i64, 4],
    }
    .unwrap();
    let codes = df! { "weather" => &[0i64, 1] }.unwrap();

    let mut result = replace_column(&frame, "weather", codes).unwrap();
    write_frame(&mut result, Some(&path)).unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert_eq!(written, "weather,sales\n0,3\n1,4\n");
}

#[test]
fn unwritable_path_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("out.csv");
    let mut frame = df! { "a" => &[1i64] }.unwrap();

    let err = write_frame(&mut frame, Some(&path)).unwrap_err();

    assert!(err.to_string().contains("failed to create"));
}
