//! Integration tests for loading CSV files into tables.

use std::io::Write;
use std::path::Path;

use polars::prelude::DataType;
use tempfile::NamedTempFile;
use timepp_ingest::{CsvOptions, Dataset, IngestError, read_csv_table};
use timepp_model::{ErrorKind, Frequency, Table};

fn write_csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file
}

#[test]
fn loads_time_index_and_infers_daily_frequency() {
    let file = write_csv("date,sales\n2024-01-01,10\n2024-01-02,12\n2024-01-03,9\n");
    let options = CsvOptions::default().with_index("date", None);

    let table = read_csv_table(file.path(), &options).unwrap();

    assert_eq!(table.index_column(), Some("date"));
    assert_eq!(table.freq(), Some(Frequency::DAILY));
    assert_eq!(table.index_timestamps().unwrap().len(), 3);
}

#[test]
fn explicit_frequency_wins_over_inference() {
    let file = write_csv("date,sales\n2024-01-01,10\n2024-01-02,12\n2024-01-03,9\n");
    let options = CsvOptions::default().with_index("date", Some(Frequency::WEEKLY));

    let table = read_csv_table(file.path(), &options).unwrap();

    assert_eq!(table.freq(), Some(Frequency::WEEKLY));
}

#[test]
fn inference_can_be_disabled() {
    let file = write_csv("date,sales\n2024-01-01,10\n2024-01-02,12\n2024-01-03,9\n");
    let options = CsvOptions::default()
        .with_index("date", None)
        .with_infer_frequency(false);

    let table = read_csv_table(file.path(), &options).unwrap();

    assert_eq!(table.freq(), None);
}

#[test]
fn missing_index_column_is_config_error() {
    let file = write_csv("day,sales\n2024-01-01,10\n");
    let options = CsvOptions::default().with_index("date", None);

    let err = read_csv_table(file.path(), &options).unwrap_err();

    assert!(matches!(err, IngestError::Table { .. }));
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn missing_file_is_io_error() {
    let err = read_csv_table(Path::new("/nonexistent/sales.csv"), &CsvOptions::default())
        .unwrap_err();

    assert!(matches!(err, IngestError::FileNotFound { .. }));
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn malformed_content_is_parse_error() {
    let file = write_csv("count\n1\nabc\n");
    let options = CsvOptions::default().with_dtype("count", DataType::Int64);

    let err = read_csv_table(file.path(), &options).unwrap_err();

    assert!(matches!(err, IngestError::CsvParse { .. }));
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[test]
fn dataset_wraps_in_memory_table() {
    let frame = polars::df! { "x" => &[1.0, 2.0] }.unwrap();
    let dataset = Dataset::from_table(Table::new(frame));

    assert_eq!(dataset.table().height(), 2);
    assert_eq!(dataset.into_table().column_names(), vec!["x"]);
}

#[test]
fn dataset_from_csv_matches_reader() {
    let file = write_csv("a,b\n1,x\n2,y\n");
    let dataset = Dataset::from_csv(file.path(), &CsvOptions::default()).unwrap();

    assert_eq!(dataset.table().width(), 2);
    assert_eq!(dataset.table().height(), 2);
}
