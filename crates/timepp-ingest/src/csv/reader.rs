//! CSV file reading into tables.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use polars::prelude::*;
use timepp_model::Table;

use crate::error::{IngestError, Result};

use super::options::CsvOptions;

/// Maximum file size for CSV loading (500 MB default).
pub const MAX_CSV_FILE_SIZE: u64 = 500 * 1024 * 1024;

fn check_file_size(path: &Path, max_size: u64) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| IngestError::open(path, e))?;

    if metadata.len() > max_size {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size,
        });
    }

    Ok(())
}

/// Rejects files starting with a UTF-16 byte order mark.
fn validate_encoding(path: &Path) -> Result<()> {
    let mut file = File::open(path).map_err(|e| IngestError::open(path, e))?;

    let mut buffer = [0u8; 2];
    let bytes_read = file.read(&mut buffer).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    if bytes_read == 2 {
        let encoding = match buffer {
            [0xFF, 0xFE] => Some("UTF-16 LE"),
            [0xFE, 0xFF] => Some("UTF-16 BE"),
            _ => None,
        };
        if let Some(encoding) = encoding {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding,
            });
        }
    }

    Ok(())
}

/// Reads a CSV file into a [`Table`].
///
/// Parser options are forwarded to Polars. When `options.index_column` is
/// set, that column becomes the time index; its frequency is taken from
/// `options.freq` or, if `options.infer_frequency` is on, detected from the
/// index values.
pub fn read_csv_table(path: &Path, options: &CsvOptions) -> Result<Table> {
    check_file_size(path, options.max_file_size)?;
    validate_encoding(path)?;

    let parse_error = |e: PolarsError| IngestError::CsvParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let df = build_read_options(options)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(parse_error)?
        .finish()
        .map_err(parse_error)?;

    if df.height() == 0 {
        tracing::warn!(path = %path.display(), "CSV file has no data rows");
    }
    tracing::debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "loaded CSV"
    );

    let mut table = Table::new(df);
    if let Some(index) = &options.index_column {
        table = table
            .with_time_index(index, options.freq)
            .map_err(|source| IngestError::Table {
                path: path.to_path_buf(),
                source,
            })?;
        if options.freq.is_none() && options.infer_frequency {
            table = table.with_inferred_frequency();
            tracing::debug!(
                index = %index,
                freq = ?table.freq().map(|f| f.to_string()),
                "inferred index frequency"
            );
        }
    }
    Ok(table)
}

fn build_read_options(options: &CsvOptions) -> CsvReadOptions {
    let null_values = (!options.null_values.is_empty()).then(|| {
        NullValues::AllColumns(
            options
                .null_values
                .iter()
                .map(|value| PlSmallStr::from(value.as_str()))
                .collect(),
        )
    });
    let delimiter = options.delimiter;
    let try_parse_dates = options.try_parse_dates;

    let mut read_options = CsvReadOptions::default()
        .with_has_header(options.has_header)
        .with_skip_rows(options.skip_rows)
        .with_infer_schema_length(options.infer_schema_length)
        .map_parse_options(|parse| {
            parse
                .with_separator(delimiter)
                .with_try_parse_dates(try_parse_dates)
                .with_null_values(null_values.clone())
        });

    if !options.dtypes.is_empty() {
        let schema: Schema = options
            .dtypes
            .iter()
            .map(|(name, dtype)| (PlSmallStr::from(name.as_str()), dtype.clone()))
            .collect();
        read_options = read_options.with_schema_overwrite(Some(Arc::new(schema)));
    }
    read_options
}
