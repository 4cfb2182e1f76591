//! Writing result frames as CSV.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;

/// Writes `frame` as CSV to `path`, or to stdout when `path` is `None`.
pub fn write_frame(frame: &mut DataFrame, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_csv(frame, &mut writer)
                .with_context(|| format!("failed to write {}", path.display()))?;
            writer.flush()?;
            tracing::info!(path = %path.display(), rows = frame.height(), "wrote CSV");
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write_csv(frame, &mut handle).context("failed to write CSV to stdout")?;
            handle.flush()?;
        }
    }
    Ok(())
}

fn write_csv<W: Write>(frame: &mut DataFrame, writer: &mut W) -> PolarsResult<()> {
    CsvWriter::new(writer).include_header(true).finish(frame)
}

/// Replaces column `name` of `frame` with `replacement`, keeping its position.
///
/// Several replacement columns (one-hot indicators) take the place of the
/// single source column in order.
pub fn replace_column(frame: &DataFrame, name: &str, replacement: DataFrame) -> Result<DataFrame> {
    let position = frame
        .get_column_index(name)
        .with_context(|| format!("column '{name}' not found"))?;
    let mut columns: Vec<Column> = Vec::with_capacity(frame.width() + replacement.width());
    columns.extend(frame.get_columns()[..position].iter().cloned());
    columns.extend(replacement.get_columns().iter().cloned());
    columns.extend(frame.get_columns()[position + 1..].iter().cloned());
    DataFrame::new(columns).context("failed to assemble output frame")
}
