//! Reindexing a time-indexed table onto a regular grid.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use polars::prelude::*;
use timepp_common::{parse_timestamp, timestamps_to_series};
use timepp_model::{Frequency, ModelError, Table};

use crate::error::{Result, TransformError};

/// Reindexes `table` onto the grid `start, start + freq, ..., <= end`.
///
/// Rows whose timestamp is on the grid are kept unchanged. Grid points with
/// no row become new rows holding zero in every non-index column (`0`,
/// `false` or `"0"` depending on the column type); date, datetime, duration
/// and time columns have no zero and get null instead. Rows off the grid
/// are dropped. The result is indexed by the grid with frequency `freq`,
/// keeping the index column's time zone.
pub fn fill_missing_time_steps(
    table: &Table,
    start: &str,
    end: &str,
    freq: Frequency,
) -> Result<Table> {
    let start = parse_bound("start", start)?;
    let end = parse_bound("end", end)?;
    fill_between(table, start, end, freq)
}

/// [`fill_missing_time_steps`] from the earliest to the latest index value.
pub fn auto_fill_missing_time_steps(table: &Table, freq: Frequency) -> Result<Table> {
    let stamps = table.index_timestamps()?;
    match (stamps.iter().min(), stamps.iter().max()) {
        (Some(start), Some(end)) => fill_between(table, *start, *end, freq),
        _ => {
            let index = table.index_column().ok_or(ModelError::MissingTimeIndex)?;
            Ok(table.clone().with_time_index(index, Some(freq))?)
        }
    }
}

fn parse_bound(bound: &'static str, value: &str) -> Result<NaiveDateTime> {
    parse_timestamp(value).ok_or_else(|| TransformError::InvalidBound {
        bound,
        value: value.to_string(),
    })
}

/// Grid reindex with already-parsed bounds.
pub fn fill_between(
    table: &Table,
    start: NaiveDateTime,
    end: NaiveDateTime,
    freq: Frequency,
) -> Result<Table> {
    let index_name = table
        .index_column()
        .ok_or(ModelError::MissingTimeIndex)?
        .to_string();
    if start > end {
        return Err(TransformError::EmptyRange {
            start: start.to_string(),
            end: end.to_string(),
        });
    }

    let stamps = table.index_timestamps()?;
    let mut rows: HashMap<NaiveDateTime, IdxSize> = HashMap::with_capacity(stamps.len());
    for (row, stamp) in stamps.iter().enumerate() {
        if rows.insert(*stamp, row as IdxSize).is_some() {
            return Err(TransformError::DuplicateTimestamp {
                value: stamp.to_string(),
            });
        }
    }

    let grid = freq.date_range(start, end);
    let take: IdxCa = grid.iter().map(|stamp| rows.get(stamp).copied()).collect();
    let present: BooleanChunked = grid.iter().map(|stamp| rows.contains_key(stamp)).collect();
    let kept = grid.iter().filter(|stamp| rows.contains_key(stamp)).count();

    let reindexed = table.frame().take(&take)?;
    let mut columns = Vec::with_capacity(reindexed.width());
    for column in reindexed.get_columns() {
        let name = column.name().clone();
        let series = column.as_materialized_series();
        if name.as_str() == index_name {
            columns.push(timestamps_to_series(name, &grid, series.dtype()).into_column());
            continue;
        }
        let filler = if series.dtype().is_temporal() {
            Series::full_null(name, grid.len(), series.dtype())
        } else {
            Series::new(name, vec![0i32; grid.len()]).cast(series.dtype())?
        };
        columns.push(series.zip_with(&present, &filler)?.into_column());
    }

    tracing::info!(
        index = %index_name,
        freq = %freq,
        grid = grid.len(),
        kept,
        added = grid.len() - kept,
        dropped = stamps.len() - kept,
        "filled missing time steps"
    );

    let frame = DataFrame::new(columns)?;
    Ok(Table::new(frame).with_time_index(&index_name, Some(freq))?)
}
