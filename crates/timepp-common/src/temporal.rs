//! Timestamp parsing and conversion between Polars columns and chrono values.
//!
//! Index columns arrive as `Datetime`, `Date` or plain strings depending on
//! how the CSV was read; everything downstream works on `NaiveDateTime`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta};
use polars::prelude::*;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

/// Parses a timestamp string.
///
/// Accepts ISO 8601 dates and datetimes (with `T` or space separator, optional
/// fractional seconds) and RFC 3339 strings with an offset, which are
/// converted to UTC. Returns `None` for anything else.
///
/// ```
/// use timepp_common::parse_timestamp;
///
/// assert!(parse_timestamp("2024-03-01").is_some());
/// assert!(parse_timestamp("2024-03-01 12:30:00").is_some());
/// assert!(parse_timestamp("March 1st").is_none());
/// ```
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(ts);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|ts| ts.naive_utc())
}

/// Reads a column as timestamps.
///
/// Nulls and unparseable strings become `None`. Columns that are neither
/// temporal nor string fail with `InvalidOperation`.
pub fn column_timestamps(column: &Column) -> PolarsResult<Vec<Option<NaiveDateTime>>> {
    let series = column.as_materialized_series();
    match series.dtype() {
        DataType::Datetime(unit, _) => {
            let unit = *unit;
            let physical = series.cast(&DataType::Int64)?;
            Ok(physical
                .i64()?
                .into_iter()
                .map(|value| value.and_then(|v| from_epoch(v, unit)))
                .collect())
        }
        DataType::Date => {
            let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
            let days = series.cast(&DataType::Int32)?;
            Ok(days
                .i32()?
                .into_iter()
                .map(|value| {
                    let days = TimeDelta::try_days(i64::from(value?))?;
                    epoch?.checked_add_signed(days)
                })
                .collect())
        }
        DataType::String => Ok(series
            .str()?
            .into_iter()
            .map(|value| value.and_then(parse_timestamp))
            .collect()),
        other => Err(PolarsError::InvalidOperation(
            format!(
                "column '{}' has type {other}; expected a date, datetime or string column",
                series.name()
            )
            .into(),
        )),
    }
}

fn from_epoch(value: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let ts = match unit {
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(value)?,
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(value)?,
        TimeUnit::Nanoseconds => DateTime::from_timestamp_nanos(value),
    };
    Some(ts.naive_utc())
}

/// Builds a microsecond `Datetime` series from UTC-based timestamps.
///
/// When `like` is a `Datetime` with a time zone, the result carries that
/// zone, so a zoned index stays zoned after it is rebuilt.
pub fn timestamps_to_series(name: PlSmallStr, values: &[NaiveDateTime], like: &DataType) -> Series {
    let time_zone = match like {
        DataType::Datetime(_, time_zone) => time_zone.clone(),
        _ => None,
    };
    let micros: Vec<i64> = values
        .iter()
        .map(|ts| ts.and_utc().timestamp_micros())
        .collect();
    Int64Chunked::from_vec(name, micros)
        .into_datetime(TimeUnit::Microseconds, time_zone)
        .into_series()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn parses_common_layouts() {
        assert_eq!(parse_timestamp("2024-01-02"), Some(ts(2024, 1, 2, 0)));
        assert_eq!(parse_timestamp("2024-01-02T05:00:00"), Some(ts(2024, 1, 2, 5)));
        assert_eq!(parse_timestamp("2024-01-02 05:00"), Some(ts(2024, 1, 2, 5)));
        assert_eq!(
            parse_timestamp("2024-01-02T07:00:00+02:00"),
            Some(ts(2024, 1, 2, 5))
        );
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn string_column_round_trips_through_datetime_series() {
        let column = Column::new("date".into(), &["2024-01-01", "bad", "2024-01-03"]);
        let values = column_timestamps(&column).unwrap();
        assert_eq!(values, vec![Some(ts(2024, 1, 1, 0)), None, Some(ts(2024, 1, 3, 0))]);

        let grid = vec![ts(2024, 1, 1, 0), ts(2024, 1, 1, 6)];
        let series = timestamps_to_series("date".into(), &grid, &DataType::String);
        assert_eq!(series.dtype(), &DataType::Datetime(TimeUnit::Microseconds, None));
        let back = column_timestamps(&series.into_column()).unwrap();
        assert_eq!(back, vec![Some(grid[0]), Some(grid[1])]);
    }

    #[test]
    fn rebuilt_series_keeps_time_zone() {
        let zoned = DataType::Datetime(TimeUnit::Milliseconds, Some(TimeZone::UTC));
        let grid = vec![ts(2024, 3, 1, 0), ts(2024, 3, 2, 0)];

        let series = timestamps_to_series("date".into(), &grid, &zoned);

        assert_eq!(
            series.dtype(),
            &DataType::Datetime(TimeUnit::Microseconds, Some(TimeZone::UTC))
        );
        let back = column_timestamps(&series.into_column()).unwrap();
        assert_eq!(back, vec![Some(grid[0]), Some(grid[1])]);
    }

    #[test]
    fn numeric_column_is_rejected() {
        let column = Column::new("x".into(), &[1i64, 2, 3]);
        assert!(column_timestamps(&column).is_err());
    }
}
