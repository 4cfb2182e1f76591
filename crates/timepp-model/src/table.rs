//! The working dataset: a DataFrame with an optional time index.

use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use timepp_common::{any_to_string, column_timestamps};

use crate::error::{ModelError, Result};
use crate::frequency::Frequency;

/// Designates a timestamp column as the row index of a [`Table`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeIndex {
    /// Name of the timestamp column.
    pub column: String,
    /// Fixed spacing of the index, when known.
    pub freq: Option<Frequency>,
}

/// A 2D labeled dataset.
///
/// Columns live in a Polars `DataFrame`. Rows share a common index which is
/// either positional or, once [`Table::with_time_index`] has been called, the
/// values of a timestamp column.
#[derive(Debug, Clone, Default)]
pub struct Table {
    frame: DataFrame,
    index: Option<TimeIndex>,
}

impl Table {
    /// Wraps a DataFrame with a positional index.
    pub fn new(frame: DataFrame) -> Self {
        Self { frame, index: None }
    }

    /// Designates `column` as the time index.
    ///
    /// The column must exist; its values are only interpreted as timestamps
    /// when an operation needs them.
    pub fn with_time_index(mut self, column: &str, freq: Option<Frequency>) -> Result<Self> {
        if !self.has_column(column) {
            return Err(ModelError::ColumnNotFound {
                column: column.to_string(),
            });
        }
        self.index = Some(TimeIndex {
            column: column.to_string(),
            freq,
        });
        Ok(self)
    }

    /// Fills in the index frequency from the index values when it is unset.
    ///
    /// Leaves the table unchanged when there is no index or no regular spacing.
    pub fn with_inferred_frequency(mut self) -> Self {
        if self.freq().is_none() {
            let inferred = self.infer_frequency();
            if let Some(index) = self.index.as_mut() {
                index.freq = inferred;
            }
        }
        self
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    pub fn index(&self) -> Option<&TimeIndex> {
        self.index.as_ref()
    }

    pub fn index_column(&self) -> Option<&str> {
        self.index.as_ref().map(|index| index.column.as_str())
    }

    /// Fixed frequency of the time index, if known.
    pub fn freq(&self) -> Option<Frequency> {
        self.index.as_ref().and_then(|index| index.freq)
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.frame
            .column(name)
            .map_err(|_| ModelError::ColumnNotFound {
                column: name.to_string(),
            })
    }

    /// Replaces the frame while keeping the index designation.
    ///
    /// The caller guarantees that the index column is still present.
    pub fn with_frame(&self, frame: DataFrame) -> Self {
        Self {
            frame,
            index: self.index.clone(),
        }
    }

    /// Index values as timestamps, in row order.
    ///
    /// Fails when the table has no time index or when any index value is null
    /// or not a timestamp.
    pub fn index_timestamps(&self) -> Result<Vec<NaiveDateTime>> {
        let name = self.index_column().ok_or(ModelError::MissingTimeIndex)?;
        let column = self.column(name)?;
        let values = column_timestamps(column)?;
        values
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                value.ok_or_else(|| ModelError::InvalidTimestamp {
                    column: name.to_string(),
                    value: column.get(row).map(any_to_string).unwrap_or_default(),
                })
            })
            .collect()
    }

    /// Detects a regular spacing of the time index.
    ///
    /// Needs at least three strictly increasing timestamps. Fixed steps map
    /// to the largest whole unit (`14 days` is `2W`). Timestamps that all fall
    /// on the last day of a month, a constant number of months apart, map to
    /// end-anchored frequencies (`ME`, `QE`, `YE`); ones that keep the same
    /// day-of-month map to start-anchored ones (`MS`, `QS`, `YS`).
    pub fn infer_frequency(&self) -> Option<Frequency> {
        let values = self.index_timestamps().ok()?;
        if values.len() < 3 {
            return None;
        }
        let step = values[1] - values[0];
        if step > TimeDelta::zero() && values.windows(2).all(|w| w[1] - w[0] == step) {
            return Frequency::from_step(step);
        }
        let months = month_distance(values[0], values[1])?;
        let regular = values
            .windows(2)
            .all(|w| month_distance(w[0], w[1]) == Some(months) && w[0].time() == w[1].time());
        if !regular {
            return None;
        }
        if values.iter().all(|value| is_month_end(value.date())) {
            Frequency::from_month_ends(months, values[0].month())
        } else if values.iter().all(|value| value.day() == values[0].day()) {
            Frequency::from_months(months)
        } else {
            None
        }
    }
}

fn is_month_end(date: NaiveDate) -> bool {
    date.succ_opt().is_none_or(|next| next.month() != date.month())
}

fn month_distance(from: NaiveDateTime, to: NaiveDateTime) -> Option<u32> {
    let months = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    u32::try_from(months).ok().filter(|m| *m > 0)
}

impl From<DataFrame> for Table {
    fn from(frame: DataFrame) -> Self {
        Table::new(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::FrequencyUnit;

    fn dated(dates: &[&str]) -> Table {
        let n = dates.len() as i64;
        let frame = df! {
            "date" => dates,
            "value" => (0..n).collect::<Vec<i64>>(),
        }
        .unwrap();
        Table::new(frame).with_time_index("date", None).unwrap()
    }

    #[test]
    fn time_index_requires_existing_column() {
        let frame = df! { "value" => &[1, 2, 3] }.unwrap();
        let err = Table::new(frame).with_time_index("date", None).unwrap_err();
        assert!(matches!(err, ModelError::ColumnNotFound { .. }));
    }

    #[test]
    fn infers_daily_frequency() {
        let table = dated(&["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert_eq!(table.infer_frequency(), Some(Frequency::DAILY));
        assert_eq!(table.with_inferred_frequency().freq(), Some(Frequency::DAILY));
    }

    #[test]
    fn infers_month_start_frequency() {
        let table = dated(&["2024-01-01", "2024-02-01", "2024-03-01", "2024-04-01"]);
        assert_eq!(table.infer_frequency(), Some(Frequency::MONTHLY));
    }

    #[test]
    fn infers_month_end_frequency() {
        let table = dated(&["2024-01-31", "2024-02-29", "2024-03-31", "2024-04-30"]);
        assert_eq!(table.infer_frequency(), Some(Frequency::MONTH_END));

        let quarters = dated(&["2023-12-31", "2024-03-31", "2024-06-30"]);
        assert_eq!(quarters.infer_frequency(), Some(Frequency::QUARTER_END));
    }

    #[test]
    fn infers_multi_hour_frequency() {
        let table = dated(&["2024-01-01 00:00", "2024-01-01 06:00", "2024-01-01 12:00"]);
        let freq = table.infer_frequency().unwrap();
        assert_eq!(freq.unit(), FrequencyUnit::Hour);
        assert_eq!(freq.multiple(), 6);
    }

    #[test]
    fn irregular_index_has_no_frequency() {
        let table = dated(&["2024-01-01", "2024-01-02", "2024-01-05"]);
        assert_eq!(table.infer_frequency(), None);
    }

    #[test]
    fn invalid_index_value_is_reported() {
        let table = dated(&["2024-01-01", "not a date"]);
        let err = table.index_timestamps().unwrap_err();
        assert!(err.to_string().contains("not a date"));
    }
}
