//! Per-column missing-value reports.

use std::fmt;

use polars::prelude::*;
use serde::Serialize;
use timepp_model::Table;

use crate::error::Result;
use crate::series::missing_count;

/// Missing-value summary of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NanColumn {
    pub name: String,
    pub dtype: String,
    /// Null or NaN cells.
    pub missing: usize,
    /// `missing / n_rows`, or 0 for an empty table.
    pub nan_fraction: f64,
}

/// Missing-value summary of a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NanReport {
    pub n_rows: usize,
    pub columns: Vec<NanColumn>,
}

impl NanReport {
    pub fn column(&self, name: &str) -> Option<&NanColumn> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Columns with at least one missing value.
    pub fn incomplete_columns(&self) -> impl Iterator<Item = &NanColumn> {
        self.columns.iter().filter(|column| column.missing > 0)
    }
}

impl fmt::Display for NanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "dataframe n_rows {}", self.n_rows)?;
        let name_width = self
            .columns
            .iter()
            .map(|column| column.name.len())
            .chain(["col".len()])
            .max()
            .unwrap_or(0);
        let dtype_width = self
            .columns
            .iter()
            .map(|column| column.dtype.len())
            .chain(["dtype".len()])
            .max()
            .unwrap_or(0);
        write!(f, "{:<name_width$}  {:<dtype_width$}  nan_prc", "col", "dtype")?;
        for column in &self.columns {
            write!(
                f,
                "\n{:<name_width$}  {:<dtype_width$}  {:.4}",
                column.name, column.dtype, column.nan_fraction
            )?;
        }
        Ok(())
    }
}

/// Computes the missing-value report without side effects.
pub fn nan_report(table: &Table) -> Result<NanReport> {
    let n_rows = table.height();
    let columns = table
        .frame()
        .get_columns()
        .iter()
        .map(|column| {
            let missing = missing_count(column)?;
            let nan_fraction = if n_rows == 0 {
                0.0
            } else {
                missing as f64 / n_rows as f64
            };
            Ok(NanColumn {
                name: column.name().to_string(),
                dtype: dtype_label(column.dtype()),
                missing,
                nan_fraction,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(NanReport { n_rows, columns })
}

/// Computes the report and prints it to stdout.
pub fn check_nan(table: &Table) -> Result<NanReport> {
    let report = nan_report(table)?;
    tracing::debug!(
        rows = report.n_rows,
        incomplete = report.incomplete_columns().count(),
        "checked missing values"
    );
    println!("\n{report}\n");
    Ok(report)
}

fn dtype_label(dtype: &DataType) -> String {
    let label = match dtype {
        DataType::Boolean => "bool",
        DataType::UInt8 => "uint8",
        DataType::UInt16 => "uint16",
        DataType::UInt32 => "uint32",
        DataType::UInt64 => "uint64",
        DataType::Int8 => "int8",
        DataType::Int16 => "int16",
        DataType::Int32 => "int32",
        DataType::Int64 => "int64",
        DataType::Float32 => "float32",
        DataType::Float64 => "float64",
        DataType::String => "string",
        DataType::Date => "date",
        DataType::Datetime(_, _) => "datetime",
        DataType::Duration(_) => "duration",
        DataType::Null => "null",
        other => return other.to_string(),
    };
    label.to_string()
}
