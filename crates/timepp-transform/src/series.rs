//! Column access helpers shared by the transforms.

use polars::prelude::*;

use crate::error::{Result, TransformError};

pub(crate) fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Reads a numeric series as `f64`, keeping nulls as `None`.
pub(crate) fn float_values(series: &Series) -> Result<Vec<Option<f64>>> {
    if !is_numeric(series.dtype()) {
        return Err(TransformError::NonNumeric {
            column: series.name().to_string(),
            dtype: series.dtype().to_string(),
        });
    }
    let floats = series.cast(&DataType::Float64)?;
    Ok(floats.f64()?.into_iter().collect())
}

/// Reads a numeric series that must not contain nulls or NaN.
pub(crate) fn complete_values(series: &Series) -> Result<Vec<f64>> {
    let values = float_values(series)?;
    let missing = values
        .iter()
        .filter(|value| value.is_none_or(f64::is_nan))
        .count();
    if missing > 0 {
        return Err(TransformError::MissingValues {
            column: series.name().to_string(),
            count: missing,
        });
    }
    Ok(values.into_iter().flatten().collect())
}

/// Number of null or NaN cells in a column.
pub(crate) fn missing_count(column: &Column) -> Result<usize> {
    let series = column.as_materialized_series();
    let nan = match series.dtype() {
        DataType::Float64 => series
            .f64()?
            .into_iter()
            .filter(|value| value.is_some_and(f64::is_nan))
            .count(),
        DataType::Float32 => series
            .f32()?
            .into_iter()
            .filter(|value| value.is_some_and(f32::is_nan))
            .count(),
        _ => 0,
    };
    Ok(series.null_count() + nan)
}
