//! Z-score normalization of numeric columns.

use std::path::Path;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use timepp_model::Table;

use crate::error::{Result, TransformError};
use crate::persist::{load_json, save_json};
use crate::series::float_values;

/// Learned scaling parameters: mean and sample standard deviation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizerParams {
    pub mean: f64,
    pub std: f64,
}

impl NormalizerParams {
    /// Learns mean and sample standard deviation (ddof 1), skipping nulls and
    /// NaN. Fails when the deviation is zero or undefined.
    pub fn fit(series: &Series) -> Result<Self> {
        let values: Vec<f64> = float_values(series)?
            .into_iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .collect();
        let zero_variance = || TransformError::ZeroVariance {
            column: series.name().to_string(),
        };
        if values.len() < 2 {
            return Err(zero_variance());
        }
        let count = values.len() as f64;
        let mean = values.iter().sum::<f64>() / count;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1.0);
        let std = variance.sqrt();
        if std == 0.0 || !std.is_finite() {
            return Err(zero_variance());
        }
        Ok(Self { mean, std })
    }

    /// `(x - mean) / std`, keeping nulls.
    pub fn transform(&self, series: &Series) -> Result<Series> {
        self.map(series, |x| (x - self.mean) / self.std)
    }

    /// `x * std + mean`, keeping nulls.
    pub fn inverse_transform(&self, series: &Series) -> Result<Series> {
        self.map(series, |x| x * self.std + self.mean)
    }

    fn map(&self, series: &Series, f: impl Fn(f64) -> f64) -> Result<Series> {
        let scaled: Float64Chunked = float_values(series)?
            .into_iter()
            .map(|value| value.map(&f))
            .collect();
        Ok(scaled.with_name(series.name().clone()).into_series())
    }
}

/// Scales table columns to zero mean and unit variance.
///
/// `fit` stores [`NormalizerParams`] on the normalizer; `transform` and
/// `inverse_transform` apply them to any column of the bound table.
#[derive(Debug, Clone)]
pub struct Normalizer<'a> {
    table: &'a Table,
    params: Option<NormalizerParams>,
}

impl<'a> Normalizer<'a> {
    pub fn new(table: &'a Table) -> Self {
        Self {
            table,
            params: None,
        }
    }

    /// Starts from previously learned parameters.
    pub fn with_params(table: &'a Table, params: NormalizerParams) -> Self {
        Self {
            table,
            params: Some(params),
        }
    }

    pub fn params(&self) -> Option<NormalizerParams> {
        self.params
    }

    pub fn fit(&mut self, column: &str) -> Result<NormalizerParams> {
        let series = self.table.column(column)?.as_materialized_series();
        let params = NormalizerParams::fit(series)?;
        tracing::debug!(column, mean = params.mean, std = params.std, "fitted normalizer");
        self.params = Some(params);
        Ok(params)
    }

    pub fn transform(&self, column: &str) -> Result<Series> {
        let params = self.fitted("transform")?;
        params.transform(self.table.column(column)?.as_materialized_series())
    }

    pub fn fit_transform(&mut self, column: &str) -> Result<Series> {
        self.fit(column)?;
        self.transform(column)
    }

    pub fn inverse_transform(&self, column: &str) -> Result<Series> {
        let params = self.fitted("inverse_transform")?;
        params.inverse_transform(self.table.column(column)?.as_materialized_series())
    }

    /// Writes the learned parameters as JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        save_json(&self.fitted("save")?, path)
    }

    /// Replaces the current parameters with ones saved by [`Normalizer::save`].
    pub fn load(&mut self, path: &Path) -> Result<NormalizerParams> {
        let params: NormalizerParams = load_json(path)?;
        self.params = Some(params);
        Ok(params)
    }

    fn fitted(&self, operation: &'static str) -> Result<NormalizerParams> {
        self.params.ok_or(TransformError::NotFitted {
            component: "Normalizer",
            operation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use timepp_model::ErrorKind;

    fn table() -> Table {
        Table::new(
            df! {
                "x" => &[Some(2.0), Some(4.0), None, Some(6.0)],
                "flat" => &[Some(1.0), Some(1.0), Some(1.0), Some(1.0)],
                "label" => &["a", "b", "c", "d"],
            }
            .unwrap(),
        )
    }

    #[test]
    fn fit_uses_sample_deviation() {
        let table = table();
        let mut normalizer = Normalizer::new(&table);
        let params = normalizer.fit("x").unwrap();
        assert_eq!(params.mean, 4.0);
        assert_eq!(params.std, 2.0);
    }

    #[test]
    fn transform_keeps_nulls() {
        let table = table();
        let mut normalizer = Normalizer::new(&table);
        let scaled = normalizer.fit_transform("x").unwrap();
        let values: Vec<Option<f64>> = scaled.f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(-1.0), Some(0.0), None, Some(1.0)]);
        assert_eq!(scaled.name().as_str(), "x");
    }

    #[test]
    fn transform_before_fit_is_state_error() {
        let table = table();
        let normalizer = Normalizer::new(&table);
        let err = normalizer.transform("x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::State);
        assert!(normalizer.inverse_transform("x").is_err());
    }

    #[test]
    fn constant_column_is_rejected() {
        let table = table();
        let err = Normalizer::new(&table).fit("flat").unwrap_err();
        assert!(matches!(err, TransformError::ZeroVariance { .. }));
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn text_column_is_rejected() {
        let table = table();
        let err = Normalizer::new(&table).fit("label").unwrap_err();
        assert!(matches!(err, TransformError::NonNumeric { .. }));
    }

    #[test]
    fn save_and_load_parameters() {
        let table = table();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("normalizer.json");

        let mut fitted = Normalizer::new(&table);
        fitted.fit("x").unwrap();
        fitted.save(&path).unwrap();

        let mut restored = Normalizer::new(&table);
        let params = restored.load(&path).unwrap();
        assert_eq!(Some(params), fitted.params());
        assert!(
            restored
                .transform("x")
                .unwrap()
                .equals_missing(&fitted.transform("x").unwrap())
        );
    }

    #[test]
    fn save_before_fit_fails() {
        let table = table();
        let dir = tempfile::tempdir().unwrap();
        let err = Normalizer::new(&table)
            .save(&dir.path().join("n.json"))
            .unwrap_err();
        assert!(matches!(err, TransformError::NotFitted { .. }));
    }
}
