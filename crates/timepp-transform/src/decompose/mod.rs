//! Seasonal decomposition of a numeric column.
//!
//! [`Decomposer`] reads one column of a [`Table`] and splits it into
//! `seasonal`, `trend` and `residual` components, either by classical moving
//! averages or by STL.

mod classical;
mod loess;
mod stl;

pub use classical::classical_decompose;
pub use stl::{StlOptions, StlParams, stl_decompose};

use polars::prelude::*;
use timepp_model::{ComponentOutput, DecomposeMode, Table};

use crate::error::{Result, TransformError};
use crate::series::complete_values;

/// Output column names, in output order.
pub const COMPONENT_COLUMNS: [&str; 3] = ["seasonal", "trend", "residual"];

/// Decomposition result aligned with the input rows.
///
/// `None` marks positions where a component is undefined, such as the edges
/// of a classical trend.
#[derive(Debug, Clone, PartialEq)]
pub struct Components {
    pub seasonal: Vec<f64>,
    pub trend: Vec<Option<f64>>,
    pub residual: Vec<Option<f64>>,
}

/// Decomposes one column of a table.
#[derive(Debug, Clone)]
pub struct Decomposer<'a> {
    table: &'a Table,
    column: String,
}

impl<'a> Decomposer<'a> {
    /// Binds a table column. Fails if the column is absent.
    pub fn new(table: &'a Table, column: &str) -> Result<Self> {
        table.column(column)?;
        Ok(Self {
            table,
            column: column.to_string(),
        })
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// Period to decompose with: `period` when given, else the one implied by
    /// the index frequency.
    pub fn resolve_period(&self, period: Option<usize>) -> Result<usize> {
        let period = period
            .or_else(|| self.table.freq().map(|freq| freq.seasonal_period()))
            .ok_or(TransformError::MissingPeriod)?;
        if period < 2 {
            return Err(TransformError::InvalidPeriod {
                period,
                reason: "must be at least 2",
            });
        }
        Ok(period)
    }

    /// Classical decomposition by moving averages.
    pub fn classical(
        &self,
        mode: DecomposeMode,
        period: Option<usize>,
        output: ComponentOutput,
    ) -> Result<Table> {
        let components = self.classical_components(mode, period)?;
        self.assemble(components, output)
    }

    pub fn classical_components(
        &self,
        mode: DecomposeMode,
        period: Option<usize>,
    ) -> Result<Components> {
        let period = self.resolve_period(period)?;
        let values = self.values()?;
        if mode == DecomposeMode::Multiplicative && values.iter().any(|v| *v <= 0.0) {
            return Err(TransformError::NonPositiveValues {
                column: self.column.clone(),
            });
        }
        tracing::debug!(
            column = %self.column,
            period,
            mode = %mode,
            rows = values.len(),
            "classical decomposition"
        );
        classical_decompose(&values, period, mode)
    }

    /// STL decomposition.
    pub fn stl(&self, options: &StlOptions, output: ComponentOutput) -> Result<Table> {
        let components = self.stl_components(options)?;
        self.assemble(components, output)
    }

    pub fn stl_components(&self, options: &StlOptions) -> Result<Components> {
        let period = self.resolve_period(options.period)?;
        let params = options.resolve(period)?;
        let values = self.values()?;
        tracing::debug!(
            column = %self.column,
            period,
            seasonal = params.seasonal,
            trend = params.trend,
            robust = options.robust,
            rows = values.len(),
            "STL decomposition"
        );
        stl_decompose(&values, &params)
    }

    fn values(&self) -> Result<Vec<f64>> {
        let column = self.table.column(&self.column)?;
        complete_values(column.as_materialized_series())
    }

    fn assemble(&self, components: Components, output: ComponentOutput) -> Result<Table> {
        let Components {
            seasonal,
            trend,
            residual,
        } = components;
        let [seasonal_name, trend_name, residual_name] = COMPONENT_COLUMNS;
        let parts = [
            Column::new(seasonal_name.into(), seasonal),
            Column::new(trend_name.into(), trend),
            Column::new(residual_name.into(), residual),
        ];

        match output {
            ComponentOutput::AppendToCopy => {
                let mut frame = self.table.frame().clone();
                for part in parts {
                    frame.with_column(part)?;
                }
                Ok(self.table.with_frame(frame))
            }
            ComponentOutput::ComponentsOnly => {
                let mut columns = Vec::with_capacity(4);
                if let Some(index) = self.table.index_column() {
                    columns.push(self.table.column(index)?.clone());
                }
                columns.extend(parts);
                let frame = DataFrame::new(columns)?;
                match self.table.index() {
                    Some(index) => Table::new(frame)
                        .with_time_index(&index.column, index.freq)
                        .map_err(TransformError::from),
                    None => Ok(Table::new(frame)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use timepp_model::{ErrorKind, Frequency};

    fn monthly_table(n: usize) -> Table {
        let dates: Vec<String> = (0..n)
            .map(|i| format!("{}-{:02}-01", 2020 + i / 12, i % 12 + 1))
            .collect();
        let sales: Vec<f64> = (0..n)
            .map(|i| 100.0 + i as f64 + [5.0, -3.0, 1.0, -3.0][i % 4] + (i % 12) as f64)
            .collect();
        let frame = df! { "date" => dates, "sales" => sales }.unwrap();
        Table::new(frame)
            .with_time_index("date", Some(Frequency::MONTHLY))
            .unwrap()
    }

    #[test]
    fn absent_column_is_config_error() {
        let table = monthly_table(24);
        let err = Decomposer::new(&table, "revenue").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn period_comes_from_frequency() {
        let table = monthly_table(24);
        let decomposer = Decomposer::new(&table, "sales").unwrap();
        assert_eq!(decomposer.resolve_period(None).unwrap(), 12);
        assert_eq!(decomposer.resolve_period(Some(4)).unwrap(), 4);
    }

    #[test]
    fn missing_period_without_frequency() {
        let frame = df! { "sales" => &[1.0, 2.0, 3.0, 4.0] }.unwrap();
        let table = Table::new(frame);
        let decomposer = Decomposer::new(&table, "sales").unwrap();
        let err = decomposer
            .classical(DecomposeMode::Additive, None, ComponentOutput::ComponentsOnly)
            .unwrap_err();
        assert!(matches!(err, TransformError::MissingPeriod));
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn components_only_keeps_index() {
        let table = monthly_table(36);
        let decomposer = Decomposer::new(&table, "sales").unwrap();
        let result = decomposer
            .classical(DecomposeMode::Additive, None, ComponentOutput::ComponentsOnly)
            .unwrap();
        assert_eq!(
            result.column_names(),
            vec!["date", "seasonal", "trend", "residual"]
        );
        assert_eq!(result.freq(), Some(Frequency::MONTHLY));
        assert_eq!(result.column("trend").unwrap().null_count(), 12);
    }

    #[test]
    fn append_leaves_source_untouched() {
        let table = monthly_table(36);
        let decomposer = Decomposer::new(&table, "sales").unwrap();
        let result = decomposer
            .stl(&StlOptions::new(), ComponentOutput::AppendToCopy)
            .unwrap();
        assert_eq!(result.width(), 5);
        assert_eq!(table.width(), 2);
        assert_eq!(result.index_column(), Some("date"));
    }

    #[test]
    fn missing_values_are_rejected() {
        let frame = df! { "y" => &[Some(1.0), None, Some(3.0), Some(4.0)] }.unwrap();
        let table = Table::new(frame);
        let err = Decomposer::new(&table, "y")
            .unwrap()
            .classical(DecomposeMode::Additive, Some(2), ComponentOutput::ComponentsOnly)
            .unwrap_err();
        assert!(matches!(err, TransformError::MissingValues { count: 1, .. }));
    }

    #[test]
    fn multiplicative_needs_positive_values() {
        let frame = df! { "y" => &[1.0, 0.0, 3.0, 4.0] }.unwrap();
        let table = Table::new(frame);
        let err = Decomposer::new(&table, "y")
            .unwrap()
            .classical(
                DecomposeMode::Multiplicative,
                Some(2),
                ComponentOutput::ComponentsOnly,
            )
            .unwrap_err();
        assert!(matches!(err, TransformError::NonPositiveValues { .. }));
    }
}
