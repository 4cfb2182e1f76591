//! Seasonal-trend decomposition using LOESS (Cleveland et al., 1990).

use serde::{Deserialize, Serialize};

use super::Components;
use super::loess;
use crate::error::{Result, TransformError};

/// STL configuration.
///
/// Unset smoother lengths and iteration counts are derived from the period
/// and the `robust` flag when the decomposition runs.
///
/// # Example
///
/// ```
/// use timepp_transform::StlOptions;
///
/// let options = StlOptions::new().with_period(12).with_robust(false);
/// assert_eq!(options.period, Some(12));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StlOptions {
    /// Seasonal period; taken from the index frequency when unset.
    pub period: Option<usize>,
    /// Seasonal smoother length (odd, at least 3).
    pub seasonal: usize,
    /// Trend smoother length (odd, at least 3).
    pub trend: Option<usize>,
    /// Low-pass filter smoother length (odd, at least 3).
    pub low_pass: Option<usize>,
    /// Downweight outliers with an outer reweighting loop.
    pub robust: bool,
    pub inner_iterations: Option<usize>,
    pub outer_iterations: Option<usize>,
}

impl Default for StlOptions {
    fn default() -> Self {
        Self {
            period: None,
            seasonal: 7,
            trend: None,
            low_pass: None,
            robust: true,
            inner_iterations: None,
            outer_iterations: None,
        }
    }
}

impl StlOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_period(mut self, period: usize) -> Self {
        self.period = Some(period);
        self
    }

    #[must_use]
    pub fn with_seasonal(mut self, length: usize) -> Self {
        self.seasonal = length;
        self
    }

    #[must_use]
    pub fn with_trend(mut self, length: usize) -> Self {
        self.trend = Some(length);
        self
    }

    #[must_use]
    pub fn with_low_pass(mut self, length: usize) -> Self {
        self.low_pass = Some(length);
        self
    }

    #[must_use]
    pub fn with_robust(mut self, robust: bool) -> Self {
        self.robust = robust;
        self
    }

    #[must_use]
    pub fn with_iterations(mut self, inner: usize, outer: usize) -> Self {
        self.inner_iterations = Some(inner);
        self.outer_iterations = Some(outer);
        self
    }

    /// Resolves every smoother length and iteration count for `period`.
    pub fn resolve(&self, period: usize) -> Result<StlParams> {
        if period < 2 {
            return Err(TransformError::InvalidPeriod {
                period,
                reason: "must be at least 2",
            });
        }
        let seasonal = check_smoother("seasonal", self.seasonal)?;
        let trend = match self.trend {
            Some(length) => check_smoother("trend", length)?,
            None => default_trend_length(period, seasonal),
        };
        let low_pass = match self.low_pass {
            Some(length) => check_smoother("low-pass", length)?,
            None => next_odd(period + 1),
        };
        Ok(StlParams {
            period,
            seasonal,
            trend,
            low_pass,
            inner_iterations: self
                .inner_iterations
                .unwrap_or(if self.robust { 2 } else { 5 }),
            outer_iterations: self
                .outer_iterations
                .unwrap_or(if self.robust { 15 } else { 0 }),
        })
    }
}

/// Fully resolved STL parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StlParams {
    pub period: usize,
    pub seasonal: usize,
    pub trend: usize,
    pub low_pass: usize,
    pub inner_iterations: usize,
    pub outer_iterations: usize,
}

fn check_smoother(smoother: &'static str, length: usize) -> Result<usize> {
    if length < 3 || length % 2 == 0 {
        return Err(TransformError::InvalidSmoother { smoother, length });
    }
    Ok(length)
}

fn next_odd(value: usize) -> usize {
    if value % 2 == 0 { value + 1 } else { value }
}

fn default_trend_length(period: usize, seasonal: usize) -> usize {
    let length = (1.5 * period as f64 / (1.0 - 1.5 / seasonal as f64)).ceil() as usize;
    next_odd(length.max(3))
}

/// Runs STL on a complete series.
///
/// The residual is `y - seasonal - trend`, so the three components add back
/// to the input.
pub fn stl_decompose(values: &[f64], params: &StlParams) -> Result<Components> {
    let n = values.len();
    let period = params.period;
    if n < 2 * period {
        return Err(TransformError::SeriesTooShort {
            required: 2 * period,
            actual: n,
        });
    }

    let mut robustness = vec![1.0; n];
    let mut seasonal = vec![0.0; n];
    let mut trend = vec![0.0; n];

    for outer in 0..=params.outer_iterations {
        let weights = (outer > 0).then_some(robustness.as_slice());
        for _ in 0..params.inner_iterations.max(1) {
            inner_pass(values, params, weights, &mut seasonal, &mut trend);
        }
        if outer < params.outer_iterations {
            robustness = robustness_weights(values, &seasonal, &trend);
        }
    }

    let residual = values
        .iter()
        .zip(seasonal.iter().zip(&trend))
        .map(|(y, (s, t))| Some(y - s - t))
        .collect();
    Ok(Components {
        seasonal,
        trend: trend.into_iter().map(Some).collect(),
        residual,
    })
}

fn inner_pass(
    values: &[f64],
    params: &StlParams,
    weights: Option<&[f64]>,
    seasonal: &mut [f64],
    trend: &mut [f64],
) {
    let period = params.period;
    let detrended: Vec<f64> = values.iter().zip(trend.iter()).map(|(y, t)| y - t).collect();

    let cycle = cycle_subseries(&detrended, period, params.seasonal, weights);
    let low = low_pass(&cycle, period, params.low_pass);
    for (i, s) in seasonal.iter_mut().enumerate() {
        *s = cycle[period + i] - low[i];
    }

    let deseasonalized: Vec<f64> = values
        .iter()
        .zip(seasonal.iter())
        .map(|(y, s)| y - s)
        .collect();
    let smoothed = loess::smooth(&deseasonalized, params.trend, 1, weights);
    trend.copy_from_slice(&smoothed);
}

/// Smooths each cycle-subseries and extends it one period on either side.
///
/// The result has `n + 2 * period` entries; entry `i + period` lines up with
/// observation `i`.
fn cycle_subseries(
    detrended: &[f64],
    period: usize,
    span: usize,
    weights: Option<&[f64]>,
) -> Vec<f64> {
    let n = detrended.len();
    let mut out = vec![0.0; n + 2 * period];
    for position in 0..period {
        let sub: Vec<f64> = detrended.iter().skip(position).step_by(period).copied().collect();
        let sub_weights: Option<Vec<f64>> =
            weights.map(|w| w.iter().skip(position).step_by(period).copied().collect());
        let m = sub.len();
        for j in 0..m + 2 {
            let fallback = sub[j.saturating_sub(1).min(m - 1)];
            let value = loess::fit_at(&sub, j as f64 - 1.0, span, 1, sub_weights.as_deref())
                .unwrap_or(fallback);
            out[position + j * period] = value;
        }
    }
    out
}

fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    values
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect()
}

fn low_pass(cycle: &[f64], period: usize, span: usize) -> Vec<f64> {
    let filtered = moving_average(&moving_average(&moving_average(cycle, period), period), 3);
    loess::smooth(&filtered, span, 1, None)
}

fn robustness_weights(values: &[f64], seasonal: &[f64], trend: &[f64]) -> Vec<f64> {
    let abs_residuals: Vec<f64> = values
        .iter()
        .zip(seasonal.iter().zip(trend))
        .map(|(y, (s, t))| (y - s - t).abs())
        .collect();
    let h = 6.0 * median(&abs_residuals);
    abs_residuals
        .iter()
        .map(|r| {
            if h <= 0.0 {
                1.0
            } else {
                let u = r / h;
                if u <= 0.001 {
                    1.0
                } else if u <= 0.999 {
                    (1.0 - u * u).powi(2)
                } else {
                    0.0
                }
            }
        })
        .collect()
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.is_empty() {
        0.0
    } else if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
