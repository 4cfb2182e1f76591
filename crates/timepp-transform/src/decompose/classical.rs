//! Classical decomposition by moving averages.

use timepp_model::DecomposeMode;

use super::Components;
use crate::error::{Result, TransformError};

/// Splits a complete series into seasonal, trend and residual parts.
///
/// The trend is a centered moving average over one period (a `2 x period`
/// filter when the period is even) and is undefined for the first and last
/// `period / 2` observations. The seasonal pattern is the per-position mean
/// of the detrended series, normalized to zero mean (additive) or unit mean
/// (multiplicative) and tiled over the series.
pub fn classical_decompose(
    values: &[f64],
    period: usize,
    mode: DecomposeMode,
) -> Result<Components> {
    if period < 2 {
        return Err(TransformError::InvalidPeriod {
            period,
            reason: "must be at least 2",
        });
    }
    if values.len() < 2 * period {
        return Err(TransformError::SeriesTooShort {
            required: 2 * period,
            actual: values.len(),
        });
    }

    let trend = centered_moving_average(values, period);
    let detrended: Vec<Option<f64>> = values
        .iter()
        .zip(&trend)
        .map(|(y, t)| t.map(|t| remove(mode, *y, t)))
        .collect();

    let mut pattern = vec![0.0; period];
    for (position, slot) in pattern.iter_mut().enumerate() {
        let observed: Vec<f64> = detrended
            .iter()
            .skip(position)
            .step_by(period)
            .flatten()
            .copied()
            .collect();
        *slot = observed.iter().sum::<f64>() / observed.len() as f64;
    }
    let level = pattern.iter().sum::<f64>() / period as f64;
    for slot in &mut pattern {
        *slot = match mode {
            DecomposeMode::Additive => *slot - level,
            DecomposeMode::Multiplicative => *slot / level,
        };
    }

    let seasonal: Vec<f64> = (0..values.len()).map(|i| pattern[i % period]).collect();
    let residual = values
        .iter()
        .zip(seasonal.iter().zip(&trend))
        .map(|(y, (s, t))| t.map(|t| remove(mode, remove(mode, *y, *s), t)))
        .collect();

    Ok(Components {
        seasonal,
        trend,
        residual,
    })
}

fn remove(mode: DecomposeMode, value: f64, component: f64) -> f64 {
    match mode {
        DecomposeMode::Additive => value - component,
        DecomposeMode::Multiplicative => value / component,
    }
}

fn centered_moving_average(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let weights: Vec<f64> = if period % 2 == 0 {
        let mut weights = vec![1.0; period + 1];
        weights[0] = 0.5;
        weights[period] = 0.5;
        weights
    } else {
        vec![1.0; period]
    };
    let half = period / 2;
    let n = values.len();
    (0..n)
        .map(|i| {
            (i >= half && i + half < n).then(|| {
                weights
                    .iter()
                    .zip(&values[i - half..=i + half])
                    .map(|(w, y)| w * y)
                    .sum::<f64>()
                    / period as f64
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATTERN: [f64; 4] = [2.0, -1.0, 0.5, -1.5];

    fn linear_plus_pattern(n: usize) -> Vec<f64> {
        (0..n).map(|i| 5.0 + 0.25 * i as f64 + PATTERN[i % 4]).collect()
    }

    #[test]
    fn recovers_exact_additive_components() {
        let values = linear_plus_pattern(16);
        let components = classical_decompose(&values, 4, DecomposeMode::Additive).unwrap();

        assert_eq!(components.trend[..2], [None, None]);
        assert_eq!(components.trend[14..], [None, None]);
        for i in 2..14 {
            let trend = components.trend[i].unwrap();
            assert!((trend - (5.0 + 0.25 * i as f64)).abs() < 1e-9);
            assert!(components.residual[i].unwrap().abs() < 1e-9);
        }
        for (i, s) in components.seasonal.iter().enumerate() {
            assert!((s - PATTERN[i % 4]).abs() < 1e-9);
        }
    }

    #[test]
    fn odd_period_uses_plain_window() {
        let values: Vec<f64> = (0..9).map(|i| i as f64).collect();
        let components = classical_decompose(&values, 3, DecomposeMode::Additive).unwrap();
        assert_eq!(components.trend[0], None);
        assert_eq!(components.trend[1], Some(1.0));
        assert_eq!(components.trend[8], None);
    }

    #[test]
    fn multiplicative_components_multiply_back() {
        let factors = [1.2, 0.8, 1.1, 0.9];
        let values: Vec<f64> = (0..24)
            .map(|i| (20.0 + i as f64) * factors[i % 4])
            .collect();
        let components =
            classical_decompose(&values, 4, DecomposeMode::Multiplicative).unwrap();

        let mean = components.seasonal[..4].iter().sum::<f64>() / 4.0;
        assert!((mean - 1.0).abs() < 1e-9);
        for (i, y) in values.iter().enumerate() {
            if let (Some(t), Some(r)) = (components.trend[i], components.residual[i]) {
                assert!((components.seasonal[i] * t * r - y).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn needs_two_cycles() {
        let err = classical_decompose(&[1.0; 7], 4, DecomposeMode::Additive).unwrap_err();
        assert!(matches!(
            err,
            TransformError::SeriesTooShort {
                required: 8,
                actual: 7
            }
        ));
    }
}
