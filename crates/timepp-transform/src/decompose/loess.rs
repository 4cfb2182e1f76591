//! Locally weighted regression on equally spaced observations.
//!
//! Observations sit at positions `0..n`; fits may be evaluated anywhere,
//! including just outside the observed range.

/// Fits a tricube-weighted local line (or constant for `degree == 0`) through
/// the `span` observations nearest to `x` and evaluates it at `x`.
///
/// `robustness` multiplies the neighbourhood weights. Returns `None` when
/// every weight in the neighbourhood is zero.
pub(crate) fn fit_at(
    y: &[f64],
    x: f64,
    span: usize,
    degree: usize,
    robustness: Option<&[f64]>,
) -> Option<f64> {
    let n = y.len();
    if n == 0 || span == 0 {
        return None;
    }

    let (left, right) = if span >= n {
        (0, n - 1)
    } else {
        let start = (x - (span as f64 - 1.0) / 2.0).round();
        let left = start.clamp(0.0, (n - span) as f64) as usize;
        (left, left + span - 1)
    };

    let mut h = (x - left as f64).max(right as f64 - x);
    if span > n {
        h += ((span - n) / 2) as f64;
    }
    let upper = 0.999 * h;
    let lower = 0.001 * h;

    let mut weights = vec![0.0; right - left + 1];
    let mut total = 0.0;
    for (offset, weight) in weights.iter_mut().enumerate() {
        let j = left + offset;
        let distance = (j as f64 - x).abs();
        if distance <= upper {
            let mut w = if distance <= lower {
                1.0
            } else {
                (1.0 - (distance / h).powi(3)).powi(3)
            };
            if let Some(rw) = robustness {
                w *= rw[j];
            }
            *weight = w;
            total += w;
        }
    }
    if total <= 0.0 {
        return None;
    }
    for weight in &mut weights {
        *weight /= total;
    }

    if degree > 0 && h > 0.0 {
        let center: f64 = weights
            .iter()
            .enumerate()
            .map(|(offset, w)| w * (left + offset) as f64)
            .sum();
        let spread: f64 = weights
            .iter()
            .enumerate()
            .map(|(offset, w)| w * ((left + offset) as f64 - center).powi(2))
            .sum();
        if spread.sqrt() > 0.001 * (n as f64 - 1.0) {
            let slope = (x - center) / spread;
            for (offset, weight) in weights.iter_mut().enumerate() {
                *weight *= slope * ((left + offset) as f64 - center) + 1.0;
            }
        }
    }

    Some(
        weights
            .iter()
            .enumerate()
            .map(|(offset, w)| w * y[left + offset])
            .sum(),
    )
}

/// Smooths `y` at every observed position. Positions whose neighbourhood has
/// no weight keep their observed value.
pub(crate) fn smooth(
    y: &[f64],
    span: usize,
    degree: usize,
    robustness: Option<&[f64]>,
) -> Vec<f64> {
    (0..y.len())
        .map(|i| fit_at(y, i as f64, span, degree, robustness).unwrap_or(y[i]))
        .collect()
}
