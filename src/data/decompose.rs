//! Classical additive seasonal decomposition: `Y = T + S + R`.

use crate::error::{DashboardError, Result};

/// Trend, seasonal and residual components of a series.
///
/// `trend` and `residual` are undefined (`None`) for the first and last
/// `period / 2` points, where the centred moving average has no full window.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    pub period: usize,
    pub trend: Vec<Option<f64>>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<Option<f64>>,
}

/// Split a gap-free series into additive trend, seasonal and residual parts.
///
/// Fails when the period is below 2, the series is shorter than two full
/// periods, or any value is missing (forward-fill first).
pub fn decompose(series: &[Option<f64>], period: usize) -> Result<Decomposition> {
    if period < 2 {
        return Err(DashboardError::DecompositionError(format!(
            "period must be at least 2, got {period}"
        )));
    }
    let n = series.len();
    if n / 2 < period {
        return Err(DashboardError::DecompositionError(format!(
            "x must have 2 complete cycles requires {} observations. x only has {n} observation(s)",
            period.saturating_mul(2)
        )));
    }
    let data: Vec<f64> = series
        .iter()
        .enumerate()
        .map(|(i, v)| {
            v.filter(|x| x.is_finite()).ok_or_else(|| {
                DashboardError::DecompositionError(format!(
                    "missing value at position {i}; the series must be filled first"
                ))
            })
        })
        .collect::<Result<_>>()?;

    let trend = centred_moving_average(&data, period);

    // Mean of the detrended series at each phase of the cycle.
    let mut phase_sum = vec![0.0; period];
    let mut phase_count = vec![0usize; period];
    for (i, (y, t)) in data.iter().zip(&trend).enumerate() {
        if let Some(t) = t {
            phase_sum[i % period] += y - t;
            phase_count[i % period] += 1;
        }
    }
    let mut phase_mean: Vec<f64> = phase_sum
        .iter()
        .zip(&phase_count)
        .map(|(s, &c)| if c > 0 { s / c as f64 } else { 0.0 })
        .collect();
    let centre = phase_mean.iter().sum::<f64>() / period as f64;
    for s in &mut phase_mean {
        *s -= centre;
    }

    let seasonal: Vec<f64> = (0..n).map(|i| phase_mean[i % period]).collect();
    let residual = data
        .iter()
        .zip(&trend)
        .zip(&seasonal)
        .map(|((y, t), s)| t.map(|t| y - t - s))
        .collect();

    Ok(Decomposition {
        period,
        trend,
        seasonal,
        residual,
    })
}

/// Two-sided moving average centred on each point. Even periods use a
/// `period + 1` window with half weight at both ends.
fn centred_moving_average(data: &[f64], period: usize) -> Vec<Option<f64>> {
    let half = period / 2;
    let weights: Vec<f64> = if period % 2 == 0 {
        let mut w = vec![1.0 / period as f64; period + 1];
        w[0] /= 2.0;
        w[period] /= 2.0;
        w
    } else {
        vec![1.0 / period as f64; period]
    };

    (0..data.len())
        .map(|i| {
            if i < half || i + half >= data.len() {
                return None;
            }
            let window = &data[i - half..i - half + weights.len()];
            Some(window.iter().zip(&weights).map(|(x, w)| x * w).sum())
        })
        .collect()
}
