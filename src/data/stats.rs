//! Descriptive statistics and aggregates over views of the station table.
//!
//! Missing cells are skipped everywhere. Statistics over no observations are
//! `None` ("no data") rather than an error or a NaN.

use std::collections::BTreeMap;

use super::filter::View;
use super::model::{Column, GroupKey, KeyValue, Record};

// ---------------------------------------------------------------------------
// Describe
// ---------------------------------------------------------------------------

/// Count, mean, sample standard deviation, min, quartiles and max of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: Column,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnSummary {
    pub fn of(column: Column, values: impl IntoIterator<Item = Option<f64>>) -> Self {
        let sorted = sorted_present(values);
        let count = sorted.len();
        let mean = mean(&sorted);
        let std = mean.filter(|_| count > 1).map(|m| {
            let ss: f64 = sorted.iter().map(|v| (v - m).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        });
        ColumnSummary {
            column,
            count,
            mean,
            std,
            min: sorted.first().copied(),
            q25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted.last().copied(),
        }
    }
}

/// Summarise every numeric column the source carries.
pub fn describe(view: &View<'_>) -> Vec<ColumnSummary> {
    view.dataset()
        .columns()
        .iter()
        .map(|&col| ColumnSummary::of(col, view.records().map(|r| r.value(col))))
        .collect()
}

fn sorted_present(values: impl IntoIterator<Item = Option<f64>>) -> Vec<f64> {
    let mut v: Vec<f64> = values.into_iter().flatten().filter(|x| !x.is_nan()).collect();
    v.sort_by(f64::total_cmp);
    v
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Quantile of sorted data with linear interpolation between closest ranks.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Symmetric Pearson correlation matrix over a set of columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<Column>,
    /// Row-major, `columns.len()` × `columns.len()`. `None` where undefined.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Pairwise-complete Pearson correlation: each pair only uses the rows where
/// both columns are present.
pub fn correlate(view: &View<'_>, columns: &[Column]) -> CorrelationMatrix {
    let series: Vec<Vec<Option<f64>>> = columns.iter().map(|&c| view.column(c)).collect();
    let n = columns.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        values[i][i] = series[i].iter().any(Option::is_some).then_some(1.0);
        for j in (i + 1)..n {
            let r = pearson(&series[i], &series[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    CorrelationMatrix {
        columns: columns.to_vec(),
        values,
    }
}

fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut vx, mut vy) = (0.0, 0.0, 0.0);
    for (a, b) in &pairs {
        let (dx, dy) = (a - mx, b - my);
        cov += dx * dy;
        vx += dx * dx;
        vy += dy * dy;
    }
    if vx <= 0.0 || vy <= 0.0 {
        return None;
    }
    Some((cov / (vx.sqrt() * vy.sqrt())).clamp(-1.0, 1.0))
}

// ---------------------------------------------------------------------------
// Group means
// ---------------------------------------------------------------------------

/// Mean of `value` per distinct `key`, ascending by key. Records without a
/// key are dropped; a group with no present values maps to `None`.
pub fn group_mean<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    key: GroupKey,
    value: Column,
) -> BTreeMap<KeyValue, Option<f64>> {
    group_mean_by(records.into_iter().map(|r| (r.key(key), r.value(value))))
}

/// [`group_mean`] over already-paired `(key, value)` rows, for when the value
/// series has been transformed (e.g. forward-filled) away from the records.
pub fn group_mean_by(
    rows: impl IntoIterator<Item = (Option<KeyValue>, Option<f64>)>,
) -> BTreeMap<KeyValue, Option<f64>> {
    let mut acc: BTreeMap<KeyValue, (f64, usize)> = BTreeMap::new();
    for (key, value) in rows {
        let Some(key) = key else { continue };
        let slot = acc.entry(key).or_insert((0.0, 0));
        if let Some(v) = value.filter(|v| !v.is_nan()) {
            slot.0 += v;
            slot.1 += 1;
        }
    }
    acc.into_iter()
        .map(|(k, (sum, n))| (k, (n > 0).then(|| sum / n as f64)))
        .collect()
}

// ---------------------------------------------------------------------------
// Box plot summary
// ---------------------------------------------------------------------------

/// Quartiles, 1.5 × IQR whiskers and outliers of a sample.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub count: usize,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Smallest observation within 1.5 × IQR below `q1`.
    pub lower_whisker: f64,
    /// Largest observation within 1.5 × IQR above `q3`.
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

pub fn box_summary(values: impl IntoIterator<Item = Option<f64>>) -> Option<BoxSummary> {
    let sorted = sorted_present(values);
    let q1 = quantile(&sorted, 0.25)?;
    let median = quantile(&sorted, 0.5)?;
    let q3 = quantile(&sorted, 0.75)?;
    let reach = 1.5 * (q3 - q1);
    let (lo_fence, hi_fence) = (q1 - reach, q3 + reach);

    let lower_whisker = sorted.iter().copied().find(|v| *v >= lo_fence).unwrap_or(q1);
    let upper_whisker = sorted.iter().rev().copied().find(|v| *v <= hi_fence).unwrap_or(q3);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|v| !(lo_fence..=hi_fence).contains(v))
        .collect();

    Some(BoxSummary {
        count: sorted.len(),
        q1,
        median,
        q3,
        lower_whisker,
        upper_whisker,
        outliers,
    })
}
