//! Assembly of every chart's numeric inputs from a dataset and a selection.
//!
//! [`render`] is pure: the UI calls it again whenever the selection changes
//! and nothing is carried over between calls.

use std::collections::BTreeMap;
use std::f64::consts::TAU;

use super::decompose::{decompose, Decomposition};
use super::filter::{filter, filter_year, View};
use super::impute::forward_fill;
use super::model::{Column, Dataset, GroupKey, KeyValue, Pollutant};
use super::stats::{
    box_summary, correlate, describe, group_mean, group_mean_by, BoxSummary, ColumnSummary,
    CorrelationMatrix,
};
use crate::error::DashboardError;

/// Indicators shown in the fixed correlation heatmap.
pub const INDICATOR_COLUMNS: [Column; 8] = [
    Column::Pm25,
    Column::No2,
    Column::So2,
    Column::Co,
    Column::O3,
    Column::Temp,
    Column::Pres,
    Column::Dewp,
];

/// Initial column set of the interactive correlation heatmap.
pub const DEFAULT_CORRELATION_COLUMNS: [Column; 5] = [
    Column::Pm25,
    Column::No2,
    Column::Temp,
    Column::Pres,
    Column::Dewp,
];

/// Either the data for one chart or the notice to show in its place.
pub type Chart<T> = Result<T, DashboardError>;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// The user's current choices.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub year: i32,
    pub month: u32,
    pub pollutant: Pollutant,
    pub correlation_columns: Vec<Column>,
}

impl Selection {
    /// First year and month present, PM2.5, and the given correlation columns
    /// restricted to what the dataset carries.
    pub fn initial(dataset: &Dataset, correlation_columns: &[Column]) -> Self {
        Selection {
            year: dataset.years().iter().next().copied().unwrap_or_default(),
            month: dataset.months().iter().next().copied().unwrap_or(1),
            pollutant: Pollutant::default(),
            correlation_columns: correlation_columns
                .iter()
                .copied()
                .filter(|c| dataset.has_column(*c))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    /// Season length of the PM2.5 decomposition, in hourly samples.
    pub decomposition_period: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            decomposition_period: 24,
        }
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyBox {
    pub month: u32,
    pub summary: BoxSummary,
}

/// One bar of the polar wind-direction chart.
#[derive(Debug, Clone, PartialEq)]
pub struct WindBar {
    pub direction: String,
    /// Radians, bars evenly spaced around the circle in key order.
    pub angle: f64,
    pub mean: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ChartInputs {
    /// Rows in the (year, month) view.
    pub view_rows: usize,
    pub overview: Chart<Vec<ColumnSummary>>,
    /// `(day, PM2.5)` for each hourly row of the view.
    pub daily: Chart<Vec<[f64; 2]>>,
    pub indicator_correlation: Chart<CorrelationMatrix>,
    /// Mean PM2.5 per month over the whole dataset.
    pub monthly_trend: Chart<BTreeMap<KeyValue, Option<f64>>>,
    /// Selected pollutant per month of the selected year.
    pub distribution: Chart<Vec<MonthlyBox>>,
    pub decomposition: Chart<Decomposition>,
    /// Mean forward-filled PM2.5 per hour of day over the whole dataset.
    pub hourly: Chart<BTreeMap<KeyValue, Option<f64>>>,
    pub wind: Chart<Vec<WindBar>>,
    /// `(RAIN, PM2.5)` pairs of the view.
    pub rain_scatter: Chart<Vec<[f64; 2]>>,
    pub custom_correlation: Chart<CorrelationMatrix>,
}

impl ChartInputs {
    /// Every notice produced by this render, labelled by chart.
    pub fn notices(&self) -> Vec<(&'static str, &DashboardError)> {
        let all = [
            ("overview", self.overview.as_ref().err()),
            ("daily", self.daily.as_ref().err()),
            ("indicator correlation", self.indicator_correlation.as_ref().err()),
            ("monthly trend", self.monthly_trend.as_ref().err()),
            ("distribution", self.distribution.as_ref().err()),
            ("decomposition", self.decomposition.as_ref().err()),
            ("hourly", self.hourly.as_ref().err()),
            ("wind", self.wind.as_ref().err()),
            ("rain", self.rain_scatter.as_ref().err()),
            ("custom correlation", self.custom_correlation.as_ref().err()),
        ];
        all.into_iter()
            .filter_map(|(name, err)| err.map(|e| (name, e)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Render
// ---------------------------------------------------------------------------

/// Compute the inputs of every chart for one selection.
pub fn render(dataset: &Dataset, selection: &Selection, settings: &RenderSettings) -> ChartInputs {
    log::debug!(
        "rendering {}-{:02} pollutant={} columns={:?}",
        selection.year,
        selection.month,
        selection.pollutant,
        selection.correlation_columns
    );
    let view = filter(dataset, selection.year, selection.month);
    let non_empty = || require_rows(&view, selection);

    ChartInputs {
        view_rows: view.len(),
        overview: non_empty().map(describe),
        daily: non_empty().map(daily_series),
        indicator_correlation: non_empty().map(|v| correlate(v, &INDICATOR_COLUMNS)),
        monthly_trend: Ok(group_mean(dataset.records(), GroupKey::Month, Column::Pm25)),
        distribution: Ok(distribution(dataset, selection.year, selection.pollutant)),
        decomposition: non_empty().and_then(|v| {
            decompose(&forward_fill(&v.column(Column::Pm25)), settings.decomposition_period)
        }),
        hourly: Ok(hourly_averages(dataset)),
        wind: non_empty().map(wind_bars),
        rain_scatter: non_empty().map(rain_scatter),
        custom_correlation: custom_correlation(dataset, &selection.correlation_columns),
    }
}

fn require_rows<'v, 'a>(view: &'v View<'a>, selection: &Selection) -> Chart<&'v View<'a>> {
    if view.is_empty() {
        Err(DashboardError::EmptySelection {
            year: selection.year,
            month: selection.month,
        })
    } else {
        Ok(view)
    }
}

fn daily_series(view: &View<'_>) -> Vec<[f64; 2]> {
    view.records()
        .filter_map(|r| Some([r.day as f64, r.pm25?]))
        .collect()
}

fn distribution(dataset: &Dataset, year: i32, pollutant: Pollutant) -> Vec<MonthlyBox> {
    let rows = filter_year(dataset, year);
    let mut by_month: BTreeMap<u32, Vec<Option<f64>>> = BTreeMap::new();
    for r in rows.records() {
        by_month.entry(r.month).or_default().push(r.value(pollutant.column()));
    }
    by_month
        .into_iter()
        .filter_map(|(month, values)| {
            box_summary(values).map(|summary| MonthlyBox { month, summary })
        })
        .collect()
}

fn hourly_averages(dataset: &Dataset) -> BTreeMap<KeyValue, Option<f64>> {
    let filled = forward_fill(&View::all(dataset).column(Column::Pm25));
    group_mean_by(
        dataset
            .records()
            .iter()
            .zip(filled)
            .map(|(r, v)| (r.key(GroupKey::Hour), v)),
    )
}

fn wind_bars(view: &View<'_>) -> Vec<WindBar> {
    let means = group_mean(view.records(), GroupKey::WindDirection, Column::Pm25);
    let n = means.len() as f64;
    means
        .into_iter()
        .enumerate()
        .map(|(i, (key, mean))| WindBar {
            direction: key.to_string(),
            angle: TAU * i as f64 / n,
            mean,
        })
        .collect()
}

fn rain_scatter(view: &View<'_>) -> Vec<[f64; 2]> {
    view.records()
        .filter_map(|r| Some([r.rain?, r.pm25?]))
        .collect()
}

fn custom_correlation(dataset: &Dataset, columns: &[Column]) -> Chart<CorrelationMatrix> {
    if let Some(absent) = columns.iter().find(|c| !dataset.has_column(**c)) {
        return Err(DashboardError::MissingColumn(absent.name().to_string()));
    }
    Ok(correlate(&View::all(dataset), columns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::parse_month;
    use crate::data::model::Record;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// January 2013 PM2.5 [10, 20, 30], February 2013 [5, 15].
    fn two_months() -> Dataset {
        let rows = [(1, 10.0), (1, 20.0), (1, 30.0), (2, 5.0), (2, 15.0)];
        let records = rows
            .iter()
            .enumerate()
            .map(|(i, &(month, pm))| Record {
                wd: Some(if i % 2 == 0 { "N" } else { "SW" }.to_string()),
                rain: Some(i as f64),
                ..Record::at(2013, month, 1 + i as u32, i as u32).with(Column::Pm25, Some(pm))
            })
            .collect();
        Dataset::from_records(records, Column::ALL.iter().copied().filter(|c| c.is_required()))
    }

    fn selection(ds: &Dataset, month: u32) -> Selection {
        Selection {
            month,
            ..Selection::initial(ds, &DEFAULT_CORRELATION_COLUMNS)
        }
    }

    #[test]
    fn test_end_to_end_january() {
        let ds = two_months();
        let january = parse_month("January").unwrap();
        let view = filter(&ds, 2013, january);
        assert_eq!(view.len(), 3);
        assert!(view.records().all(|r| r.month == 1));

        let charts = render(&ds, &selection(&ds, january), &RenderSettings::default());
        assert_eq!(charts.view_rows, 3);
        let overview = charts.overview.unwrap();
        let pm = overview.iter().find(|s| s.column == Column::Pm25).unwrap();
        assert_eq!(pm.count, 3);
        assert!(approx(pm.mean.unwrap(), 20.0));
    }

    #[test]
    fn test_empty_selection_is_non_fatal() {
        let ds = two_months();
        let sel = Selection {
            year: 2099,
            ..selection(&ds, 1)
        };
        let charts = render(&ds, &sel, &RenderSettings::default());
        assert_eq!(charts.view_rows, 0);
        assert!(matches!(
            charts.overview,
            Err(DashboardError::EmptySelection { year: 2099, month: 1 })
        ));
        assert!(charts.decomposition.is_err());
        assert!(charts.wind.is_err());
        // Whole-dataset charts are unaffected.
        assert!(charts.monthly_trend.is_ok());
        assert!(charts.hourly.is_ok());
        assert!(charts.custom_correlation.is_ok());
        assert_eq!(charts.distribution.unwrap(), Vec::new());
    }

    #[test]
    fn test_short_month_reports_decomposition_error() {
        let ds = two_months();
        let charts = render(&ds, &selection(&ds, 1), &RenderSettings::default());
        assert!(matches!(
            charts.decomposition,
            Err(DashboardError::DecompositionError(_))
        ));
        assert_eq!(charts.notices().len(), 1);
        assert!(charts.daily.is_ok());
    }

    #[test]
    fn test_decomposition_with_gaps_after_fill() {
        let records = (0..48)
            .map(|i| {
                let pm = if i % 5 == 3 { None } else { Some(50.0) };
                Record::at(2014, 6, 1 + i / 24, i % 24).with(Column::Pm25, pm)
            })
            .collect();
        let ds = Dataset::from_records(records, Column::ALL);
        let sel = Selection::initial(&ds, &[]);
        let charts = render(&ds, &sel, &RenderSettings::default());
        let d = charts.decomposition.unwrap();
        assert!(d.seasonal.iter().all(|s| approx(*s, 0.0)));
    }

    #[test]
    fn test_monthly_and_hourly_aggregates() {
        let ds = two_months();
        let charts = render(&ds, &selection(&ds, 2), &RenderSettings::default());
        let monthly = charts.monthly_trend.unwrap();
        assert_eq!(monthly[&KeyValue::Integer(1)], Some(20.0));
        assert_eq!(monthly[&KeyValue::Integer(2)], Some(10.0));
        assert_eq!(charts.hourly.unwrap().len(), 5);
    }

    #[test]
    fn test_wind_bars_evenly_spaced() {
        let ds = two_months();
        let charts = render(&ds, &selection(&ds, 1), &RenderSettings::default());
        let bars = charts.wind.unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].direction, "N");
        assert_eq!(bars[0].mean, Some(20.0));
        assert_eq!(bars[1].mean, Some(20.0));
        assert!(approx(bars[1].angle, std::f64::consts::PI));
    }

    #[test]
    fn test_distribution_per_month() {
        let ds = two_months();
        let sel = Selection {
            pollutant: Pollutant::Pm25,
            ..selection(&ds, 1)
        };
        let boxes = render(&ds, &sel, &RenderSettings::default()).distribution.unwrap();
        let months: Vec<u32> = boxes.iter().map(|b| b.month).collect();
        assert_eq!(months, vec![1, 2]);
        assert!(approx(boxes[0].summary.median, 20.0));
        // PM10 is entirely missing in the fixture.
        let sel = Selection {
            pollutant: Pollutant::Pm10,
            ..sel
        };
        assert!(render(&ds, &sel, &RenderSettings::default())
            .distribution
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_custom_correlation_rejects_absent_column() {
        let ds = two_months();
        let sel = Selection {
            correlation_columns: vec![Column::Pm25, Column::Wspm],
            ..selection(&ds, 1)
        };
        let charts = render(&ds, &sel, &RenderSettings::default());
        assert_eq!(
            charts.custom_correlation.unwrap_err(),
            DashboardError::MissingColumn("WSPM".into())
        );
        // The initial selection never offers it.
        assert!(!selection(&ds, 1).correlation_columns.contains(&Column::Wspm));
    }

    #[test]
    fn test_rain_scatter_pairs() {
        let ds = two_months();
        let pairs = render(&ds, &selection(&ds, 2), &RenderSettings::default())
            .rain_scatter
            .unwrap();
        assert_eq!(pairs, vec![[3.0, 5.0], [4.0, 15.0]]);
    }
}
