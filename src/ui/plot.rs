use std::collections::BTreeMap;

use eframe::egui::{Color32, RichText, ScrollArea, Stroke, Ui, Vec2};
use egui_extras::{Column as TableColumn, TableBuilder};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoint, PlotPoints, Points,
    Polygon, Text,
};

use crate::color::{generate_palette, Gradient};
use crate::data::charts::{Chart, MonthlyBox, WindBar};
use crate::data::decompose::Decomposition;
use crate::data::filter::month_name;
use crate::data::model::KeyValue;
use crate::data::stats::ColumnSummary;
use crate::state::AppState;
use crate::ui::heatmap::{correlation_heatmap, paint_grid};

const PLOT_HEIGHT: f32 = 240.0;

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render every chart section in the central panel.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let charts = &state.charts;
    let sel = &state.selection;
    let period = format!("{} {}", month_name(sel.month), sel.year);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading(&state.title);
            ui.separator();

            section(ui, "Data Overview for Selected Period", &charts.overview, overview_table);

            section(ui, &format!("Daily PM2.5 Levels in {period}"), &charts.daily, |ui, points| {
                Plot::new("daily_pm25")
                    .height(PLOT_HEIGHT)
                    .x_axis_label("Day of the Month")
                    .y_axis_label("PM2.5 Concentration")
                    .allow_scroll(false)
                    .show(ui, |plot_ui| {
                        let teal = Color32::from_rgb(0, 128, 128);
                        plot_ui.line(Line::new(PlotPoints::from(points.clone())).color(teal));
                        plot_ui.points(Points::new(PlotPoints::from(points.clone())).radius(2.0).color(teal));
                    });
            });

            section(
                ui,
                "Correlation Heatmap of Air Quality Indicators",
                &charts.indicator_correlation,
                |ui, m| correlation_heatmap(ui, m, &Gradient::coolwarm(-1.0, 1.0)),
            );

            section(ui, "Average Monthly PM2.5 Levels", &charts.monthly_trend, |ui, means| {
                let bars: Vec<Bar> = integer_keyed(means)
                    .map(|(month, v)| Bar::new(month, v).name(month_name(month as u32)))
                    .collect();
                Plot::new("monthly_trend")
                    .height(PLOT_HEIGHT)
                    .x_axis_label("Month")
                    .y_axis_label("Average PM2.5")
                    .allow_scroll(false)
                    .show(ui, |plot_ui| {
                        plot_ui.bar_chart(BarChart::new(bars).color(Color32::from_rgb(135, 206, 235)));
                    });
            });

            section(
                ui,
                &format!("Distribution of {} for {}", sel.pollutant, sel.year),
                &charts.distribution,
                distribution_plot,
            );

            section(ui, "Time Series Decomposition of PM2.5", &charts.decomposition, decomposition_plots);

            section(ui, "Hourly Averages of PM2.5", &charts.hourly, |ui, means| {
                let hours: Vec<String> = means.keys().map(KeyValue::to_string).collect();
                let row: Vec<Option<f64>> = means.values().copied().collect();
                let gradient = value_range_gradient(&row);
                paint_grid(
                    ui,
                    &["PM2.5".to_string()],
                    &hours,
                    &[row],
                    &gradient,
                    Vec2::new(34.0, 40.0),
                    false,
                );
            });

            section(ui, "PM2.5 Levels by Wind Direction", &charts.wind, wind_rose);

            section(ui, "Rainfall vs. PM2.5 Levels", &charts.rain_scatter, |ui, points| {
                Plot::new("rain_scatter")
                    .height(PLOT_HEIGHT)
                    .x_axis_label("RAIN")
                    .y_axis_label("PM2.5")
                    .allow_scroll(false)
                    .show(ui, |plot_ui| {
                        plot_ui.points(
                            Points::new(PlotPoints::from(points.clone()))
                                .radius(2.5)
                                .color(Color32::from_rgb(128, 0, 128)),
                        );
                    });
            });

            section(
                ui,
                "Interactive Correlation Heatmap",
                &charts.custom_correlation,
                |ui, m| correlation_heatmap(ui, m, &Gradient::yellow_green_blue(-1.0, 1.0)),
            );
        });
}

/// A titled section showing either the chart or its notice.
fn section<T>(ui: &mut Ui, title: &str, chart: &Chart<T>, draw: impl FnOnce(&mut Ui, &T)) {
    ui.add_space(8.0);
    ui.strong(title);
    match chart {
        Ok(data) => draw(ui, data),
        Err(notice) => {
            ui.label(RichText::new(notice.to_string()).color(Color32::RED));
        }
    }
    ui.separator();
}

/// Coolwarm spread over the smallest and largest present value.
fn value_range_gradient(values: &[Option<f64>]) -> Gradient {
    let present = values.iter().flatten().copied();
    let min = present.clone().fold(f64::INFINITY, f64::min);
    let max = present.fold(f64::NEG_INFINITY, f64::max);
    Gradient::coolwarm(min, max)
}

fn integer_keyed(means: &BTreeMap<KeyValue, Option<f64>>) -> impl Iterator<Item = (f64, f64)> + '_ {
    means.iter().filter_map(|(k, v)| match k {
        KeyValue::Integer(i) => Some((*i as f64, (*v)?)),
        KeyValue::Text(_) => None,
    })
}

// ---------------------------------------------------------------------------
// Individual charts
// ---------------------------------------------------------------------------

fn overview_table(ui: &mut Ui, summary: &Vec<ColumnSummary>) {
    let stats: [(&str, fn(&ColumnSummary) -> Option<f64>); 8] = [
        ("count", |s| Some(s.count as f64)),
        ("mean", |s| s.mean),
        ("std", |s| s.std),
        ("min", |s| s.min),
        ("25%", |s| s.q25),
        ("50%", |s| s.median),
        ("75%", |s| s.q75),
        ("max", |s| s.max),
    ];
    let row_height = ui.text_style_height(&eframe::egui::TextStyle::Body) * 1.3;

    ScrollArea::horizontal().id_salt("overview_scroll").show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .column(TableColumn::initial(50.0))
            .columns(TableColumn::initial(72.0).at_least(56.0), summary.len())
            .header(row_height, |mut header| {
                header.col(|ui| {
                    ui.strong("");
                });
                for s in summary {
                    header.col(|ui| {
                        ui.strong(s.column.name());
                    });
                }
            })
            .body(|mut body| {
                for (label, stat) in stats {
                    body.row(row_height, |mut row| {
                        row.col(|ui| {
                            ui.strong(label);
                        });
                        for s in summary {
                            row.col(|ui| {
                                ui.label(stat(s).map_or_else(|| "NaN".to_string(), |v| format!("{v:.2}")));
                            });
                        }
                    });
                }
            });
    });
}

fn distribution_plot(ui: &mut Ui, boxes: &Vec<MonthlyBox>) {
    if boxes.is_empty() {
        ui.label("No data for the selected year.");
        return;
    }
    let palette = generate_palette(boxes.len());
    Plot::new("distribution")
        .height(PLOT_HEIGHT)
        .x_axis_label("month")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            let elems: Vec<BoxElem> = boxes
                .iter()
                .zip(&palette)
                .map(|(b, &color)| {
                    let s = &b.summary;
                    BoxElem::new(
                        b.month as f64,
                        BoxSpread::new(s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker),
                    )
                    .name(month_name(b.month))
                    .fill(color.gamma_multiply(0.6))
                    .stroke(Stroke::new(1.0, color))
                    .box_width(0.6)
                })
                .collect();
            plot_ui.box_plot(BoxPlot::new(elems));

            let outliers: PlotPoints = boxes
                .iter()
                .flat_map(|b| b.summary.outliers.iter().map(move |&v| [b.month as f64, v]))
                .collect();
            plot_ui.points(Points::new(outliers).radius(1.5).color(Color32::GRAY));
        });
}

fn decomposition_plots(ui: &mut Ui, d: &Decomposition) {
    let components: [(&str, &str, Color32, Vec<[f64; 2]>); 3] = [
        ("decomp_trend", "Trend", Color32::BLUE, defined_points(&d.trend)),
        (
            "decomp_seasonal",
            "Seasonality",
            Color32::from_rgb(255, 165, 0),
            d.seasonal.iter().enumerate().map(|(i, v)| [i as f64, *v]).collect(),
        ),
        ("decomp_resid", "Residuals", Color32::DARK_GREEN, defined_points(&d.residual)),
    ];
    for (id, name, color, points) in components {
        ui.label(name);
        Plot::new(id)
            .height(PLOT_HEIGHT * 0.6)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.line(Line::new(PlotPoints::from(points)).name(name).color(color));
            });
    }
}

fn defined_points(series: &[Option<f64>]) -> Vec<[f64; 2]> {
    series
        .iter()
        .enumerate()
        .filter_map(|(i, v)| Some([i as f64, (*v)?]))
        .collect()
}

/// Polar bar chart: one wedge per wind direction, radius = mean PM2.5.
fn wind_rose(ui: &mut Ui, bars: &Vec<WindBar>) {
    if bars.is_empty() {
        ui.label("No wind direction recorded for the selected period.");
        return;
    }
    let width = std::f64::consts::TAU / bars.len() as f64;
    let palette = generate_palette(bars.len());
    Plot::new("wind_rose")
        .height(PLOT_HEIGHT * 1.5)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .legend(Legend::default())
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (bar, &color) in bars.iter().zip(&palette) {
                let Some(radius) = bar.mean else { continue };
                plot_ui.polygon(
                    Polygon::new(PlotPoints::from(wedge(bar.angle, width, radius)))
                        .fill_color(color.gamma_multiply(0.5))
                        .stroke(Stroke::new(1.0, color))
                        .name(&bar.direction),
                );
                let (sin, cos) = bar.angle.sin_cos();
                plot_ui.text(Text::new(
                    PlotPoint::new(radius * 1.12 * cos, radius * 1.12 * sin),
                    bar.direction.as_str(),
                ));
            }
        });
}

fn wedge(angle: f64, width: f64, radius: f64) -> Vec<[f64; 2]> {
    const STEPS: usize = 12;
    let start = angle - width / 2.0;
    std::iter::once([0.0, 0.0])
        .chain((0..=STEPS).map(|k| {
            let a = start + width * k as f64 / STEPS as f64;
            [radius * a.cos(), radius * a.sin()]
        }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_keyed_skips_missing() {
        let mut means = BTreeMap::new();
        means.insert(KeyValue::Integer(1), Some(3.0));
        means.insert(KeyValue::Integer(2), None);
        means.insert(KeyValue::Text("N".into()), Some(1.0));
        assert_eq!(integer_keyed(&means).collect::<Vec<_>>(), vec![(1.0, 3.0)]);
    }

    #[test]
    fn test_hourly_gradient_spans_present_values() {
        let g = value_range_gradient(&[Some(40.0), None, Some(90.0), Some(65.0)]);
        let cool = Gradient::coolwarm(-1.0, 1.0);
        assert_eq!(g.color_for(Some(40.0)), cool.color_for(Some(-1.0)));
        assert_eq!(g.color_for(Some(90.0)), cool.color_for(Some(1.0)));
        assert_eq!(g.color_for(Some(65.0)), cool.color_for(Some(0.0)));
    }

    #[test]
    fn test_wedge_starts_at_origin() {
        let pts = wedge(0.0, std::f64::consts::FRAC_PI_2, 2.0);
        assert_eq!(pts.len(), 14);
        assert_eq!(pts[0], [0.0, 0.0]);
        for [x, y] in &pts[1..] {
            assert!(((x * x + y * y).sqrt() - 2.0).abs() < 1e-9);
        }
    }
}
