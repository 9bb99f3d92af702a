use std::path::Path;
use std::sync::Arc;

use crate::config::DashboardConfig;
use crate::data::charts::{render, ChartInputs, RenderSettings, Selection};
use crate::data::loader::load_and_impute;
use crate::data::model::{Column, Dataset, Pollutant};
use crate::error::Result;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset, shared read-only.
    pub dataset: Arc<Dataset>,

    /// Current user choices.
    pub selection: Selection,

    /// Chart inputs for the current selection (recomputed on every change).
    pub charts: ChartInputs,

    pub settings: RenderSettings,

    /// Columns forward-filled whenever a dataset is loaded.
    pub fill_columns: Vec<Column>,

    /// Title shown at the top of the central panel.
    pub title: String,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(dataset: Arc<Dataset>, config: &DashboardConfig) -> Result<Self> {
        let mut selection = Selection::initial(&dataset, &config.correlation_columns()?);
        if let Some(year) = config.year {
            selection.year = year;
        }
        if let Some(month) = config.initial_month()? {
            selection.month = month;
        }
        let settings = config.render_settings();
        let fill_columns = config.forward_fill_columns()?;
        let charts = render(&dataset, &selection, &settings);
        let state = Self {
            dataset,
            selection,
            charts,
            settings,
            fill_columns,
            title: config.title.clone(),
            status_message: None,
        };
        state.log_notices();
        Ok(state)
    }

    /// Re-run the pipeline for the current selection.
    pub fn refresh(&mut self) {
        self.charts = render(&self.dataset, &self.selection, &self.settings);
        self.log_notices();
    }

    fn log_notices(&self) {
        for (chart, notice) in self.charts.notices() {
            log::warn!("{chart}: {notice}");
        }
    }

    /// Replace the dataset with a freshly loaded (and imputed) one. On failure
    /// the current dataset stays and the error is shown in the status line.
    pub fn reload(&mut self, path: &Path) {
        match load_and_impute(path, &self.fill_columns) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} rows from {} (years {:?})",
                    dataset.len(),
                    path.display(),
                    dataset.years()
                );
                let columns = self.selection.correlation_columns.clone();
                self.selection = Selection {
                    pollutant: self.selection.pollutant,
                    ..Selection::initial(&dataset, &columns)
                };
                self.dataset = Arc::new(dataset);
                self.status_message = None;
                self.refresh();
            }
            Err(e) => {
                log::error!("Failed to load file: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    pub fn set_year(&mut self, year: i32) {
        if self.selection.year != year {
            self.selection.year = year;
            self.refresh();
        }
    }

    pub fn set_month(&mut self, month: u32) {
        if self.selection.month != month {
            self.selection.month = month;
            self.refresh();
        }
    }

    pub fn set_pollutant(&mut self, pollutant: Pollutant) {
        if self.selection.pollutant != pollutant {
            self.selection.pollutant = pollutant;
            self.refresh();
        }
    }

    /// Toggle a single column in the interactive correlation set, keeping
    /// canonical column order.
    pub fn toggle_correlation_column(&mut self, column: Column) {
        let cols = &mut self.selection.correlation_columns;
        if let Some(pos) = cols.iter().position(|c| *c == column) {
            cols.remove(pos);
        } else {
            cols.push(column);
            cols.sort();
        }
        self.refresh();
    }
}
