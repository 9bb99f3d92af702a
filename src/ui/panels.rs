use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::month_name;
use crate::data::model::{Column, Pollutant};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – selection widgets
// ---------------------------------------------------------------------------

/// Render the left selection panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("User Input Features");
    ui.separator();

    if state.dataset.is_empty() {
        ui.label("No rows loaded.");
        return;
    }

    // Clone what we need so we can mutate state inside the closures.
    let years: Vec<i32> = state.dataset.years().iter().copied().collect();
    let months: Vec<u32> = state.dataset.months().iter().copied().collect();
    let columns: Vec<Column> = state.dataset.columns().to_vec();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Select Year");
            let current = state.selection.year;
            egui::ComboBox::from_id_salt("year")
                .selected_text(current.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    for &year in &years {
                        if ui.selectable_label(current == year, year.to_string()).clicked() {
                            state.set_year(year);
                        }
                    }
                });

            ui.strong("Select Month");
            let current = state.selection.month;
            egui::ComboBox::from_id_salt("month")
                .selected_text(month_name(current))
                .show_ui(ui, |ui: &mut Ui| {
                    for &month in &months {
                        if ui.selectable_label(current == month, month_name(month)).clicked() {
                            state.set_month(month);
                        }
                    }
                });

            ui.strong("Select Pollutant");
            let current = state.selection.pollutant;
            egui::ComboBox::from_id_salt("pollutant")
                .selected_text(current.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    for pollutant in Pollutant::ALL {
                        if ui
                            .selectable_label(current == pollutant, pollutant.to_string())
                            .clicked()
                        {
                            state.set_pollutant(pollutant);
                        }
                    }
                });
            ui.separator();

            let n_selected = state.selection.correlation_columns.len();
            let header_text = format!("Correlation columns  ({n_selected}/{})", columns.len());
            egui::CollapsingHeader::new(RichText::new(header_text).strong())
                .id_salt("correlation_columns")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    for &col in &columns {
                        let mut checked = state.selection.correlation_columns.contains(&col);
                        if ui.checkbox(&mut checked, col.name()).changed() {
                            state.toggle_correlation_column(col);
                        }
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(station) = state.dataset.station() {
            ui.strong(station);
        }
        ui.label(format!(
            "{} rows loaded, {} in {} {}",
            state.dataset.len(),
            state.charts.view_rows,
            month_name(state.selection.month),
            state.selection.year
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open station data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.reload(&path);
    }
}
