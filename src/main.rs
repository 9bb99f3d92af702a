mod app;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;

use std::sync::Arc;

use anyhow::Context;
use app::DashboardApp;
use clap::Parser;
use config::{Cli, DashboardConfig};
use eframe::egui;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = DashboardConfig::resolve(&cli)?;

    // Loaded once; the dashboard only ever reads it.
    let dataset = data::loader::load_and_impute(&config.data_path, &config.forward_fill_columns()?)?;
    log::info!(
        "Loaded {} rows from {} (years {:?}, columns {})",
        dataset.len(),
        config.data_path.display(),
        dataset.years(),
        dataset.columns().len()
    );

    let state = AppState::new(Arc::new(dataset), &config)?;
    let title = config.title.clone();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([640.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
    .context("running the dashboard window")
}
