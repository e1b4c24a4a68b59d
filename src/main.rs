//! Quarry Truck Production Dashboard
//!
//! Loads a two-row-header production sheet, normalizes it into per-truck
//! records, and shows filterable tonnage charts with PDF report export.

mod charts;
mod data;
mod gui;
mod report;
mod stats;

use eframe::egui;
use gui::QuarryApp;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> eframe::Result<()> {
    // Init logging
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    // Optional source path; loading it is part of startup and a failure
    // here is fatal since the dashboard cannot render without data.
    let source = std::env::args().nth(1).map(PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("Quarry Truck Production Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "Quarry Truck Production Dashboard",
        options,
        Box::new(move |cc| match source {
            Some(path) => QuarryApp::with_source(cc, &path)
                .map(|app| Box::new(app) as Box<dyn eframe::App>)
                .map_err(Into::into),
            None => Ok(Box::new(QuarryApp::new(cc))),
        }),
    )
}
