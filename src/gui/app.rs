//! Quarry Dashboard Main Application
//! Main window with control panel, KPI row, charts, and the record table.

use crate::charts::ChartPlotter;
use crate::data::{normalize, NormalizedRecord, SheetLoader, SheetSchema};
use crate::gui::{ControlPanel, ControlPanelAction, RecordTable};
use crate::report::PdfReport;
use crate::stats::{aggregate, format_tons, AggregatedRecord, SummaryMetrics, TimeView};
use anyhow::Context;
use egui::{RichText, ScrollArea, SidePanel};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{error, warn};

/// Optional schema override file, read from the working directory.
const SCHEMA_OVERRIDE_FILE: &str = "truck_schema.json";

/// Main application window.
pub struct QuarryApp {
    loader: SheetLoader,
    schema: SheetSchema,
    control_panel: ControlPanel,
    records: Vec<NormalizedRecord>,
    aggregate: Vec<AggregatedRecord>,
    metrics: SummaryMetrics,
}

impl QuarryApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            loader: SheetLoader::new(),
            schema: Self::load_schema(),
            control_panel: ControlPanel::new(),
            records: Vec::new(),
            aggregate: Vec::new(),
            metrics: SummaryMetrics::from_aggregate(&[], TimeView::default()),
        }
    }

    /// Start with a source given on the command line. A source that cannot
    /// be loaded here is fatal: the dashboard has nothing to render.
    pub fn with_source(cc: &eframe::CreationContext<'_>, path: &Path) -> anyhow::Result<Self> {
        let mut app = Self::new(cc);
        app.load_source(path)
            .with_context(|| format!("failed to load {}", path.display()))?;
        Ok(app)
    }

    fn load_schema() -> SheetSchema {
        let override_path = Path::new(SCHEMA_OVERRIDE_FILE);
        if override_path.exists() {
            match SheetSchema::from_json_file(override_path) {
                Ok(schema) => return schema,
                Err(e) => {
                    warn!(error = %e, "ignoring invalid schema override, using default layout")
                }
            }
        }
        SheetSchema::default_layout()
    }

    fn load_source(&mut self, path: &Path) -> anyhow::Result<()> {
        let sheet = self.loader.load(path)?;
        self.records = normalize(&sheet, &self.schema)?;

        let dates: BTreeSet<_> = self.records.iter().filter_map(|r| r.date).collect();
        self.control_panel.update_dates(dates.into_iter().collect());
        self.control_panel.source_path = Some(path.to_path_buf());
        self.control_panel.set_status(&format!(
            "Loaded {} rows ({} records)",
            sheet.rows.len(),
            self.records.len()
        ));

        self.recompute();
        Ok(())
    }

    /// One filter change, one synchronous recomputation over the cached
    /// normalized set.
    fn recompute(&mut self) {
        self.aggregate = aggregate(&self.records, &self.control_panel.filter());
        self.metrics = SummaryMetrics::from_aggregate(&self.aggregate, self.control_panel.view);
    }

    fn handle_browse(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Production sheets", &["xlsx", "xlsm", "csv"])
            .pick_file()
        {
            if let Err(e) = self.load_source(&path) {
                error!(error = %e, "source load failed");
                self.control_panel.set_status(&format!("Error: {:#}", e));
            }
        }
    }

    fn handle_export(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PDF", &["pdf"])
            .set_file_name("quarry_truck_report.pdf")
            .save_file()
        else {
            return; // User cancelled
        };

        match PdfReport::generate(&path, self.control_panel.view, &self.aggregate) {
            Ok(()) => {
                self.control_panel
                    .set_status(&format!("Report exported to {}", path.display()));
                // Best effort; the file is on disk either way.
                let _ = open::that(&path);
            }
            Err(e) => {
                error!(error = %e, "report export failed");
                self.control_panel.set_status(&format!("Error: {}", e));
            }
        }
    }

    fn metric_box(ui: &mut egui::Ui, label: &str, value: String) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.label(RichText::new(label).size(12.0).color(egui::Color32::GRAY));
                    ui.label(RichText::new(value).size(20.0).strong());
                });
            });
    }

    fn show_dashboard(&mut self, ui: &mut egui::Ui) {
        let view = self.control_panel.view;

        ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
            // KPI row
            ui.horizontal(|ui| {
                Self::metric_box(ui, "Total Tons", format_tons(self.metrics.total_tons));
                Self::metric_box(
                    ui,
                    "Average Truck Load",
                    format!("{:.1}", self.metrics.average_load),
                );
                Self::metric_box(ui, "Max Capacity", self.metrics.capacity_label());
            });

            ui.add_space(12.0);
            ui.label(
                RichText::new(format!("{} Truck Load", view.label()))
                    .size(16.0)
                    .strong(),
            );
            ChartPlotter::draw_bar_chart(ui, &self.aggregate, view);

            ui.add_space(12.0);
            ui.label(
                RichText::new("Truck Load Trend Over Time")
                    .size(16.0)
                    .strong(),
            );
            ChartPlotter::draw_trend_chart(ui, &self.aggregate, view);

            ui.add_space(12.0);
            ui.label(RichText::new("Normalized Truck Data").size(16.0).strong());
            RecordTable::show(ui, &self.records, &self.control_panel.selected_trucks());
        });
    }
}

impl eframe::App for QuarryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - controls
        SidePanel::left("control_panel")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::BrowseSource => self.handle_browse(),
                        ControlPanelAction::FiltersChanged => self.recompute(),
                        ControlPanelAction::ExportReport => self.handle_export(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - KPIs, charts, table
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.records.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new("Load a production sheet to begin").size(18.0));
                });
            } else {
                self.show_dashboard(ui);
            }
        });
    }
}
