//! Control Panel Widget
//! Left side panel with source selection and filter controls.

use crate::charts::ChartPlotter;
use crate::data::Truck;
use crate::stats::{FilterSettings, TimeView};
use chrono::NaiveDate;
use egui::{Color32, ComboBox, RichText};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Left side control panel: data source, time view, truck selection,
/// date picker, and report export.
pub struct ControlPanel {
    pub source_path: Option<PathBuf>,
    pub view: TimeView,
    pub truck_selected: [bool; 4],
    pub selected_date: Option<NaiveDate>,
    pub available_dates: Vec<NaiveDate>,
    pub export_enabled: bool,
    pub status: String,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            source_path: None,
            view: TimeView::default(),
            truck_selected: [true; 4],
            selected_date: None,
            available_dates: Vec::new(),
            export_enabled: false,
            status: "No source loaded".to_string(),
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the pickable dates after a source load. The earliest date
    /// becomes the Daily selection, as the original dashboard defaulted.
    pub fn update_dates(&mut self, dates: Vec<NaiveDate>) {
        self.selected_date = dates.first().copied();
        self.available_dates = dates;
        self.export_enabled = true;
    }

    /// Trucks currently ticked, in fleet order.
    pub fn selected_trucks(&self) -> BTreeSet<Truck> {
        Truck::ALL
            .iter()
            .zip(self.truck_selected.iter())
            .filter(|(_, &on)| on)
            .map(|(&truck, _)| truck)
            .collect()
    }

    /// Resolved filter values for the aggregator.
    pub fn filter(&self) -> FilterSettings {
        FilterSettings {
            view: self.view,
            trucks: self.selected_trucks(),
            date: (self.view == TimeView::Daily)
                .then_some(self.selected_date)
                .flatten(),
        }
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    /// Draw the control panel.
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🚚 Quarry Dashboard")
                    .size(20.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Truck Production")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .source_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if self.source_path.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseSource;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Filters Section =====
        ui.label(RichText::new("🔧 Filters").size(14.0).strong());
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            ui.add_sized([90.0, 20.0], egui::Label::new("Time View:"));
            ComboBox::from_id_salt("time_view")
                .width(140.0)
                .selected_text(self.view.label())
                .show_ui(ui, |ui| {
                    for view in TimeView::ALL {
                        if ui
                            .selectable_label(self.view == view, view.label())
                            .clicked()
                            && self.view != view
                        {
                            self.view = view;
                            action = ControlPanelAction::FiltersChanged;
                        }
                    }
                });
        });

        ui.add_space(8.0);
        ui.label("Trucks:");
        for (i, truck) in Truck::ALL.iter().enumerate() {
            ui.horizontal(|ui| {
                let (rect, _) =
                    ui.allocate_exact_size(egui::vec2(14.0, 14.0), egui::Sense::hover());
                ui.painter()
                    .rect_filled(rect, 3.0, ChartPlotter::truck_color(*truck));
                if ui.checkbox(&mut self.truck_selected[i], truck.name()).changed() {
                    action = ControlPanelAction::FiltersChanged;
                }
            });
        }

        if self.view == TimeView::Daily {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.add_sized([90.0, 20.0], egui::Label::new("Date:"));
                let selected_text = self
                    .selected_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "-".to_string());
                ComboBox::from_id_salt("daily_date")
                    .width(140.0)
                    .selected_text(selected_text)
                    .show_ui(ui, |ui| {
                        for &date in &self.available_dates {
                            let label = date.format("%Y-%m-%d").to_string();
                            if ui
                                .selectable_label(self.selected_date == Some(date), label)
                                .clicked()
                                && self.selected_date != Some(date)
                            {
                                self.selected_date = Some(date);
                                action = ControlPanelAction::FiltersChanged;
                            }
                        }
                    });
            });
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.export_enabled, |ui| {
                let button = egui::Button::new(RichText::new("📄 Export PDF Report").size(14.0))
                    .min_size(egui::vec2(180.0, 32.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportReport;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status =====
        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Loaded") || self.status.contains("exported") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseSource,
    FiltersChanged,
    ExportReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_reflects_truck_selection() {
        let mut panel = ControlPanel::new();
        panel.truck_selected = [true, false, true, false];

        let trucks = panel.selected_trucks();
        assert!(trucks.contains(&Truck::Lemon));
        assert!(!trucks.contains(&Truck::Blue));
        assert!(trucks.contains(&Truck::Yellow));
        assert!(!trucks.contains(&Truck::Black));
    }

    #[test]
    fn date_only_applies_in_daily_view() {
        let mut panel = ControlPanel::new();
        panel.update_dates(vec!["2024-01-01".parse().unwrap(), "2024-01-02".parse().unwrap()]);
        assert_eq!(panel.selected_date, Some("2024-01-01".parse().unwrap()));

        panel.view = TimeView::Daily;
        assert!(panel.filter().date.is_some());

        panel.view = TimeView::Weekly;
        assert!(panel.filter().date.is_none());
    }
}
