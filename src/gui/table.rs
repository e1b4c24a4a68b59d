//! Record Table Widget
//! Shows the normalized record set, filtered by truck selection only.
//! The time view and date filters deliberately do not apply here, so the
//! table always shows the full history for the selected trucks.

use crate::data::{NormalizedRecord, Truck};
use egui::{RichText, ScrollArea};
use std::collections::BTreeSet;

const TABLE_HEIGHT: f32 = 280.0;

pub struct RecordTable;

impl RecordTable {
    pub fn show(ui: &mut egui::Ui, records: &[NormalizedRecord], trucks: &BTreeSet<Truck>) {
        let visible: Vec<&NormalizedRecord> = records
            .iter()
            .filter(|r| trucks.contains(&r.truck))
            .collect();

        if visible.is_empty() {
            ui.label(RichText::new("No records for the selected trucks").size(13.0));
            return;
        }

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ScrollArea::vertical()
                    .id_salt("record_table")
                    .max_height(TABLE_HEIGHT)
                    .show(ui, |ui| {
                        egui::Grid::new("record_table_grid")
                            .striped(true)
                            .min_col_width(70.0)
                            .spacing([14.0, 4.0])
                            .show(ui, |ui| {
                                ui.label(RichText::new("Date").strong().size(12.0));
                                ui.label(RichText::new("Truck").strong().size(12.0));
                                ui.label(RichText::new("Crusher").strong().size(12.0));
                                ui.label(RichText::new("ROM Pad").strong().size(12.0));
                                ui.label(RichText::new("Total").strong().size(12.0));
                                ui.end_row();

                                for record in visible {
                                    let date_text = record
                                        .date
                                        .map(|d| d.format("%Y-%m-%d").to_string())
                                        .unwrap_or_else(|| "invalid".to_string());
                                    ui.label(RichText::new(date_text).size(12.0));
                                    ui.label(RichText::new(record.truck.name()).size(12.0));
                                    ui.label(RichText::new(tons_text(record.crusher_tons)).size(12.0));
                                    ui.label(RichText::new(tons_text(record.rom_pad_tons)).size(12.0));
                                    ui.label(
                                        RichText::new(format!("{:.1}", record.total_tons()))
                                            .size(12.0),
                                    );
                                    ui.end_row();
                                }
                            });
                    });
            });
    }
}

/// Missing tonnage shows as a dash, distinct from an entered zero.
fn tons_text(tons: Option<f64>) -> String {
    match tons {
        Some(v) => format!("{:.1}", v),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tonnage_renders_as_dash() {
        assert_eq!(tons_text(None), "-");
        assert_eq!(tons_text(Some(0.0)), "0.0");
        assert_eq!(tons_text(Some(12.34)), "12.3");
    }
}
