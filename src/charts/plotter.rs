//! Chart Plotter Module
//! Interactive dashboard charts using egui_plot.

use crate::data::Truck;
use crate::stats::{AggregatedRecord, TimeView, MAX_CAPACITY_TONS};
use chrono::{Duration, NaiveDate};
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, HLine, Legend, Line, LineStyle, Plot, PlotPoints, Points};

const BAR_CHART_HEIGHT: f32 = 260.0;
const TREND_CHART_HEIGHT: f32 = 260.0;

/// Per-truck totals across all periods of the aggregate, in fleet order.
/// Trucks absent from the aggregate are omitted.
pub fn truck_totals(aggregate: &[AggregatedRecord]) -> Vec<(Truck, f64)> {
    Truck::ALL
        .iter()
        .filter_map(|&truck| {
            let mut seen = false;
            let total: f64 = aggregate
                .iter()
                .filter(|a| a.truck == truck)
                .map(|a| {
                    seen = true;
                    a.total_tons
                })
                .sum();
            seen.then_some((truck, total))
        })
        .collect()
}

/// Per-truck (period, tons) series in fleet order, each sorted by period.
pub fn trend_series(aggregate: &[AggregatedRecord]) -> Vec<(Truck, Vec<(NaiveDate, f64)>)> {
    Truck::ALL
        .iter()
        .filter_map(|&truck| {
            let mut points: Vec<(NaiveDate, f64)> = aggregate
                .iter()
                .filter(|a| a.truck == truck)
                .map(|a| (a.period, a.total_tons))
                .collect();
            if points.is_empty() {
                return None;
            }
            points.sort_by_key(|(period, _)| *period);
            Some((truck, points))
        })
        .collect()
}

/// Days since the Unix epoch, used as the trend chart's x coordinate.
pub fn day_number(date: NaiveDate) -> f64 {
    (date - NaiveDate::default()).num_days() as f64
}

pub fn date_from_day(day: f64) -> Option<NaiveDate> {
    NaiveDate::default().checked_add_signed(Duration::days(day.round() as i64))
}

/// Draws the dashboard's interactive charts.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn truck_color(truck: Truck) -> Color32 {
        let (r, g, b) = truck.rgb();
        Color32::from_rgb(r, g, b)
    }

    fn no_data(ui: &mut egui::Ui) {
        ui.centered_and_justified(|ui| {
            ui.label(RichText::new("No data for the current filter").size(16.0));
        });
    }

    /// Bar chart of per-truck totals for the current aggregate.
    /// The dashed capacity line only makes sense against a single day.
    pub fn draw_bar_chart(ui: &mut egui::Ui, aggregate: &[AggregatedRecord], view: TimeView) {
        let totals = truck_totals(aggregate);
        if totals.is_empty() {
            Self::no_data(ui);
            return;
        }

        let names: Vec<String> = totals.iter().map(|(t, _)| t.name().to_string()).collect();
        let bars: Vec<Bar> = totals
            .iter()
            .enumerate()
            .map(|(i, (truck, tons))| {
                Bar::new(i as f64, *tons)
                    .width(0.6)
                    .name(truck.name())
                    .fill(Self::truck_color(*truck))
            })
            .collect();

        Plot::new("truck_load_bar")
            .height(BAR_CHART_HEIGHT)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label("Truck")
            .y_axis_label("Total Tons")
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round() as usize;
                if (mark.value - idx as f64).abs() < 1e-6 {
                    names.get(idx).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars));
                if view == TimeView::Daily {
                    plot_ui.hline(
                        HLine::new(MAX_CAPACITY_TONS)
                            .color(Color32::RED)
                            .style(LineStyle::dashed_loose())
                            .name("Max Capacity"),
                    );
                }
            });
    }

    /// Line chart of tonnage per truck across periods.
    pub fn draw_trend_chart(ui: &mut egui::Ui, aggregate: &[AggregatedRecord], view: TimeView) {
        let series = trend_series(aggregate);
        if series.is_empty() {
            Self::no_data(ui);
            return;
        }

        Plot::new("truck_load_trend")
            .height(TREND_CHART_HEIGHT)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label("Period")
            .y_axis_label("Total Tons")
            .x_axis_formatter(|mark, _range| {
                date_from_day(mark.value)
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                for (truck, points) in &series {
                    let color = Self::truck_color(*truck);
                    let plot_points: PlotPoints = points
                        .iter()
                        .map(|(period, tons)| [day_number(*period), *tons])
                        .collect();

                    plot_ui.line(
                        Line::new(plot_points)
                            .color(color)
                            .width(2.0)
                            .name(truck.name()),
                    );

                    let markers: PlotPoints = points
                        .iter()
                        .map(|(period, tons)| [day_number(*period), *tons])
                        .collect();
                    plot_ui.points(Points::new(markers).radius(3.0).color(color));
                }

                if view == TimeView::Daily {
                    plot_ui.hline(
                        HLine::new(MAX_CAPACITY_TONS)
                            .color(Color32::RED)
                            .style(LineStyle::dashed_loose())
                            .name("Max Capacity"),
                    );
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agg(date: &str, truck: Truck, tons: f64) -> AggregatedRecord {
        AggregatedRecord {
            period: date.parse().unwrap(),
            truck,
            total_tons: tons,
        }
    }

    #[test]
    fn truck_totals_sum_across_periods_in_fleet_order() {
        let aggregate = vec![
            agg("2024-01-08", Truck::Black, 4.0),
            agg("2024-01-01", Truck::Lemon, 8.0),
            agg("2024-01-08", Truck::Lemon, 2.0),
        ];

        let totals = truck_totals(&aggregate);
        assert_eq!(totals, vec![(Truck::Lemon, 10.0), (Truck::Black, 4.0)]);
    }

    #[test]
    fn trend_series_is_sorted_by_period() {
        let aggregate = vec![
            agg("2024-02-01", Truck::Blue, 3.0),
            agg("2024-01-01", Truck::Blue, 1.0),
            agg("2024-01-15", Truck::Blue, 2.0),
        ];

        let series = trend_series(&aggregate);
        assert_eq!(series.len(), 1);
        let (truck, points) = &series[0];
        assert_eq!(*truck, Truck::Blue);
        let tons: Vec<f64> = points.iter().map(|(_, t)| *t).collect();
        assert_eq!(tons, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn day_number_round_trips() {
        let date: NaiveDate = "2024-06-15".parse().unwrap();
        assert_eq!(date_from_day(day_number(date)), Some(date));
        assert_eq!(day_number(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()), 0.0);
    }

    #[test]
    fn empty_aggregate_yields_empty_series() {
        assert!(truck_totals(&[]).is_empty());
        assert!(trend_series(&[]).is_empty());
    }
}
