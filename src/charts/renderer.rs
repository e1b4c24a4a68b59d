//! Static Chart Renderer
//! Renders the report's bar and trend charts to RGB images with plotters,
//! matching the colors and capacity line of the interactive charts.

use crate::stats::{AggregatedRecord, TimeView, MAX_CAPACITY_TONS};
use crate::charts::plotter::{date_from_day, day_number, trend_series, truck_totals};
use image::RgbImage;
use plotters::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("chart drawing failed: {0}")]
    Draw(String),
    #[error("image buffer conversion failed")]
    Buffer,
}

fn draw_err<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Draw(err.to_string())
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render the per-truck totals bar chart.
    pub fn render_bar_chart(
        aggregate: &[AggregatedRecord],
        view: TimeView,
        width: u32,
        height: u32,
    ) -> Result<RgbImage, RenderError> {
        let totals = truck_totals(aggregate);
        let mut buffer = vec![255u8; (width * height * 3) as usize];

        {
            let root =
                BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(draw_err)?;

            if totals.is_empty() {
                Self::draw_no_data(&root, width, height)?;
            } else {
                let mut y_max = totals.iter().map(|(_, t)| *t).fold(0.0f64, f64::max);
                if view == TimeView::Daily {
                    y_max = y_max.max(MAX_CAPACITY_TONS);
                }
                let y_max = (y_max * 1.15).max(1.0);

                let mut chart = ChartBuilder::on(&root)
                    .caption(
                        format!("{} Truck Load", view.label()),
                        ("sans-serif", 28),
                    )
                    .margin(12)
                    .x_label_area_size(40)
                    .y_label_area_size(50)
                    .build_cartesian_2d((0usize..totals.len()).into_segmented(), 0f64..y_max)
                    .map_err(draw_err)?;

                let labels = totals.clone();
                chart
                    .configure_mesh()
                    .disable_x_mesh()
                    .x_desc("Truck")
                    .y_desc("Total Tons")
                    .x_label_formatter(&|seg| match seg {
                        SegmentValue::CenterOf(i) => labels
                            .get(*i)
                            .map(|(truck, _)| truck.name().to_string())
                            .unwrap_or_default(),
                        _ => String::new(),
                    })
                    .draw()
                    .map_err(draw_err)?;

                chart
                    .draw_series(totals.iter().enumerate().map(|(i, (truck, tons))| {
                        let (r, g, b) = truck.rgb();
                        let mut bar = Rectangle::new(
                            [
                                (SegmentValue::Exact(i), 0.0),
                                (SegmentValue::Exact(i + 1), *tons),
                            ],
                            RGBColor(r, g, b).filled(),
                        );
                        bar.set_margin(0, 0, 14, 14);
                        bar
                    }))
                    .map_err(draw_err)?;

                if view == TimeView::Daily {
                    chart
                        .draw_series(DashedLineSeries::new(
                            [
                                (SegmentValue::Exact(0), MAX_CAPACITY_TONS),
                                (SegmentValue::Exact(totals.len()), MAX_CAPACITY_TONS),
                            ],
                            6,
                            4,
                            RED.stroke_width(2),
                        ))
                        .map_err(draw_err)?;
                }
            }

            root.present().map_err(draw_err)?;
        }

        RgbImage::from_raw(width, height, buffer).ok_or(RenderError::Buffer)
    }

    /// Render the tonnage trend line chart across periods.
    pub fn render_trend_chart(
        aggregate: &[AggregatedRecord],
        view: TimeView,
        width: u32,
        height: u32,
    ) -> Result<RgbImage, RenderError> {
        let series = trend_series(aggregate);
        let mut buffer = vec![255u8; (width * height * 3) as usize];

        {
            let root =
                BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(draw_err)?;

            if series.is_empty() {
                Self::draw_no_data(&root, width, height)?;
            } else {
                let days: Vec<f64> = series
                    .iter()
                    .flat_map(|(_, points)| points.iter().map(|(d, _)| day_number(*d)))
                    .collect();
                let x_min = days.iter().cloned().fold(f64::INFINITY, f64::min) - 1.0;
                let x_max = days.iter().cloned().fold(f64::NEG_INFINITY, f64::max) + 1.0;

                let mut y_max = series
                    .iter()
                    .flat_map(|(_, points)| points.iter().map(|(_, t)| *t))
                    .fold(0.0f64, f64::max);
                if view == TimeView::Daily {
                    y_max = y_max.max(MAX_CAPACITY_TONS);
                }
                let y_max = (y_max * 1.15).max(1.0);

                let mut chart = ChartBuilder::on(&root)
                    .caption("Production Trend", ("sans-serif", 28))
                    .margin(12)
                    .x_label_area_size(40)
                    .y_label_area_size(50)
                    .build_cartesian_2d(x_min..x_max, 0f64..y_max)
                    .map_err(draw_err)?;

                chart
                    .configure_mesh()
                    .x_desc("Period")
                    .y_desc("Total Tons")
                    .x_labels(6)
                    .x_label_formatter(&|day| {
                        date_from_day(*day)
                            .map(|d| d.format("%Y-%m-%d").to_string())
                            .unwrap_or_default()
                    })
                    .draw()
                    .map_err(draw_err)?;

                for (truck, points) in &series {
                    let (r, g, b) = truck.rgb();
                    let color = RGBColor(r, g, b);

                    chart
                        .draw_series(LineSeries::new(
                            points.iter().map(|(d, t)| (day_number(*d), *t)),
                            color.stroke_width(2),
                        ))
                        .map_err(draw_err)?
                        .label(truck.name())
                        .legend(move |(x, y)| {
                            PathElement::new(vec![(x, y), (x + 16, y)], color.stroke_width(2))
                        });

                    chart
                        .draw_series(
                            points
                                .iter()
                                .map(|(d, t)| Circle::new((day_number(*d), *t), 3, color.filled())),
                        )
                        .map_err(draw_err)?;
                }

                if view == TimeView::Daily {
                    chart
                        .draw_series(DashedLineSeries::new(
                            [(x_min, MAX_CAPACITY_TONS), (x_max, MAX_CAPACITY_TONS)],
                            6,
                            4,
                            RED.stroke_width(2),
                        ))
                        .map_err(draw_err)?;
                }

                chart
                    .configure_series_labels()
                    .background_style(WHITE.mix(0.8))
                    .border_style(BLACK)
                    .draw()
                    .map_err(draw_err)?;
            }

            root.present().map_err(draw_err)?;
        }

        RgbImage::from_raw(width, height, buffer).ok_or(RenderError::Buffer)
    }

    fn draw_no_data(
        root: &DrawingArea<BitMapBackend<'_>, plotters::coord::Shift>,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        root.draw(&Text::new(
            "No data for the current filter",
            (width as i32 / 2 - 120, height as i32 / 2),
            ("sans-serif", 20),
        ))
        .map_err(draw_err)
    }
}
