//! PDF Report Generator Module
//! Produces the one-page production report (title, view label, bar chart,
//! trend chart).
//!
//! The PDF object structure is assembled directly since the crate stack has
//! no high-level PDF writer; chart images are embedded as JPEG XObjects
//! (DCTDecode) so no extra compression layer is needed.

use crate::charts::{RenderError, StaticChartRenderer};
use crate::stats::{AggregatedRecord, TimeView};
use image::codecs::jpeg::JpegEncoder;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to render report charts: {0}")]
    Render(#[from] RenderError),
    #[error("failed to encode chart image: {0}")]
    Encode(#[from] image::ImageError),
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// A4 page in points.
const PAGE_WIDTH: f64 = 595.0;
const PAGE_HEIGHT: f64 = 842.0;

/// Chart images are rendered at 900x500 and placed at 450x250 pt.
const CHART_PX: (u32, u32) = (900, 500);
const IMAGE_SIZE: (f64, f64) = (450.0, 250.0);
const MARGIN: f64 = 72.0;

const JPEG_QUALITY: u8 = 90;

pub struct PdfReport;

impl PdfReport {
    /// Render the current aggregate's charts and write the report to `path`.
    /// One-shot and synchronous; the file is complete when this returns.
    pub fn generate(
        path: &Path,
        view: TimeView,
        aggregate: &[AggregatedRecord],
    ) -> Result<(), ReportError> {
        let (w, h) = CHART_PX;
        let bar = StaticChartRenderer::render_bar_chart(aggregate, view, w, h)?;
        let trend = StaticChartRenderer::render_trend_chart(aggregate, view, w, h)?;

        let mut bar_jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut bar_jpeg, JPEG_QUALITY).encode_image(&bar)?;
        let mut trend_jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut trend_jpeg, JPEG_QUALITY).encode_image(&trend)?;

        let pdf = Self::build_pdf(&bar_jpeg, &trend_jpeg, view);
        fs::write(path, &pdf)?;

        info!(path = %path.display(), bytes = pdf.len(), "report written");
        Ok(())
    }

    /// Assemble the PDF byte stream: header, 8 numbered objects, xref,
    /// trailer.
    pub(crate) fn build_pdf(bar_jpeg: &[u8], trend_jpeg: &[u8], view: TimeView) -> Vec<u8> {
        let (img_w, img_h) = IMAGE_SIZE;
        let (px_w, px_h) = CHART_PX;

        // Page layout, measured from the bottom-left corner.
        let title_y = PAGE_HEIGHT - 52.0;
        let view_y = title_y - 24.0;
        let bar_heading_y = view_y - 32.0;
        let bar_y = bar_heading_y - 14.0 - img_h;
        let trend_heading_y = bar_y - 30.0;
        let trend_y = trend_heading_y - 14.0 - img_h;

        let content = format!(
            "BT /F1 20 Tf {m} {title_y} Td ({title}) Tj ET\n\
             BT /F2 12 Tf {m} {view_y} Td (View: {view}) Tj ET\n\
             BT /F1 14 Tf {m} {bar_heading_y} Td (Truck Load Summary) Tj ET\n\
             q {img_w} 0 0 {img_h} {m} {bar_y} cm /Im1 Do Q\n\
             BT /F1 14 Tf {m} {trend_heading_y} Td (Production Trend) Tj ET\n\
             q {img_w} 0 0 {img_h} {m} {trend_y} cm /Im2 Do Q\n",
            m = MARGIN,
            title = escape_text("Quarry Truck Production Report"),
            view = escape_text(view.label()),
        );

        let mut out: Vec<u8> = Vec::new();
        out.extend_from_slice(b"%PDF-1.4\n");
        let mut offsets: Vec<usize> = Vec::new();

        // 1. Catalog
        append_object(&mut out, &mut offsets, 1, b"<< /Type /Catalog /Pages 2 0 R >>");

        // 2. Page tree
        append_object(
            &mut out,
            &mut offsets,
            2,
            b"<< /Type /Pages /Kids [3 0 R] /Count 1 >>",
        );

        // 3. The report page
        let page = format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
             /Resources << /Font << /F1 4 0 R /F2 5 0 R >> \
             /XObject << /Im1 7 0 R /Im2 8 0 R >> >> /Contents 6 0 R >>",
            PAGE_WIDTH, PAGE_HEIGHT
        );
        append_object(&mut out, &mut offsets, 3, page.as_bytes());

        // 4-5. Fonts
        append_object(
            &mut out,
            &mut offsets,
            4,
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold >>",
        );
        append_object(
            &mut out,
            &mut offsets,
            5,
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>",
        );

        // 6. Content stream
        append_stream(
            &mut out,
            &mut offsets,
            6,
            &format!("<< /Length {} >>", content.len()),
            content.as_bytes(),
        );

        // 7-8. Chart images
        for (id, jpeg) in [(7, bar_jpeg), (8, trend_jpeg)] {
            let dict = format!(
                "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
                 /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /DCTDecode \
                 /Length {} >>",
                px_w,
                px_h,
                jpeg.len()
            );
            append_stream(&mut out, &mut offsets, id, &dict, jpeg);
        }

        // Cross-reference table and trailer
        let xref_at = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", offsets.len() + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for offset in &offsets {
            out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer << /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                offsets.len() + 1,
                xref_at
            )
            .as_bytes(),
        );

        out
    }
}

fn append_object(out: &mut Vec<u8>, offsets: &mut Vec<usize>, id: usize, body: &[u8]) {
    offsets.push(out.len());
    out.extend_from_slice(format!("{} 0 obj\n", id).as_bytes());
    out.extend_from_slice(body);
    out.extend_from_slice(b"\nendobj\n");
}

fn append_stream(out: &mut Vec<u8>, offsets: &mut Vec<usize>, id: usize, dict: &str, data: &[u8]) {
    offsets.push(out.len());
    out.extend_from_slice(format!("{} 0 obj\n{}\nstream\n", id, dict).as_bytes());
    out.extend_from_slice(data);
    out.extend_from_slice(b"\nendstream\nendobj\n");
}

/// Escape the characters PDF string literals reserve.
fn escape_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}
