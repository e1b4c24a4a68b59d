//! Normalizer Module
//! Reshapes the wide truck-block sheet into long-form records, one per
//! (source row, truck).

use crate::data::loader::{Cell, RawSheet};
use crate::data::schema::{SchemaError, SheetSchema, Truck};
use chrono::{Duration, NaiveDate};
use tracing::info;

/// One truck's tonnage for one source row.
///
/// Tonnage stays optional through normalization so "no entry" and
/// "confirmed zero" remain distinguishable in the table view; the
/// missing-counts-as-zero policy is applied in [`total_tons`], in one place.
///
/// [`total_tons`]: NormalizedRecord::total_tons
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub date: Option<NaiveDate>,
    pub truck: Truck,
    pub crusher_tons: Option<f64>,
    pub rom_pad_tons: Option<f64>,
}

impl NormalizedRecord {
    /// Combined load for this trip row. Missing tonnage counts as zero;
    /// the total is always derived, never stored.
    pub fn total_tons(&self) -> f64 {
        self.crusher_tons.unwrap_or(0.0) + self.rom_pad_tons.unwrap_or(0.0)
    }
}

/// Reshape the sheet into one record per (row, truck block).
///
/// The schema is validated against the headers first, so a reordered source
/// fails here instead of producing silently misassigned records. Output is
/// grouped by truck block in schema order, source row order preserved
/// within each block. Rows with unparseable dates are kept (date `None`);
/// the aggregator drops them later.
pub fn normalize(
    sheet: &RawSheet,
    schema: &SheetSchema,
) -> Result<Vec<NormalizedRecord>, SchemaError> {
    schema.validate(&sheet.headers)?;

    let mut records = Vec::with_capacity(sheet.rows.len() * schema.blocks.len());

    for block in &schema.blocks {
        for row in &sheet.rows {
            records.push(NormalizedRecord {
                date: parse_date(row.get(schema.date_col)),
                truck: block.truck,
                crusher_tons: parse_tons(row.get(block.crusher_col)),
                rom_pad_tons: parse_tons(row.get(block.rom_pad_col)),
            });
        }
    }

    info!(
        rows = sheet.rows.len(),
        records = records.len(),
        "normalized production sheet"
    );

    Ok(records)
}

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%Y/%m/%d"];

fn parse_date(cell: Option<&Cell>) -> Option<NaiveDate> {
    match cell? {
        Cell::Date(date) => Some(*date),
        Cell::Number(serial) => excel_serial_to_date(*serial),
        Cell::Text(text) => DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(text.trim(), fmt).ok()),
        Cell::Empty => None,
    }
}

/// Convert an Excel date serial to a calendar date.
/// Epoch is 1899-12-30, adjusted for Excel's leap-year bug.
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if serial <= 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial as i64))
}

fn parse_tons(cell: Option<&Cell>) -> Option<f64> {
    match cell? {
        Cell::Number(n) => Some(*n),
        Cell::Text(text) => text.replace(',', "").trim().parse::<f64>().ok(),
        Cell::Date(_) | Cell::Empty => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(rows: Vec<Vec<Cell>>) -> RawSheet {
        let mut headers = vec!["Date".to_string()];
        for truck in Truck::ALL {
            headers.push(format!("{}_Crusher", truck));
            headers.push(format!("{}_ROM PAD", truck));
        }
        RawSheet { headers, rows }
    }

    fn row(date: &str, tons: [&str; 8]) -> Vec<Cell> {
        let mut cells = vec![Cell::Text(date.to_string())];
        for t in tons {
            cells.push(if t.is_empty() {
                Cell::Empty
            } else {
                Cell::Text(t.to_string())
            });
        }
        cells
    }

    #[test]
    fn every_row_yields_one_record_per_truck() {
        let sheet = sheet(vec![
            row("2024-01-01", ["5", "3", "10", "0", "2", "2", "7", "1"]),
            row("2024-01-02", ["4", "", "9", "1", "", "3", "6", "2"]),
            row("not a date", ["1", "1", "1", "1", "1", "1", "1", "1"]),
        ]);

        let records = normalize(&sheet, &SheetSchema::default_layout()).unwrap();
        assert_eq!(records.len(), 4 * 3);
    }

    #[test]
    fn output_is_grouped_by_truck_block_then_row_order() {
        let sheet = sheet(vec![
            row("2024-01-01", ["1", "0", "2", "0", "3", "0", "4", "0"]),
            row("2024-01-02", ["5", "0", "6", "0", "7", "0", "8", "0"]),
        ]);

        let records = normalize(&sheet, &SheetSchema::default_layout()).unwrap();
        let order: Vec<(Truck, f64)> = records
            .iter()
            .map(|r| (r.truck, r.crusher_tons.unwrap()))
            .collect();
        assert_eq!(
            order,
            vec![
                (Truck::Lemon, 1.0),
                (Truck::Lemon, 5.0),
                (Truck::Blue, 2.0),
                (Truck::Blue, 6.0),
                (Truck::Yellow, 3.0),
                (Truck::Yellow, 7.0),
                (Truck::Black, 4.0),
                (Truck::Black, 8.0),
            ]
        );
    }

    #[test]
    fn total_is_always_the_sum_of_both_destinations() {
        let sheet = sheet(vec![row(
            "2024-01-01",
            ["5", "3", "10", "0", "", "", "7", ""],
        )]);

        let records = normalize(&sheet, &SheetSchema::default_layout()).unwrap();
        for record in &records {
            assert_eq!(
                record.total_tons(),
                record.crusher_tons.unwrap_or(0.0) + record.rom_pad_tons.unwrap_or(0.0)
            );
        }
    }

    #[test]
    fn blank_tonnage_stays_missing_but_totals_as_zero() {
        let sheet = sheet(vec![row(
            "2024-01-01",
            ["", "", "10", "", "", "", "", ""],
        )]);

        let records = normalize(&sheet, &SheetSchema::default_layout()).unwrap();
        let lemon = &records[0];
        assert_eq!(lemon.truck, Truck::Lemon);
        assert_eq!(lemon.crusher_tons, None);
        assert_eq!(lemon.rom_pad_tons, None);
        assert_eq!(lemon.total_tons(), 0.0);

        let blue = records.iter().find(|r| r.truck == Truck::Blue).unwrap();
        assert_eq!(blue.crusher_tons, Some(10.0));
        assert_eq!(blue.total_tons(), 10.0);
    }

    #[test]
    fn unparseable_date_becomes_none_not_an_error() {
        let sheet = sheet(vec![row(
            "sometime in March",
            ["1", "1", "1", "1", "1", "1", "1", "1"],
        )]);

        let records = normalize(&sheet, &SheetSchema::default_layout()).unwrap();
        assert_eq!(records.len(), 4);
        assert!(records.iter().all(|r| r.date.is_none()));
    }

    #[test]
    fn date_formats_and_excel_serials_are_accepted() {
        assert_eq!(
            parse_date(Some(&Cell::Text("2024-03-01".into()))),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(
            parse_date(Some(&Cell::Text("01/03/2024".into()))),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        // 45292 is 2024-01-01 in Excel's serial scheme.
        assert_eq!(
            parse_date(Some(&Cell::Number(45292.0))),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
    }

    #[test]
    fn tonnage_text_is_coerced_with_comma_stripping() {
        assert_eq!(parse_tons(Some(&Cell::Text("1,250.5".into()))), Some(1250.5));
        assert_eq!(parse_tons(Some(&Cell::Text("n/a".into()))), None);
        assert_eq!(parse_tons(Some(&Cell::Empty)), None);
    }

    #[test]
    fn mismatched_headers_fail_before_normalizing() {
        let mut bad = sheet(vec![row(
            "2024-01-01",
            ["1", "1", "1", "1", "1", "1", "1", "1"],
        )]);
        bad.headers.swap(1, 3);
        assert!(normalize(&bad, &SheetSchema::default_layout()).is_err());
    }
}
