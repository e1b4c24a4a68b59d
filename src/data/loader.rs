//! Sheet Loader Module
//! Reads the production sheet (xlsx via calamine, CSV via Polars) into a
//! uniform cell grid and caches the result per source identity.

use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::NaiveDate;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("failed to read source file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to read workbook: {0}")]
    Xlsx(#[from] calamine::XlsxError),
    #[error("failed to read CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("workbook has no sheets")]
    NoSheet,
    #[error("source needs two header rows and at least one data row")]
    TooShort,
    #[error("unsupported source format '{0}'")]
    UnsupportedFormat(String),
}

/// A single source cell, decoded as far as the reader can take it.
/// Text that turns out to be a date or a tonnage figure is parsed later,
/// during normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

impl Cell {
    fn header_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(n) => n.to_string(),
            Cell::Date(d) => d.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }
}

/// The source sheet with its two header rows merged into one label per
/// column ("{top}_{bottom}", top row forward-filled across merged cells).
#[derive(Debug, Clone)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

struct CacheEntry {
    path: PathBuf,
    modified: Option<SystemTime>,
    sheet: Arc<RawSheet>,
}

/// Loads production sheets and memoizes the last result.
///
/// The cache key is the source identity (path + modification time), so a
/// repeated load of an unchanged file never re-reads it, while an edited
/// file is picked up on the next load.
pub struct SheetLoader {
    cache: Option<CacheEntry>,
}

impl Default for SheetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SheetLoader {
    pub fn new() -> Self {
        Self { cache: None }
    }

    /// Load a source file, serving from cache when it is unchanged.
    pub fn load(&mut self, path: &Path) -> Result<Arc<RawSheet>, LoaderError> {
        let modified = std::fs::metadata(path)?.modified().ok();

        if let Some(entry) = &self.cache {
            if entry.path == path && entry.modified == modified {
                debug!(path = %path.display(), "sheet cache hit");
                return Ok(Arc::clone(&entry.sheet));
            }
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let sheet = match ext.as_str() {
            "xlsx" | "xlsm" => Self::read_xlsx(path)?,
            "csv" => Self::read_csv(path)?,
            other => return Err(LoaderError::UnsupportedFormat(other.to_string())),
        };

        info!(
            path = %path.display(),
            rows = sheet.rows.len(),
            columns = sheet.headers.len(),
            "loaded production sheet"
        );

        let sheet = Arc::new(sheet);
        self.cache = Some(CacheEntry {
            path: path.to_path_buf(),
            modified,
            sheet: Arc::clone(&sheet),
        });

        Ok(sheet)
    }

    /// Drop the cached sheet so the next load re-reads the source.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    fn read_xlsx(path: &Path) -> Result<RawSheet, LoaderError> {
        let mut workbook: Xlsx<_> = open_workbook(path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(LoaderError::NoSheet)??;

        let grid: Vec<Vec<Cell>> = range
            .rows()
            .map(|row| row.iter().map(data_to_cell).collect())
            .collect();

        Self::split_headers(grid)
    }

    fn read_csv(path: &Path) -> Result<RawSheet, LoaderError> {
        // Headerless read: the two stacked header rows land in the grid and
        // are split off below, same as the xlsx path.
        let df = LazyCsvReader::new(path.to_string_lossy().as_ref())
            .with_has_header(false)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        let columns = df.get_columns();
        let mut grid: Vec<Vec<Cell>> = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let mut row = Vec::with_capacity(columns.len());
            for col in columns {
                row.push(any_value_to_cell(col.get(i)?));
            }
            grid.push(row);
        }

        Self::split_headers(grid)
    }

    /// Split the first two grid rows off as headers and merge them into one
    /// label per column.
    fn split_headers(mut grid: Vec<Vec<Cell>>) -> Result<RawSheet, LoaderError> {
        if grid.len() < 3 {
            return Err(LoaderError::TooShort);
        }

        let top = grid.remove(0);
        let bottom = grid.remove(0);
        let width = top.len().max(bottom.len());

        // Forward-fill the top row: merged header cells come through as
        // empty in every column but the first of their span.
        let mut headers = Vec::with_capacity(width);
        let mut last_top = String::new();
        for i in 0..width {
            let top_text = top.get(i).map(Cell::header_text).unwrap_or_default();
            if !top_text.is_empty() {
                last_top = top_text;
            }
            let bottom_text = bottom.get(i).map(Cell::header_text).unwrap_or_default();
            let merged = format!("{}_{}", last_top, bottom_text);
            headers.push(merged.trim_matches('_').to_string());
        }

        Ok(RawSheet { headers, rows: grid })
    }
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Number(if *b { 1.0 } else { 0.0 }),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| Cell::Date(d.date()))
            .unwrap_or(Cell::Empty),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Cell::Empty
            } else {
                Cell::Text(trimmed.to_string())
            }
        }
    }
}

fn any_value_to_cell(value: AnyValue) -> Cell {
    match value {
        AnyValue::Null => Cell::Empty,
        AnyValue::Float64(f) => Cell::Number(f),
        AnyValue::Float32(f) => Cell::Number(f as f64),
        AnyValue::Int64(i) => Cell::Number(i as f64),
        AnyValue::Int32(i) => Cell::Number(i as f64),
        AnyValue::UInt64(i) => Cell::Number(i as f64),
        AnyValue::UInt32(i) => Cell::Number(i as f64),
        other => {
            let text = other.to_string().trim_matches('"').trim().to_string();
            if text.is_empty() {
                Cell::Empty
            } else {
                Cell::Text(text)
            }
        }
    }
}
