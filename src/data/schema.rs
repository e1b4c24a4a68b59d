//! Sheet Schema Module
//! Declarative truck/column mapping, validated against the source headers.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("source has {found} columns, schema needs at least {needed}")]
    TooFewColumns { needed: usize, found: usize },
    #[error("column {index} header '{header}' does not match truck '{truck}'")]
    HeaderMismatch {
        index: usize,
        header: String,
        truck: Truck,
    },
    #[error("schema has no truck blocks")]
    NoBlocks,
    #[error("failed to read schema file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid schema file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The four haul trucks, in fixed column-block order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Truck {
    Lemon,
    Blue,
    Yellow,
    Black,
}

impl Truck {
    pub const ALL: [Truck; 4] = [Truck::Lemon, Truck::Blue, Truck::Yellow, Truck::Black];

    pub fn name(&self) -> &'static str {
        match self {
            Truck::Lemon => "Lemon",
            Truck::Blue => "Blue",
            Truck::Yellow => "Yellow",
            Truck::Black => "Black",
        }
    }

    /// Chart color, matching the fleet's paint scheme.
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            Truck::Lemon => (0xFF, 0xD7, 0x00),
            Truck::Blue => (0x1F, 0x77, 0xB4),
            Truck::Yellow => (0xFF, 0xB0, 0x00),
            Truck::Black => (0x00, 0x00, 0x00),
        }
    }
}

impl fmt::Display for Truck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One truck block: the (crusher, ROM pad) column pair belonging to one truck.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TruckBlock {
    pub truck: Truck,
    pub crusher_col: usize,
    pub rom_pad_col: usize,
}

/// Explicit column layout of the production sheet.
///
/// The original sheets were decoded purely by position, which silently
/// corrupts data when the layout changes. The schema keeps the positions but
/// is checked against the actual headers at load time so a reordered source
/// fails loudly instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetSchema {
    pub date_col: usize,
    pub blocks: Vec<TruckBlock>,
}

impl Default for SheetSchema {
    fn default() -> Self {
        Self::default_layout()
    }
}

impl SheetSchema {
    /// Standard layout: date first, then (crusher, ROM pad) pairs for
    /// Lemon, Blue, Yellow, Black.
    pub fn default_layout() -> Self {
        let blocks = Truck::ALL
            .iter()
            .enumerate()
            .map(|(i, &truck)| TruckBlock {
                truck,
                crusher_col: 1 + 2 * i,
                rom_pad_col: 2 + 2 * i,
            })
            .collect();

        Self { date_col: 0, blocks }
    }

    /// Load a schema override from a JSON file.
    pub fn from_json_file(path: &std::path::Path) -> Result<Self, SchemaError> {
        let text = std::fs::read_to_string(path)?;
        let schema: SheetSchema = serde_json::from_str(&text)?;
        if schema.blocks.is_empty() {
            return Err(SchemaError::NoBlocks);
        }
        Ok(schema)
    }

    /// Number of columns the schema expects the source to have.
    pub fn column_count(&self) -> usize {
        let mut max = self.date_col;
        for block in &self.blocks {
            max = max.max(block.crusher_col).max(block.rom_pad_col);
        }
        max + 1
    }

    /// Check the merged two-row headers against this schema.
    ///
    /// Each tonnage column header must mention its truck's name
    /// (case-insensitive); a reordered or truncated source is rejected here
    /// rather than silently misassigned.
    pub fn validate(&self, headers: &[String]) -> Result<(), SchemaError> {
        if self.blocks.is_empty() {
            return Err(SchemaError::NoBlocks);
        }

        let needed = self.column_count();
        if headers.len() < needed {
            return Err(SchemaError::TooFewColumns {
                needed,
                found: headers.len(),
            });
        }

        for block in &self.blocks {
            for &index in &[block.crusher_col, block.rom_pad_col] {
                let header = &headers[index];
                if !header
                    .to_ascii_lowercase()
                    .contains(&block.truck.name().to_ascii_lowercase())
                {
                    return Err(SchemaError::HeaderMismatch {
                        index,
                        header: header.clone(),
                        truck: block.truck,
                    });
                }
            }
        }

        Ok(())
    }
}
