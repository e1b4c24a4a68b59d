//! Data module - sheet loading, schema validation, normalization

mod loader;
mod normalizer;
mod schema;

pub use loader::{Cell, LoaderError, RawSheet, SheetLoader};
pub use normalizer::{normalize, NormalizedRecord};
pub use schema::{SchemaError, SheetSchema, Truck, TruckBlock};
