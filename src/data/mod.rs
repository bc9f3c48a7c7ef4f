//! Data module - CSV loading and normalization

mod loader;
mod normalizer;

pub use loader::{DataLoader, LoaderError, RawTables, TableKind};
pub use normalizer::{coerce_column, ColumnKind, NormalizeError, Normalizer, Tables};
pub(crate) use normalizer::days_to_date;
