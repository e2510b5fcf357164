//! Command implementations for yxdb-cmd

use anyhow::{Context, Result};
use yxdb_reader::YxdbReader;

pub mod geojson;
pub mod head;
pub mod inspect;

/// Opens the database at `path` with default options.
pub fn open_database(path: &str) -> Result<YxdbReader> {
    YxdbReader::open(path).with_context(|| format!("Failed to open database: {path}"))
}
