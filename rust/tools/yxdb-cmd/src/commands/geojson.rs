use std::io::Write;

use anyhow::{Context, Result};
use yxdb_spatial::to_geojson;

use crate::commands::open_database;

pub fn run(field: &str, path: &str, out: &mut impl Write) -> Result<()> {
    let mut reader = open_database(path)?;
    reader
        .schema()
        .index_of(field)
        .with_context(|| format!("No such field in {path}"))?;

    while reader.advance()? {
        let position = reader.position();
        let blob = reader.read_blob_by_name(field)?;
        let geojson =
            to_geojson(blob).with_context(|| format!("Record {position}: field '{field}'"))?;
        writeln!(out, "{}", geojson.as_deref().unwrap_or("null"))?;
    }
    Ok(())
}
