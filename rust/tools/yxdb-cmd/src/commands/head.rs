use std::io::Write;

use anyhow::{Context, Result};
use serde::{Serialize, Serializer, ser::SerializeMap};
use yxdb_format::Value;

use crate::commands::open_database;

/// One record as a JSON object, keys in schema order.
struct Row<'a> {
    names: &'a [String],
    values: Vec<Value>,
}

impl Serialize for Row<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.names.len()))?;
        for (name, value) in self.names.iter().zip(&self.values) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

pub fn run(count: u64, path: &str, out: &mut impl Write) -> Result<()> {
    let mut reader = open_database(path)?;
    let names: Vec<String> = reader
        .list_fields()
        .iter()
        .map(|field| field.name.clone())
        .collect();

    let mut printed = 0;
    while printed < count && reader.advance()? {
        let mut values = Vec::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            let value = reader.read_index(index).with_context(|| {
                format!("Failed to read field '{name}' of record {}", printed + 1)
            })?;
            values.push(value);
        }
        let row = Row {
            names: &names,
            values,
        };
        serde_json::to_writer(&mut *out, &row)?;
        writeln!(out)?;
        printed += 1;
    }
    reader.close();
    log::debug!("printed {printed} of {} records", reader.num_records());
    Ok(())
}

#[cfg(test)]
mod tests {
    use yxdb_testkit::{RecordBuilder, YxdbFileBuilder, write_temp_file};

    #[test]
    fn test_head() {
        let bytes = YxdbFileBuilder::new()
            .field("id", "Int16", 2, 0)
            .field("name", "V_WString", 100, 0)
            .field("day", "Date", 10, 0)
            .records((0..5).map(|i| {
                RecordBuilder::new()
                    .int16(Some(i))
                    .v_wstring(Some(&format!("row {i}")))
                    .date(if i == 1 { None } else { Some("2024-03-15") })
                    .finish()
            }))
            .build();
        let file = write_temp_file(&bytes).unwrap();
        let path = file.path().to_str().unwrap();

        let mut out = Vec::new();
        super::run(3, path, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                r#"{"id":0,"name":"row 0","day":"2024-03-15"}"#,
                r#"{"id":1,"name":"row 1","day":null}"#,
                r#"{"id":2,"name":"row 2","day":"2024-03-15"}"#,
            ]
        );
    }
}
