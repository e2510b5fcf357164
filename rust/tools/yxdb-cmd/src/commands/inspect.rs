use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use yxdb_format::DataType;

use crate::commands::open_database;

#[derive(Serialize)]
struct Summary<'a> {
    path: &'a str,
    num_records: u64,
    fixed_size: usize,
    has_var_fields: bool,
    fields: Vec<FieldSummary<'a>>,
}

#[derive(Serialize)]
struct FieldSummary<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    field_type: &'a str,
    size: usize,
    scale: i32,
    category: DataType,
}

pub fn run(path: &str, out: &mut impl Write) -> Result<()> {
    let reader = open_database(path)?;
    let schema = reader.schema();
    let fields = reader
        .field_descriptors()
        .iter()
        .zip(reader.list_fields())
        .map(|(desc, field)| FieldSummary {
            name: &desc.name,
            field_type: &desc.field_type,
            size: desc.size,
            scale: desc.scale,
            category: field.data_type,
        })
        .collect();
    let summary = Summary {
        path,
        num_records: reader.num_records(),
        fixed_size: schema.fixed_size(),
        has_var_fields: schema.has_var_fields(),
        fields,
    };
    serde_json::to_writer_pretty(&mut *out, &summary)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use yxdb_testkit::{RecordBuilder, YxdbFileBuilder, write_temp_file};

    #[test]
    fn test_inspect() {
        let bytes = YxdbFileBuilder::new()
            .field("id", "Int32", 4, 0)
            .field("amount", "FixedDecimal", 12, 2)
            .field("note", "V_String", 200, 0)
            .record(
                RecordBuilder::new()
                    .int32(Some(1))
                    .fixed_decimal(Some("10.50"), 12)
                    .v_string(Some("hello"))
                    .finish(),
            )
            .build();
        let file = write_temp_file(&bytes).unwrap();
        let path = file.path().to_str().unwrap();

        let mut out = Vec::new();
        super::run(path, &mut out).unwrap();
        let summary: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(summary["num_records"], 1);
        assert_eq!(summary["fixed_size"], 5 + 13 + 4);
        assert_eq!(summary["has_var_fields"], true);
        assert_eq!(summary["fields"][1]["type"], "FixedDecimal");
        assert_eq!(summary["fields"][1]["scale"], 2);
        assert_eq!(summary["fields"][1]["category"], "Double");
        assert_eq!(summary["fields"][2]["category"], "String");
    }
}
