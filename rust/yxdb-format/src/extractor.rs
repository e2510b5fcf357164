//! Per-field decoders over a record buffer.
//!
//! Each variant carries the byte offset of the field inside the record (and
//! the declared character/byte count where the layout depends on it). Every
//! fixed-width field is followed by a null indicator byte; the indicator value
//! `1` marks the field as null, except for `Bool` where the single byte holds
//! `0`/`1`/`2` for false/true/null.

use byteorder::{ByteOrder, LittleEndian};
use chrono::{NaiveDate, NaiveDateTime};
use yxdb_common::{Result, error::Error};

use crate::{blob::parse_blob, field::FieldType, value::Value};

const DATE_LEN: usize = 10;
const DATE_TIME_LEN: usize = 19;
const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldExtractor {
    Int16 { start: usize },
    Int32 { start: usize },
    Int64 { start: usize },
    Float { start: usize },
    Double { start: usize },
    FixedDecimal { start: usize, len: usize },
    String { start: usize, len: usize },
    WString { start: usize, len: usize },
    VString { start: usize },
    VWString { start: usize },
    Date { start: usize },
    DateTime { start: usize },
    Bool { start: usize },
    Byte { start: usize },
    Blob { start: usize },
}

impl FieldExtractor {
    /// Builds the extractor for a field of type `ty` and declared `size`
    /// starting at `start`.
    pub fn new(ty: FieldType, start: usize, size: usize) -> FieldExtractor {
        match ty {
            FieldType::Int16 => FieldExtractor::Int16 { start },
            FieldType::Int32 => FieldExtractor::Int32 { start },
            FieldType::Int64 => FieldExtractor::Int64 { start },
            FieldType::Float => FieldExtractor::Float { start },
            FieldType::Double => FieldExtractor::Double { start },
            FieldType::FixedDecimal => FieldExtractor::FixedDecimal { start, len: size },
            FieldType::String => FieldExtractor::String { start, len: size },
            FieldType::WString => FieldExtractor::WString { start, len: size },
            FieldType::VString => FieldExtractor::VString { start },
            FieldType::VWString => FieldExtractor::VWString { start },
            FieldType::Date => FieldExtractor::Date { start },
            FieldType::DateTime => FieldExtractor::DateTime { start },
            FieldType::Bool => FieldExtractor::Bool { start },
            FieldType::Byte => FieldExtractor::Byte { start },
            FieldType::Blob | FieldType::SpatialObj => FieldExtractor::Blob { start },
        }
    }

    /// Offset of the field within the record.
    pub fn start(&self) -> usize {
        match *self {
            FieldExtractor::Int16 { start }
            | FieldExtractor::Int32 { start }
            | FieldExtractor::Int64 { start }
            | FieldExtractor::Float { start }
            | FieldExtractor::Double { start }
            | FieldExtractor::FixedDecimal { start, .. }
            | FieldExtractor::String { start, .. }
            | FieldExtractor::WString { start, .. }
            | FieldExtractor::VString { start }
            | FieldExtractor::VWString { start }
            | FieldExtractor::Date { start }
            | FieldExtractor::DateTime { start }
            | FieldExtractor::Bool { start }
            | FieldExtractor::Byte { start }
            | FieldExtractor::Blob { start } => start,
        }
    }

    /// Decodes the field from `record`.
    ///
    /// # Errors
    ///
    /// `InvalidFormat` when the field does not fit in `record`, or when its
    /// text does not parse as the declared decimal/date type.
    pub fn extract(&self, record: &[u8]) -> Result<Value> {
        let value = match *self {
            FieldExtractor::Int16 { start } => fixed(record, start, 2)?
                .map(|b| Value::Int(LittleEndian::read_i16(b) as i64)),
            FieldExtractor::Int32 { start } => fixed(record, start, 4)?
                .map(|b| Value::Int(LittleEndian::read_i32(b) as i64)),
            FieldExtractor::Int64 { start } => {
                fixed(record, start, 8)?.map(|b| Value::Int(LittleEndian::read_i64(b)))
            }
            FieldExtractor::Float { start } => fixed(record, start, 4)?
                .map(|b| Value::Double(LittleEndian::read_f32(b) as f64)),
            FieldExtractor::Double { start } => {
                fixed(record, start, 8)?.map(|b| Value::Double(LittleEndian::read_f64(b)))
            }
            FieldExtractor::FixedDecimal { start, len } => match fixed(record, start, len)? {
                Some(b) => Some(Value::Double(parse_decimal(narrow_text(b))?)),
                None => None,
            },
            FieldExtractor::String { start, len } => {
                fixed(record, start, len)?.map(|b| Value::String(narrow_text(b).into_owned()))
            }
            FieldExtractor::WString { start, len } => {
                fixed(record, start, len * 2)?.map(|b| Value::String(wide_text(b)))
            }
            FieldExtractor::VString { start } => parse_blob(record, start)?
                .map(|b| Value::String(String::from_utf8_lossy(b).into_owned())),
            FieldExtractor::VWString { start } => {
                parse_blob(record, start)?.map(|b| Value::String(utf16_lossy(b)))
            }
            FieldExtractor::Date { start } => match fixed(record, start, DATE_LEN)? {
                Some(b) => Some(Value::Date(parse_date(b)?)),
                None => None,
            },
            FieldExtractor::DateTime { start } => match fixed(record, start, DATE_TIME_LEN)? {
                Some(b) => Some(Value::DateTime(parse_date_time(b)?)),
                None => None,
            },
            FieldExtractor::Bool { start } => match field_bytes(record, start, 1)?[0] {
                2 => None,
                b => Some(Value::Bool(b == 1)),
            },
            FieldExtractor::Byte { start } => fixed(record, start, 1)?.map(|b| Value::Byte(b[0])),
            FieldExtractor::Blob { start } => {
                parse_blob(record, start)?.map(|b| Value::Blob(b.to_vec()))
            }
        };
        Ok(value.unwrap_or(Value::Null))
    }

    /// Raw payload of a variable-length field without copying it.
    ///
    /// Returns `None` for a null value.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` when the field is not stored as a blob.
    pub fn extract_blob<'a>(&self, record: &'a [u8]) -> Result<Option<&'a [u8]>> {
        match *self {
            FieldExtractor::VString { start }
            | FieldExtractor::VWString { start }
            | FieldExtractor::Blob { start } => parse_blob(record, start),
            _ => Err(Error::invalid_operation(format!(
                "blob read of fixed-width field at offset {}",
                self.start()
            ))),
        }
    }
}

/// Payload of a fixed-width field followed by its null indicator, or `None`
/// when the indicator is set.
fn fixed(record: &[u8], start: usize, len: usize) -> Result<Option<&[u8]>> {
    let bytes = field_bytes(record, start, len + 1)?;
    if bytes[len] == 1 {
        Ok(None)
    } else {
        Ok(Some(&bytes[..len]))
    }
}

fn field_bytes(record: &[u8], start: usize, len: usize) -> Result<&[u8]> {
    let range = start.checked_add(len).map(|end| start..end);
    range.and_then(|r| record.get(r)).ok_or_else(|| {
        Error::invalid_format(
            "record",
            format!(
                "field at offset {start} needs {len} bytes, record has {}",
                record.len()
            ),
        )
    })
}

/// Single-byte text up to the first zero byte.
fn narrow_text(bytes: &[u8]) -> std::borrow::Cow<'_, str> {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end])
}

/// UTF-16LE text up to the first all-zero code unit.
fn wide_text(bytes: &[u8]) -> String {
    let units = bytes
        .chunks_exact(2)
        .map(LittleEndian::read_u16)
        .take_while(|&u| u != 0);
    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

fn utf16_lossy(bytes: &[u8]) -> String {
    let units = bytes.chunks_exact(2).map(LittleEndian::read_u16);
    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

fn parse_decimal(text: std::borrow::Cow<'_, str>) -> Result<f64> {
    text.trim().parse().map_err(|_| {
        Error::invalid_format("FixedDecimal", format!("'{text}' is not a decimal number"))
    })
}

fn ascii_text<'a>(bytes: &'a [u8], element: &str) -> Result<&'a str> {
    std::str::from_utf8(bytes)
        .map_err(|_| Error::invalid_format(element, "value is not ASCII text"))
}

fn parse_date(bytes: &[u8]) -> Result<NaiveDate> {
    let text = ascii_text(bytes, "Date")?;
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map_err(|e| Error::invalid_format("Date", format!("'{text}': {e}")))
}

fn parse_date_time(bytes: &[u8]) -> Result<NaiveDateTime> {
    let text = ascii_text(bytes, "DateTime")?;
    NaiveDateTime::parse_from_str(text, DATE_TIME_FORMAT)
        .map_err(|e| Error::invalid_format("DateTime", format!("'{text}': {e}")))
}
