//! The schema metadata block.
//!
//! The block follows the file header and holds UTF-16LE XML text, terminated by
//! a two-byte NUL. Every `Field` element carries the attributes `name`, `type`
//! and optionally `size` and `scale`:
//!
//! ```text
//! <MetaInfo connection="Output">
//!   <RecordInfo>
//!     <Field name="ByteField" source="..." type="Byte"/>
//!     <Field name="FixedDecimalField" scale="6" size="19" type="FixedDecimal"/>
//!   </RecordInfo>
//! </MetaInfo>
//! ```

use std::io::Read;

use byteorder::{ByteOrder, LittleEndian};
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use log::debug;
use yxdb_common::{Result, error::Error, verify_data};

use crate::{
    field::FieldDescriptor,
    header::{FileHeader, NOT_A_YXDB_FILE, read_fully},
};

const FIELD_ELEMENT: &[u8] = b"Field";
const TERMINATOR_SIZE: usize = 2;
const INVALID_METADATA: &str = "YXDB metadata is invalid";

/// Reads the metadata block that follows the header and decodes it to text.
///
/// # Errors
///
/// `InvalidFormat` if the source ends before the declared metadata length or the
/// text is not valid UTF-16.
pub fn read_meta_info<R: Read + ?Sized>(reader: &mut R, header: &FileHeader) -> Result<String> {
    let len = header.meta_info_byte_len()?;
    // The declared length is untrusted; grow the buffer only as bytes arrive.
    let mut buf = Vec::new();
    let read = Read::take(&mut *reader, len as u64)
        .read_to_end(&mut buf)
        .map_err(|e| Error::io("yxdb metadata", e))?;
    if read != len {
        return Err(Error::invalid_format(
            NOT_A_YXDB_FILE,
            format!("metadata needs {len} bytes, got {read}"),
        ));
    }
    let mut terminator = [0u8; TERMINATOR_SIZE];
    let terminator_read =
        read_fully(reader, &mut terminator).map_err(|e| Error::io("yxdb metadata", e))?;
    if terminator_read != TERMINATOR_SIZE {
        debug!("metadata terminator missing: {terminator_read} of {TERMINATOR_SIZE} bytes");
    }
    decode_meta_info(&buf)
}

/// Decodes UTF-16LE metadata bytes.
pub fn decode_meta_info(bytes: &[u8]) -> Result<String> {
    verify_data!(metadata, bytes.len() % 2 == 0);
    let units = bytes.chunks_exact(2).map(LittleEndian::read_u16);
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::invalid_format("metadata", e.to_string()))
}

/// Collects every `Field` element of the metadata document, in document order.
///
/// # Errors
///
/// `InvalidFormat` on malformed XML, a field without `name` or `type`, or a
/// non-numeric `size`/`scale`.
pub fn parse_fields(xml: &str) -> Result<Vec<FieldDescriptor>> {
    let mut reader = Reader::from_str(xml);
    let mut fields = Vec::new();
    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == FIELD_ELEMENT => {
                fields.push(parse_field(&e)?);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(fields)
}

fn parse_field(element: &BytesStart<'_>) -> Result<FieldDescriptor> {
    let mut name = None;
    let mut field_type = None;
    let mut size = 0;
    let mut scale = 0;
    for attr in element.attributes() {
        let attr = attr.map_err(xml_error)?;
        let value = attr.unescape_value().map_err(xml_error)?;
        match attr.key.as_ref() {
            b"name" => name = Some(value.into_owned()),
            b"type" => field_type = Some(value.into_owned()),
            b"size" => size = parse_number(&value, "size")?,
            b"scale" => scale = parse_number(&value, "scale")?,
            _ => {}
        }
    }
    let (Some(name), Some(field_type)) = (name, field_type) else {
        return Err(Error::invalid_format(
            INVALID_METADATA,
            "field is missing the name or type attribute",
        ));
    };
    Ok(FieldDescriptor {
        name,
        field_type,
        size,
        scale,
    })
}

fn parse_number<T: std::str::FromStr>(value: &str, attr: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        Error::invalid_format(
            INVALID_METADATA,
            format!("{attr} attribute '{value}' is not a number"),
        )
    })
}

fn xml_error(e: impl std::fmt::Display) -> Error {
    Error::invalid_format(INVALID_METADATA, e.to_string())
}
