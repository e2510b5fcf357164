//! Field descriptors, physical field types and logical value categories.

use std::{fmt, str::FromStr};

use serde::Serialize;
use yxdb_common::{Result, error::Error};

/// A field as declared by the schema metadata block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    /// The raw type tag, e.g. `"Int32"` or `"V_WString"`.
    pub field_type: String,
    /// Declared size: characters for strings, bytes for fixed decimals,
    /// unused for the other types.
    pub size: usize,
    /// Decimal scale. Informational only.
    pub scale: i32,
}

impl FieldDescriptor {
    pub fn new(
        name: impl Into<String>,
        field_type: impl Into<String>,
        size: usize,
        scale: i32,
    ) -> FieldDescriptor {
        FieldDescriptor {
            name: name.into(),
            field_type: field_type.into(),
            size,
            scale,
        }
    }

    /// Resolves the type tag.
    ///
    /// # Errors
    ///
    /// `UnknownFieldType` when the tag is not one of the known field types.
    pub fn resolve_type(&self) -> Result<FieldType> {
        self.field_type
            .parse()
            .map_err(|_| Error::unknown_field_type(&self.name, &self.field_type))
    }
}

/// Physical field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Int16,
    Int32,
    Int64,
    Float,
    Double,
    FixedDecimal,
    String,
    WString,
    VString,
    VWString,
    Date,
    DateTime,
    Bool,
    Byte,
    Blob,
    SpatialObj,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Int16 => "Int16",
            FieldType::Int32 => "Int32",
            FieldType::Int64 => "Int64",
            FieldType::Float => "Float",
            FieldType::Double => "Double",
            FieldType::FixedDecimal => "FixedDecimal",
            FieldType::String => "String",
            FieldType::WString => "WString",
            FieldType::VString => "V_String",
            FieldType::VWString => "V_WString",
            FieldType::Date => "Date",
            FieldType::DateTime => "DateTime",
            FieldType::Bool => "Bool",
            FieldType::Byte => "Byte",
            FieldType::Blob => "Blob",
            FieldType::SpatialObj => "SpatialObj",
        }
    }

    /// Bytes occupied by a field of this type in the fixed region of a record,
    /// including the trailing null indicator. `None` if `size` overflows.
    pub fn footprint(&self, size: usize) -> Option<usize> {
        match self {
            FieldType::Int16 => Some(3),
            FieldType::Int32 | FieldType::Float => Some(5),
            FieldType::Int64 | FieldType::Double => Some(9),
            FieldType::FixedDecimal | FieldType::String => size.checked_add(1),
            FieldType::WString => size.checked_mul(2)?.checked_add(1),
            FieldType::VString | FieldType::VWString | FieldType::Blob | FieldType::SpatialObj => {
                Some(4)
            }
            FieldType::Date => Some(11),
            FieldType::DateTime => Some(20),
            FieldType::Bool => Some(1),
            FieldType::Byte => Some(2),
        }
    }

    /// Whether values of this type live in the variable-length tail of a record.
    pub fn is_variable(&self) -> bool {
        matches!(
            self,
            FieldType::VString | FieldType::VWString | FieldType::Blob | FieldType::SpatialObj
        )
    }

    pub fn data_type(&self) -> DataType {
        match self {
            FieldType::Int16 | FieldType::Int32 | FieldType::Int64 => DataType::Long,
            FieldType::Float | FieldType::Double | FieldType::FixedDecimal => DataType::Double,
            FieldType::String | FieldType::WString | FieldType::VString | FieldType::VWString => {
                DataType::String
            }
            FieldType::Date | FieldType::DateTime => DataType::Date,
            FieldType::Bool => DataType::Boolean,
            FieldType::Byte => DataType::Byte,
            FieldType::Blob | FieldType::SpatialObj => DataType::Blob,
        }
    }
}

impl FromStr for FieldType {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let ty = match s {
            "Int16" => FieldType::Int16,
            "Int32" => FieldType::Int32,
            "Int64" => FieldType::Int64,
            "Float" => FieldType::Float,
            "Double" => FieldType::Double,
            "FixedDecimal" => FieldType::FixedDecimal,
            "String" => FieldType::String,
            "WString" => FieldType::WString,
            "V_String" => FieldType::VString,
            "V_WString" => FieldType::VWString,
            "Date" => FieldType::Date,
            "DateTime" => FieldType::DateTime,
            "Bool" => FieldType::Bool,
            "Byte" => FieldType::Byte,
            "Blob" => FieldType::Blob,
            "SpatialObj" => FieldType::SpatialObj,
            _ => return Err(()),
        };
        Ok(ty)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical category of the values produced by a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DataType {
    Blob,
    Boolean,
    Byte,
    Date,
    Double,
    Long,
    String,
}

/// Name and logical category of a field, as exposed to readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YxdbField {
    pub name: String,
    pub data_type: DataType,
}
