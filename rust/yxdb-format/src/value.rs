//! Typed values decoded from a record.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// A single decoded field value.
///
/// Serializes to the bare JSON value (`null`, number, string, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Byte(u8),
    Int(i64),
    Double(f64),
    String(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Blob(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer view of `Int` and `Byte` values.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Byte(v) => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        assert!(Value::Null.is_null());
        assert_eq!(Value::Byte(7).as_i64(), Some(7));
        assert_eq!(Value::Int(-3).as_i64(), Some(-3));
        assert_eq!(Value::Double(1.5).as_i64(), None);
        assert_eq!(Value::String("A".into()).as_str(), Some("A"));
        assert_eq!(Value::Bool(false).as_bool(), Some(false));
        assert_eq!(Value::Double(2.5).as_f64(), Some(2.5));
        assert_eq!(Value::Blob(vec![1, 2]).as_bytes(), Some(&[1u8, 2][..]));
    }

    #[test]
    fn test_serializes_to_plain_json() {
        let values = vec![
            Value::Null,
            Value::Bool(true),
            Value::Int(64),
            Value::String("AB".into()),
            Value::Date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()),
        ];
        assert_eq!(
            serde_json::to_string(&values).unwrap(),
            r#"[null,true,64,"AB","2020-01-01"]"#
        );
    }
}
