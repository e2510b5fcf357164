use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_format(element: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidFormat {
                element: element.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        Error(ErrorKind::InvalidOperation { name: name.into() }.into())
    }

    pub fn unknown_field_type(field: impl Into<String>, type_name: impl Into<String>) -> Error {
        Error(
            ErrorKind::UnknownFieldType {
                field: field.into(),
                type_name: type_name.into(),
            }
            .into(),
        )
    }

    pub fn output_overflow(required: usize, capacity: usize) -> Error {
        Error(ErrorKind::OutputOverflow { required, capacity }.into())
    }

    pub fn truncated(element: impl Into<String>, expected: usize, actual: usize) -> Error {
        Error(
            ErrorKind::Truncated {
                element: element.into(),
                expected,
                actual,
            }
            .into(),
        )
    }

    pub fn index_out_of_range(index: usize, count: usize) -> Error {
        Error(ErrorKind::IndexOutOfRange { index, count }.into())
    }

    pub fn unknown_field_name(name: impl Into<String>) -> Error {
        Error(ErrorKind::UnknownFieldName { name: name.into() }.into())
    }

    pub fn malformed_spatial(message: impl Into<String>) -> Error {
        Error(
            ErrorKind::MalformedSpatial {
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn unsupported_geometry_type(tag: u32) -> Error {
        Error(ErrorKind::UnsupportedGeometryType { tag }.into())
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        Error(
            ErrorKind::Io {
                context: context.into(),
                source,
            }
            .into(),
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },

    #[error("invalid format for '{element}': {message}")]
    InvalidFormat { element: String, message: String },

    #[error("field '{field}' has unknown type '{type_name}'")]
    UnknownFieldType { field: String, type_name: String },

    #[error("decompressed output needs {required} bytes but the buffer holds {capacity}")]
    OutputOverflow { required: usize, capacity: usize },

    #[error("truncated {element}: expected {expected} bytes, got {actual}")]
    Truncated {
        element: String,
        expected: usize,
        actual: usize,
    },

    #[error("index {index} is not a valid field index")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("'{name}' is not a valid field name")]
    UnknownFieldName { name: String },

    #[error("blob is not a spatial object: {message}")]
    MalformedSpatial { message: String },

    #[error("unsupported spatial object type {tag}")]
    UnsupportedGeometryType { tag: u32 },

    #[error("IO error for '{context}': {source}'")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_access_messages() {
        assert_eq!(
            Error::index_out_of_range(1000, 16).to_string(),
            "index 1000 is not a valid field index"
        );
        assert_eq!(
            Error::unknown_field_name("invalid field").to_string(),
            "'invalid field' is not a valid field name"
        );
    }

    #[test]
    fn test_kind_round_trip() {
        let err = Error::truncated("block length", 4, 2);
        assert!(matches!(
            err.kind(),
            ErrorKind::Truncated {
                expected: 4,
                actual: 2,
                ..
            }
        ));
        assert!(matches!(
            err.into_kind(),
            ErrorKind::Truncated { element, .. } if element == "block length"
        ));
    }
}
