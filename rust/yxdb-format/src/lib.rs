//! YXDB file format definitions: the fixed file header, the schema metadata
//! block, field types and their on-disk layout inside a record, and the typed
//! values decoded from a record buffer.

pub mod blob;
pub mod extractor;
pub mod field;
pub mod header;
pub mod meta_info;
pub mod record;
pub mod value;

pub use extractor::FieldExtractor;
pub use field::{DataType, FieldDescriptor, FieldType, YxdbField};
pub use header::FileHeader;
pub use record::RecordSchema;
pub use value::Value;
