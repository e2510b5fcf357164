//! # yxdb: reader for YXDB databases
//!
//! YXDB is a single-file, row-oriented database format: a fixed 512-byte
//! header, a UTF-16 XML schema, and a chain of LZF-compressed blocks holding
//! the records back to back. This crate re-exports the reader components so
//! they can be used through a single dependency.
//!
//! ## Module Organization
//!
//! * [`reader`] - Opening a database and iterating over its records
//! * [`format`] - Header, schema metadata, field types and value decoding
//! * [`blockstream`] - Block framing and record assembly
//! * [`encodings`] - LZF decompression
//! * [`spatial`] - Spatial object decoding and GeoJSON output
//! * [`common`] - Error and result types shared by all components
//!
//! ## Example
//!
//! ```no_run
//! let mut reader = yxdb::YxdbReader::open("data.yxdb")?;
//! for field in reader.list_fields() {
//!     println!("{}: {:?}", field.name, field.data_type);
//! }
//! while reader.advance()? {
//!     println!("{:?}", reader.read_index(0)?);
//! }
//! # Ok::<(), yxdb::common::error::Error>(())
//! ```

pub use yxdb_blockstream as blockstream;
pub use yxdb_common as common;
pub use yxdb_encodings as encodings;
pub use yxdb_format as format;
pub use yxdb_reader as reader;
pub use yxdb_spatial as spatial;

pub use yxdb_format::{DataType, Value, YxdbField};
pub use yxdb_reader::{ReaderOptions, YxdbReader};
pub use yxdb_spatial::{Geometry, to_geojson};
