//! Sequential reader for YXDB databases.
//!
//! A session is opened through [`ReaderOptions`] (or the [`YxdbReader::open`]
//! shortcut), then driven with [`YxdbReader::advance`]; fields of the current
//! record are read by index or by name until the next call to `advance`.
//!
//! ```no_run
//! use yxdb_reader::YxdbReader;
//!
//! let mut reader = YxdbReader::open("data.yxdb")?;
//! while reader.advance()? {
//!     let id = reader.read_name("id")?;
//!     println!("{id:?}");
//! }
//! # Ok::<(), yxdb_common::error::Error>(())
//! ```

pub mod options;
pub mod reader;

pub use options::ReaderOptions;
pub use reader::YxdbReader;
