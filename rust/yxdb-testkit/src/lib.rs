//! Test utilities for the YXDB reader crates.
//!
//! This crate builds complete YXDB databases in memory:
//! - [`file_builder`]: header, schema metadata and the block stream
//! - [`record_builder`]: record layouts, including every blob encoding
//! - [`spatial`]: `SpatialObj` blobs for points, lines and polygons
//!
//! It is only meant for tests and development tools.

pub mod file_builder;
pub mod record_builder;
pub mod spatial;

pub use file_builder::{BlockEncoding, YxdbFileBuilder, write_temp_file};
pub use record_builder::{BlobEncoding, RecordBuilder};
