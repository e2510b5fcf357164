//! Block stream decoding for YXDB record data.
//!
//! Records follow the schema metadata as a chain of length-prefixed blocks,
//! each either stored verbatim or LZF-compressed. [`read::record_stream`]
//! turns that chain into a contiguous byte stream and
//! [`read::record_assembler`] cuts the stream into records.

pub mod read;
