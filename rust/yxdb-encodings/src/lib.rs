//! Block-level codecs used by the YXDB record stream.
//!
//! Currently this is the decode side of the LZF variant that compresses each
//! block of the record stream.

pub mod lzf;
