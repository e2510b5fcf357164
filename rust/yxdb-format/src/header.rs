//! The fixed-size header at the start of every YXDB file.
//!
//! ```text
//! offset  size  content
//! 0       80    file description and other producer-specific fields
//! 80      4     schema metadata length, in UTF-16 code units (incl. terminator)
//! 84      20    producer-specific fields
//! 104     4     record count
//! 108     404   producer-specific fields
//! ```
//!
//! The schema metadata block follows immediately after the header.

use std::io::Read;

use byteorder::{ByteOrder, LittleEndian};
use yxdb_common::{Result, error::Error};

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 512;

/// Offset of the metadata length field.
pub const META_INFO_LENGTH_OFFSET: usize = 80;

/// Offset of the record count field.
pub const RECORD_COUNT_OFFSET: usize = 104;

/// Element name reported when a source is not a YXDB file at all.
pub const NOT_A_YXDB_FILE: &str = "file is not a valid YXDB format";

/// The header fields consumed by the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// Length of the schema metadata block in UTF-16 code units, including
    /// the trailing terminator.
    pub meta_info_length: u32,
    /// Number of records stored in the file.
    pub record_count: u32,
}

impl FileHeader {
    /// Parses the header from its raw bytes.
    ///
    /// # Errors
    ///
    /// `InvalidFormat` if `bytes` is shorter than [`HEADER_SIZE`].
    pub fn from_bytes(bytes: &[u8]) -> Result<FileHeader> {
        if bytes.len() < HEADER_SIZE {
            return Err(Error::invalid_format(
                NOT_A_YXDB_FILE,
                format!("header needs {HEADER_SIZE} bytes, got {}", bytes.len()),
            ));
        }
        Ok(FileHeader {
            meta_info_length: LittleEndian::read_u32(
                &bytes[META_INFO_LENGTH_OFFSET..META_INFO_LENGTH_OFFSET + 4],
            ),
            record_count: LittleEndian::read_u32(
                &bytes[RECORD_COUNT_OFFSET..RECORD_COUNT_OFFSET + 4],
            ),
        })
    }

    /// Reads and parses the header from the start of `reader`.
    ///
    /// A source ending before [`HEADER_SIZE`] bytes is reported as `InvalidFormat`.
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> Result<FileHeader> {
        let mut buf = [0u8; HEADER_SIZE];
        let read = read_fully(reader, &mut buf)
            .map_err(|e| Error::io("yxdb header", e))?;
        FileHeader::from_bytes(&buf[..read])
    }

    /// Size in bytes of the UTF-16 metadata text that follows the header,
    /// excluding the two-byte terminator.
    pub fn meta_info_byte_len(&self) -> Result<usize> {
        if self.meta_info_length == 0 {
            return Err(Error::invalid_format(
                NOT_A_YXDB_FILE,
                "metadata length is zero",
            ));
        }
        Ok((self.meta_info_length as usize - 1) * 2)
    }
}

/// Reads until `buf` is full or the source reaches end-of-file and returns the
/// number of bytes read. Unlike `read_exact`, a short read is not an error.
pub fn read_fully<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(total)
}
