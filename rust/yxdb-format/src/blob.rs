//! Length-prefixed blob values stored in the variable-length tail of a record.
//!
//! A blob field occupies four bytes in the fixed region. Read as a little-endian
//! `u32` header `h`:
//!
//! ```text
//! h == 0                                  empty blob
//! h == 1                                  null
//! h & 0x8000_0000 == 0 && h & 0x3000_0000 != 0
//!                                         tiny blob: length h >> 28, payload
//!                                         inline in the field itself
//! otherwise                               block at field_start + (h & 0x7fff_ffff)
//! ```
//!
//! A block whose first byte has its low bit set is a small block (length
//! `byte >> 1`, payload follows the byte); otherwise it is a normal block
//! (length `u32 / 2`, payload follows the four length bytes).

use byteorder::{ByteOrder, LittleEndian};
use yxdb_common::{Result, error::Error};

const NULL_HEADER: u32 = 1;
const HIGH_BIT: u32 = 0x8000_0000;
const TINY_LENGTH_BITS: u32 = 0x3000_0000;

/// The encoding a blob header resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobLayout {
    Empty,
    Null,
    Tiny { len: usize },
    Block { offset: usize },
}

impl BlobLayout {
    pub fn from_header(header: u32) -> BlobLayout {
        match header {
            0 => BlobLayout::Empty,
            NULL_HEADER => BlobLayout::Null,
            h if h & HIGH_BIT == 0 && h & TINY_LENGTH_BITS != 0 => BlobLayout::Tiny {
                len: (h >> 28) as usize,
            },
            h => BlobLayout::Block {
                offset: (h & !HIGH_BIT) as usize,
            },
        }
    }
}

/// Decodes the blob whose four-byte header sits at `start` in `record`.
///
/// Returns `None` for a null blob and an empty slice for an empty one.
///
/// # Errors
///
/// `InvalidFormat` when the header or payload reaches past the end of `record`.
pub fn parse_blob(record: &[u8], start: usize) -> Result<Option<&[u8]>> {
    let header = LittleEndian::read_u32(slice_at(record, start, 4)?);
    match BlobLayout::from_header(header) {
        BlobLayout::Empty => Ok(Some(&[])),
        BlobLayout::Null => Ok(None),
        BlobLayout::Tiny { len } => slice_at(record, start, len).map(Some),
        BlobLayout::Block { offset } => {
            let block_start = start.checked_add(offset).ok_or_else(|| {
                Error::invalid_format("blob", format!("block offset {offset} overflows"))
            })?;
            let first_byte = slice_at(record, block_start, 1)?[0];
            if first_byte & 1 == 1 {
                let len = (first_byte >> 1) as usize;
                slice_at(record, block_start + 1, len).map(Some)
            } else {
                let len = LittleEndian::read_u32(slice_at(record, block_start, 4)?) as usize / 2;
                slice_at(record, block_start + 4, len).map(Some)
            }
        }
    }
}

fn slice_at(record: &[u8], start: usize, len: usize) -> Result<&[u8]> {
    start
        .checked_add(len)
        .and_then(|end| record.get(start..end))
        .ok_or_else(|| {
            Error::invalid_format(
                "blob",
                format!(
                    "{len} bytes at offset {start} exceed the record length {}",
                    record.len()
                ),
            )
        })
}
