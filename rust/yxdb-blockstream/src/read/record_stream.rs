//! Byte stream over a chain of length-prefixed blocks.

use std::io::Read;

use byteorder::{ByteOrder, LittleEndian};
use log::trace;
use yxdb_common::{Result, error::Error, verify_data};
use yxdb_encodings::lzf;
use yxdb_format::header::read_fully;

use super::VERBATIM_BLOCK_FLAG;

const LENGTH_PREFIX_SIZE: usize = 4;

/// Presents the block chain that follows the schema metadata as one
/// contiguous byte stream.
///
/// Every block starts with a little-endian `u32` length prefix. When the high
/// bit is set, the low 31 bits count bytes stored verbatim; otherwise they
/// count LZF-compressed bytes. Both scratch buffers are allocated once at
/// `block_capacity` and reused for every block.
pub struct RecordStream<R> {
    source: R,
    /// Compressed bytes of the current block.
    compressed: Vec<u8>,
    /// Decoded bytes of the current block; `decoded[window_pos..window_len]`
    /// has not been handed out yet.
    decoded: Vec<u8>,
    window_pos: usize,
    window_len: usize,
    blocks_read: u64,
}

impl<R: Read> RecordStream<R> {
    pub fn new(source: R, block_capacity: usize) -> RecordStream<R> {
        RecordStream {
            source,
            compressed: vec![0u8; block_capacity],
            decoded: vec![0u8; block_capacity],
            window_pos: 0,
            window_len: 0,
            blocks_read: 0,
        }
    }

    /// Copies exactly `dest.len()` decoded bytes into `dest`, fetching as many
    /// blocks as needed.
    ///
    /// # Errors
    ///
    /// - `Truncated` if the source ends inside a length prefix or block body.
    /// - `InvalidFormat` if a block declares more bytes than the block capacity.
    /// - Any decompression error for a corrupt compressed block.
    pub fn fill(&mut self, dest: &mut [u8]) -> Result<()> {
        let mut written = 0;
        while written < dest.len() {
            if self.window_pos == self.window_len {
                self.next_block()?;
                continue;
            }
            let n = (self.window_len - self.window_pos).min(dest.len() - written);
            dest[written..written + n]
                .copy_from_slice(&self.decoded[self.window_pos..self.window_pos + n]);
            self.window_pos += n;
            written += n;
        }
        Ok(())
    }

    /// Number of blocks fetched from the source so far.
    pub fn blocks_read(&self) -> u64 {
        self.blocks_read
    }

    fn next_block(&mut self) -> Result<()> {
        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        let read = read_fully(&mut self.source, &mut prefix)
            .map_err(|e| Error::io("block length", e))?;
        if read != LENGTH_PREFIX_SIZE {
            return Err(Error::truncated("block length", LENGTH_PREFIX_SIZE, read));
        }
        let prefix = LittleEndian::read_u32(&prefix);
        let len = (prefix & !VERBATIM_BLOCK_FLAG) as usize;
        verify_data!(block_length, len <= self.decoded.len());

        let decoded_len = if prefix & VERBATIM_BLOCK_FLAG != 0 {
            self.read_body(len, true)?;
            len
        } else {
            self.read_body(len, false)?;
            lzf::decompress(&self.compressed[..len], &mut self.decoded)?
        };
        trace!(
            "block {}: {} {len} bytes, {decoded_len} decoded",
            self.blocks_read,
            if prefix & VERBATIM_BLOCK_FLAG != 0 {
                "stored"
            } else {
                "compressed"
            },
        );

        self.blocks_read += 1;
        self.window_pos = 0;
        self.window_len = decoded_len;
        Ok(())
    }

    fn read_body(&mut self, len: usize, verbatim: bool) -> Result<()> {
        let buf = if verbatim {
            &mut self.decoded[..len]
        } else {
            &mut self.compressed[..len]
        };
        let read = read_fully(&mut self.source, buf).map_err(|e| Error::io("block body", e))?;
        if read != len {
            return Err(Error::truncated("block body", len, read));
        }
        Ok(())
    }
}
