use std::{fs::File, io::BufReader, io::Read, path::Path};

use yxdb_common::{Result, error::Error, verify_arg};

use crate::reader::YxdbReader;

/// Settings for opening a [`YxdbReader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderOptions {
    block_capacity: usize,
    variable_record_slack: usize,
}

impl ReaderOptions {
    /// Capacity of the compressed and decompressed block buffers.
    pub const DEFAULT_BLOCK_CAPACITY: usize = yxdb_blockstream::read::DEFAULT_BLOCK_CAPACITY;

    /// Extra bytes allocated up front for the variable-length part of a record.
    pub const DEFAULT_VARIABLE_RECORD_SLACK: usize = 1000;

    pub fn new() -> ReaderOptions {
        ReaderOptions {
            block_capacity: Self::DEFAULT_BLOCK_CAPACITY,
            variable_record_slack: Self::DEFAULT_VARIABLE_RECORD_SLACK,
        }
    }

    /// Sets the block buffer capacity. No block in the file may declare more
    /// bytes than this, compressed or decoded.
    pub fn block_capacity(mut self, block_capacity: usize) -> Self {
        self.block_capacity = block_capacity;
        self
    }

    /// Sets the initial slack for records with variable-length fields.
    pub fn variable_record_slack(mut self, slack: usize) -> Self {
        self.variable_record_slack = slack;
        self
    }

    pub fn get_block_capacity(&self) -> usize {
        self.block_capacity
    }

    pub fn get_variable_record_slack(&self) -> usize {
        self.variable_record_slack
    }

    /// Opens the database file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The file cannot be opened
    /// * The header or schema metadata is invalid
    /// * The schema declares an unknown field type
    /// * `block_capacity` is zero
    pub fn open(self, path: impl AsRef<Path>) -> Result<YxdbReader> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path.display().to_string(), e))?;
        self.open_reader(BufReader::new(file))
    }

    /// Opens a database from any byte source positioned at the start of the
    /// header.
    pub fn open_reader(self, source: impl Read + Send + 'static) -> Result<YxdbReader> {
        verify_arg!(block_capacity, self.block_capacity > 0);
        YxdbReader::from_source(Box::new(source), &self)
    }
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yxdb_common::error::ErrorKind;

    #[test]
    fn test_defaults() {
        let options = ReaderOptions::default();
        assert_eq!(options.get_block_capacity(), 262_144);
        assert_eq!(options.get_variable_record_slack(), 1000);
    }

    #[test]
    fn test_zero_block_capacity() {
        let err = ReaderOptions::new()
            .block_capacity(0)
            .open_reader(std::io::empty())
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = ReaderOptions::new()
            .open("/nonexistent/dir/missing.yxdb")
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Io { .. }));
    }
}
