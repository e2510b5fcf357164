use std::{io::Read, path::Path};

use log::debug;
use yxdb_blockstream::read::{record_assembler::RecordAssembler, record_stream::RecordStream};
use yxdb_common::{Result, error::Error};
use yxdb_format::{
    FieldDescriptor, FileHeader, RecordSchema, Value, YxdbField,
    meta_info::{parse_fields, read_meta_info},
};

use crate::options::ReaderOptions;

type Source = Box<dyn Read + Send>;

/// An open YXDB database, read one record at a time.
///
/// The reader owns its source and all decoding buffers. Values read from the
/// current record stay valid until the next [`advance`](Self::advance).
pub struct YxdbReader {
    header: FileHeader,
    meta_info: String,
    descriptors: Vec<FieldDescriptor>,
    schema: RecordSchema,
    records: RecordAssembler<Source>,
}

impl YxdbReader {
    /// Opens the database at `path` with default [`ReaderOptions`].
    pub fn open(path: impl AsRef<Path>) -> Result<YxdbReader> {
        ReaderOptions::new().open(path)
    }

    /// Opens a database from an in-memory or streamed source with default
    /// [`ReaderOptions`].
    pub fn from_reader(source: impl Read + Send + 'static) -> Result<YxdbReader> {
        ReaderOptions::new().open_reader(source)
    }

    pub(crate) fn from_source(mut source: Source, options: &ReaderOptions) -> Result<YxdbReader> {
        let header = FileHeader::read_from(&mut source)?;
        let meta_info = read_meta_info(&mut source, &header)?;
        let descriptors = parse_fields(&meta_info)?;
        let schema = RecordSchema::new(&descriptors)?;
        debug!(
            "opened yxdb: {} records, {} fields, fixed size {}, variable fields: {}",
            header.record_count,
            schema.len(),
            schema.fixed_size(),
            schema.has_var_fields()
        );

        let stream = RecordStream::new(source, options.get_block_capacity());
        let records = RecordAssembler::new(
            stream,
            &schema,
            header.record_count as u64,
            options.get_variable_record_slack(),
        );
        Ok(YxdbReader {
            header,
            meta_info,
            descriptors,
            schema,
            records,
        })
    }

    /// Number of records declared in the file header.
    pub fn num_records(&self) -> u64 {
        self.header.record_count as u64
    }

    /// The schema metadata as stored in the file.
    pub fn meta_info_str(&self) -> &str {
        &self.meta_info
    }

    /// Field names and logical categories, in schema order.
    pub fn list_fields(&self) -> &[YxdbField] {
        self.schema.fields()
    }

    /// The field declarations parsed from the metadata, including size and
    /// scale.
    pub fn field_descriptors(&self) -> &[FieldDescriptor] {
        &self.descriptors
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    /// Moves to the next record. Returns `false` once every record has been
    /// read; the source is closed at that point.
    ///
    /// # Errors
    ///
    /// Block stream errors (`Truncated`, `OutputOverflow`, `InvalidFormat`)
    /// are fatal: the source is closed and later calls return `false`.
    pub fn advance(&mut self) -> Result<bool> {
        self.records.advance()
    }

    /// 1-based ordinal of the current record, 0 before the first `advance`.
    pub fn position(&self) -> u64 {
        self.records.position()
    }

    pub fn read_index(&self, index: usize) -> Result<Value> {
        self.schema.extract_from_index(index, self.current_record()?)
    }

    pub fn read_name(&self, name: &str) -> Result<Value> {
        self.schema.extract_from_name(name, self.current_record()?)
    }

    /// Borrowed bytes of a blob, string or spatial field; `None` when null.
    pub fn read_blob_by_index(&self, index: usize) -> Result<Option<&[u8]>> {
        self.schema.blob_from_index(index, self.current_record()?)
    }

    pub fn read_blob_by_name(&self, name: &str) -> Result<Option<&[u8]>> {
        self.schema.blob_from_name(name, self.current_record()?)
    }

    /// Releases the source. Reads fail and `advance` returns `false`
    /// afterwards.
    pub fn close(&mut self) {
        self.records.close();
    }

    pub fn is_closed(&self) -> bool {
        self.records.is_closed()
    }

    fn current_record(&self) -> Result<&[u8]> {
        self.records
            .record()
            .ok_or_else(|| Error::invalid_operation("read without a current record"))
    }
}

impl std::fmt::Debug for YxdbReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YxdbReader")
            .field("header", &self.header)
            .field("fields", &self.schema.fields())
            .field("position", &self.records.position())
            .field("closed", &self.records.is_closed())
            .finish()
    }
}
