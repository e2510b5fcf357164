//! Record-at-a-time assembly over a [`RecordStream`].

use std::io::Read;

use byteorder::{ByteOrder, LittleEndian};
use log::debug;
use yxdb_common::{Result, error::Error};
use yxdb_format::RecordSchema;

use super::record_stream::RecordStream;

const VAR_LENGTH_SIZE: usize = 4;

/// Largest amount the record buffer grows by before more payload is read.
const GROWTH_STEP: usize = 64 * 1024;

/// Pulls one record at a time out of the block stream into a reused buffer.
///
/// Fixed-length schemas read exactly `fixed_size` bytes per record. Schemas
/// with variable-length fields read the fixed region, a little-endian `u32`
/// payload length, and then that many payload bytes. The buffer grows to
/// twice the required size whenever a record does not fit.
pub struct RecordAssembler<R> {
    stream: Option<RecordStream<R>>,
    fixed_size: usize,
    has_var_fields: bool,
    buffer: Vec<u8>,
    /// Length of the current record, `None` when there is none.
    record_len: Option<usize>,
    /// 1-based ordinal of the last record requested.
    position: u64,
    total_records: u64,
}

impl<R: Read> RecordAssembler<R> {
    /// Creates an assembler for `total_records` records laid out by `schema`.
    ///
    /// For schemas with variable-length fields, the buffer initially holds
    /// `fixed_size + 4 + variable_slack` bytes.
    pub fn new(
        stream: RecordStream<R>,
        schema: &RecordSchema,
        total_records: u64,
        variable_slack: usize,
    ) -> RecordAssembler<R> {
        let fixed_size = schema.fixed_size();
        let has_var_fields = schema.has_var_fields();
        let capacity = if has_var_fields {
            fixed_size + VAR_LENGTH_SIZE + variable_slack
        } else {
            fixed_size
        };
        RecordAssembler {
            stream: Some(stream),
            fixed_size,
            has_var_fields,
            buffer: vec![0u8; capacity],
            record_len: None,
            position: 0,
            total_records,
        }
    }

    /// Moves to the next record.
    ///
    /// Returns `false` and releases the source once every record has been
    /// read, or when the assembler is already closed. Any error while reading
    /// a record is fatal to the session: the source is released as well.
    pub fn advance(&mut self) -> Result<bool> {
        self.record_len = None;
        if self.stream.is_none() {
            return Ok(false);
        }
        self.position += 1;
        if self.position > self.total_records {
            self.close();
            return Ok(false);
        }
        match self.read_record() {
            Ok(len) => {
                self.record_len = Some(len);
                Ok(true)
            }
            Err(e) => {
                self.close();
                Err(e)
            }
        }
    }

    /// Bytes of the current record, if any.
    ///
    /// The slice is overwritten by the next call to [`advance`](Self::advance).
    pub fn record(&self) -> Option<&[u8]> {
        self.record_len.map(|len| &self.buffer[..len])
    }

    /// 1-based ordinal of the current record, or 0 before the first advance.
    pub fn position(&self) -> u64 {
        self.position.min(self.total_records)
    }

    pub fn total_records(&self) -> u64 {
        self.total_records
    }

    /// Current size of the record buffer.
    pub fn buffer_capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_closed(&self) -> bool {
        self.stream.is_none()
    }

    /// Releases the underlying source. Safe to call at any point, any number
    /// of times.
    pub fn close(&mut self) {
        self.record_len = None;
        if let Some(stream) = self.stream.take() {
            debug!(
                "closing record stream at record {} of {} after {} blocks",
                self.position.min(self.total_records),
                self.total_records,
                stream.blocks_read()
            );
        }
    }

    fn read_record(&mut self) -> Result<usize> {
        let Some(stream) = self.stream.as_mut() else {
            return Ok(0);
        };
        if !self.has_var_fields {
            stream.fill(&mut self.buffer[..self.fixed_size])?;
            return Ok(self.fixed_size);
        }

        let head = self.fixed_size + VAR_LENGTH_SIZE;
        stream.fill(&mut self.buffer[..head])?;
        let var_len = LittleEndian::read_u32(&self.buffer[self.fixed_size..head]) as usize;
        let required = head.saturating_add(var_len);
        let grown = (required > self.buffer.len()).then(|| required.saturating_mul(2));
        if let Some(grown) = grown {
            debug!(
                "growing record buffer from {} to {grown} bytes for record {}",
                self.buffer.len(),
                self.position
            );
        }

        // Grow at most one step ahead of the payload bytes actually read.
        let mut filled = head;
        while filled < required {
            let end = required.min(filled.saturating_add(GROWTH_STEP));
            if end > self.buffer.len() {
                self.buffer.resize(end, 0);
            }
            stream.fill(&mut self.buffer[filled..end])?;
            filled = end;
        }

        if let Some(grown) = grown {
            self.buffer
                .try_reserve_exact(grown - self.buffer.len())
                .map_err(|e| {
                    Error::invalid_format("record", format!("cannot buffer {grown} bytes: {e}"))
                })?;
            self.buffer.resize(grown, 0);
        }
        Ok(required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read::VERBATIM_BLOCK_FLAG;
    use yxdb_common::error::ErrorKind;
    use yxdb_format::FieldDescriptor;

    fn verbatim_block(data: &[u8]) -> Vec<u8> {
        let mut block = (data.len() as u32 | VERBATIM_BLOCK_FLAG).to_le_bytes().to_vec();
        block.extend_from_slice(data);
        block
    }

    fn int16_schema() -> RecordSchema {
        RecordSchema::new(&[FieldDescriptor::new("value", "Int16", 2, 0)]).unwrap()
    }

    fn blob_schema() -> RecordSchema {
        RecordSchema::new(&[
            FieldDescriptor::new("id", "Byte", 1, 0),
            FieldDescriptor::new("payload", "Blob", 0, 0),
        ])
        .unwrap()
    }

    /// A record of `blob_schema` whose blob is a normal block of `payload`.
    fn blob_record(id: u8, payload: &[u8]) -> Vec<u8> {
        let mut var = ((payload.len() as u32) * 2).to_le_bytes().to_vec();
        var.extend_from_slice(payload);
        let mut record = vec![id, 0];
        // block starts right after the field and the variable length
        record.extend_from_slice(&8u32.to_le_bytes());
        record.extend_from_slice(&(var.len() as u32).to_le_bytes());
        record.extend(var);
        record
    }

    fn assembler<'a>(source: &'a [u8], schema: &RecordSchema, total: u64) -> RecordAssembler<&'a [u8]> {
        RecordAssembler::new(RecordStream::new(source, 1024), schema, total, 16)
    }

    #[test]
    fn test_fixed_records() {
        let source = verbatim_block(&[1, 0, 0, 2, 0, 0, 0, 0, 1]);
        let schema = int16_schema();
        let mut records = assembler(&source, &schema, 3);

        let mut values = Vec::new();
        while records.advance().unwrap() {
            values.push(schema.extract_from_index(0, records.record().unwrap()).unwrap());
        }
        assert_eq!(
            values,
            vec![
                yxdb_format::Value::Int(1),
                yxdb_format::Value::Int(2),
                yxdb_format::Value::Null
            ]
        );
        assert!(records.is_closed());
        assert!(records.record().is_none());
        assert!(!records.advance().unwrap());
    }

    #[test]
    fn test_advance_count_matches_total() {
        let source = verbatim_block(&[0u8; 30]);
        let schema = int16_schema();
        let mut records = assembler(&source, &schema, 10);
        let mut count = 0;
        while records.advance().unwrap() {
            count += 1;
            assert_eq!(records.position(), count);
        }
        assert_eq!(count, 10);
        assert!(records.is_closed());
    }

    #[test]
    fn test_zero_records() {
        let schema = int16_schema();
        let mut records = assembler(&[], &schema, 0);
        assert!(!records.advance().unwrap());
        assert!(records.is_closed());
    }

    #[test]
    fn test_variable_records() {
        let schema = blob_schema();
        let mut data = blob_record(1, b"first");
        data.extend(blob_record(2, b""));
        let source = verbatim_block(&data);
        let mut records = assembler(&source, &schema, 2);

        assert!(records.advance().unwrap());
        let record = records.record().unwrap();
        assert_eq!(schema.blob_from_index(1, record).unwrap(), Some(&b"first"[..]));
        assert!(records.advance().unwrap());
        let record = records.record().unwrap();
        assert_eq!(record[0], 2);
        assert_eq!(schema.blob_from_index(1, record).unwrap(), Some(&b""[..]));
        assert!(!records.advance().unwrap());
    }

    #[test]
    fn test_buffer_growth_preserves_fixed_region() {
        let schema = blob_schema();
        let payload: Vec<u8> = (0..200u8).collect();
        let source = verbatim_block(&blob_record(42, &payload));
        let mut records = assembler(&source, &schema, 1);
        assert_eq!(records.buffer_capacity(), schema.fixed_size() + 4 + 16);

        assert!(records.advance().unwrap());
        let required = schema.fixed_size() + 4 + 4 + payload.len();
        assert_eq!(records.buffer_capacity(), required * 2);
        let record = records.record().unwrap();
        assert_eq!(record.len(), required);
        assert_eq!(&record[..2], &[42, 0]);
        assert_eq!(
            schema.blob_from_name("payload", record).unwrap(),
            Some(&payload[..])
        );
    }

    #[test]
    fn test_large_payload_across_growth_steps() {
        let schema = blob_schema();
        let payload: Vec<u8> = (0..200_000u32).map(|i| i as u8).collect();
        let source = verbatim_block(&blob_record(7, &payload));
        let mut records =
            RecordAssembler::new(RecordStream::new(&source[..], 1 << 20), &schema, 1, 16);

        assert!(records.advance().unwrap());
        let required = schema.fixed_size() + 4 + 4 + payload.len();
        assert_eq!(records.buffer_capacity(), required * 2);
        assert_eq!(
            schema.blob_from_name("payload", records.record().unwrap()).unwrap(),
            Some(&payload[..])
        );
    }

    #[test]
    fn test_corrupt_variable_length_is_truncated() {
        let schema = blob_schema();
        let mut record = blob_record(1, b"abc");
        let len_at = schema.fixed_size();
        record[len_at..len_at + 4].copy_from_slice(&0xFFFF_FFF0u32.to_le_bytes());
        let source = verbatim_block(&record);
        let mut records = assembler(&source, &schema, 1);

        let err = records.advance().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Truncated { .. }));
        assert!(records.is_closed());
        assert!(records.buffer_capacity() <= schema.fixed_size() + 4 + GROWTH_STEP);
    }

    #[test]
    fn test_close_mid_stream() {
        let source = verbatim_block(&[1, 0, 0, 2, 0, 0]);
        let schema = int16_schema();
        let mut records = assembler(&source, &schema, 2);
        assert!(records.advance().unwrap());
        records.close();
        records.close();
        assert!(records.record().is_none());
        assert!(!records.advance().unwrap());
    }

    #[test]
    fn test_truncated_stream_closes_source() {
        let source = verbatim_block(&[1, 0, 0]);
        let schema = int16_schema();
        let mut records = assembler(&source, &schema, 2);
        assert!(records.advance().unwrap());
        let err = records.advance().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Truncated { .. }));
        assert!(records.is_closed());
        assert!(!records.advance().unwrap());
    }
}
