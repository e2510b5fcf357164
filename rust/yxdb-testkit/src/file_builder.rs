//! In-memory YXDB file construction.

use std::io::{Seek, SeekFrom, Write};

use byteorder::{ByteOrder, LittleEndian};
use yxdb_encodings::lzf::MAX_LITERAL_RUN;
use yxdb_format::header::{HEADER_SIZE, META_INFO_LENGTH_OFFSET, RECORD_COUNT_OFFSET};

const VERBATIM_BLOCK_FLAG: u32 = 0x8000_0000;

/// How the record bytes are framed into blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockEncoding {
    /// Every block is stored uncompressed.
    Verbatim,
    /// Every block is LZF-encoded as a sequence of literal runs.
    Literal,
    /// Blocks alternate between literal-run LZF and verbatim, starting with LZF.
    Alternating,
}

/// Builds a complete database: header, UTF-16LE metadata and the record
/// block stream.
///
/// Records are concatenated and cut into blocks of `block_size` decoded
/// bytes, so a small block size makes records straddle block boundaries.
#[derive(Debug, Clone)]
pub struct YxdbFileBuilder {
    fields: Vec<String>,
    meta_info: Option<String>,
    records: Vec<Vec<u8>>,
    record_count: Option<u32>,
    block_size: usize,
    encoding: BlockEncoding,
}

impl Default for YxdbFileBuilder {
    fn default() -> Self {
        YxdbFileBuilder {
            fields: Vec::new(),
            meta_info: None,
            records: Vec::new(),
            record_count: None,
            block_size: 4096,
            encoding: BlockEncoding::Alternating,
        }
    }
}

impl YxdbFileBuilder {
    pub fn new() -> YxdbFileBuilder {
        Default::default()
    }

    /// Declares a field. `size` and `scale` are written only when non-zero.
    pub fn field(mut self, name: &str, field_type: &str, size: usize, scale: i32) -> Self {
        let mut element = format!(r#"<Field name="{}""#, escape(name));
        if scale != 0 {
            element.push_str(&format!(r#" scale="{scale}""#));
        }
        if size != 0 {
            element.push_str(&format!(r#" size="{size}""#));
        }
        element.push_str(&format!(r#" source="TextInput:" type="{field_type}"/>"#));
        self.fields.push(element);
        self
    }

    /// Replaces the generated metadata with arbitrary text.
    pub fn meta_info(mut self, xml: &str) -> Self {
        self.meta_info = Some(xml.to_string());
        self
    }

    pub fn record(mut self, record: Vec<u8>) -> Self {
        self.records.push(record);
        self
    }

    pub fn records(mut self, records: impl IntoIterator<Item = Vec<u8>>) -> Self {
        self.records.extend(records);
        self
    }

    /// Overrides the record count written to the header.
    pub fn record_count(mut self, count: u32) -> Self {
        self.record_count = Some(count);
        self
    }

    pub fn block_size(mut self, block_size: usize) -> Self {
        assert_ne!(block_size, 0);
        self.block_size = block_size;
        self
    }

    pub fn encoding(mut self, encoding: BlockEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn meta_info_xml(&self) -> String {
        if let Some(xml) = &self.meta_info {
            return xml.clone();
        }
        let mut xml = String::from("<MetaInfo connection=\"Output\">\n<RecordInfo>\n");
        for field in &self.fields {
            xml.push('\t');
            xml.push_str(field);
            xml.push('\n');
        }
        xml.push_str("</RecordInfo>\n</MetaInfo>\n");
        xml
    }

    pub fn build(&self) -> Vec<u8> {
        let meta: Vec<u16> = self.meta_info_xml().encode_utf16().collect();
        let record_count = self
            .record_count
            .unwrap_or(self.records.len() as u32);

        let mut file = vec![0u8; HEADER_SIZE];
        LittleEndian::write_u32(
            &mut file[META_INFO_LENGTH_OFFSET..META_INFO_LENGTH_OFFSET + 4],
            meta.len() as u32 + 1,
        );
        LittleEndian::write_u32(
            &mut file[RECORD_COUNT_OFFSET..RECORD_COUNT_OFFSET + 4],
            record_count,
        );
        for unit in meta {
            file.extend_from_slice(&unit.to_le_bytes());
        }
        file.extend_from_slice(&[0, 0]);

        let data = self.records.concat();
        for (i, chunk) in data.chunks(self.block_size).enumerate() {
            let verbatim = match self.encoding {
                BlockEncoding::Verbatim => true,
                BlockEncoding::Literal => false,
                BlockEncoding::Alternating => i % 2 == 1,
            };
            if verbatim {
                file.extend(verbatim_block(chunk));
            } else {
                file.extend(literal_block(chunk));
            }
        }
        file
    }
}

/// A block stored uncompressed.
pub fn verbatim_block(data: &[u8]) -> Vec<u8> {
    let mut block = (data.len() as u32 | VERBATIM_BLOCK_FLAG)
        .to_le_bytes()
        .to_vec();
    block.extend_from_slice(data);
    block
}

/// An LZF block made only of literal runs.
pub fn literal_block(data: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + data.len() / MAX_LITERAL_RUN + 1);
    for run in data.chunks(MAX_LITERAL_RUN) {
        body.push((run.len() - 1) as u8);
        body.extend_from_slice(run);
    }
    let mut block = (body.len() as u32).to_le_bytes().to_vec();
    block.extend(body);
    block
}

/// Writes `bytes` to a temporary file positioned at its start.
pub fn write_temp_file(bytes: &[u8]) -> anyhow::Result<tempfile::NamedTempFile> {
    let mut file = tempfile::Builder::new().suffix(".yxdb").tempfile()?;
    file.write_all(bytes)?;
    file.flush()?;
    file.seek(SeekFrom::Start(0))?;
    Ok(file)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_and_metadata() {
        let file = YxdbFileBuilder::new()
            .field("A & B", "Int16", 2, 0)
            .record(vec![1, 0, 0])
            .build();
        let xml = YxdbFileBuilder::new()
            .field("A & B", "Int16", 2, 0)
            .meta_info_xml();
        assert!(xml.contains(r#"name="A &amp; B""#));

        let meta_units = LittleEndian::read_u32(&file[80..84]) as usize;
        assert_eq!(meta_units, xml.encode_utf16().count() + 1);
        assert_eq!(LittleEndian::read_u32(&file[104..108]), 1);
        let blocks_start = HEADER_SIZE + meta_units * 2;
        assert_eq!(&file[blocks_start - 2..blocks_start], &[0, 0]);
        assert_eq!(&file[blocks_start..], &literal_block(&[1, 0, 0])[..]);
    }

    #[test]
    fn test_literal_block_splits_runs() {
        let data = [5u8; 40];
        let block = literal_block(&data);
        assert_eq!(LittleEndian::read_u32(&block), 42);
        assert_eq!(block[4], 31);
        assert_eq!(block[4 + 33], 7);
    }
}
