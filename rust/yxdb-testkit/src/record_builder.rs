//! Record layout construction.

/// Physical encoding of a blob value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobEncoding {
    /// Payload inline in the four-byte field; up to three bytes.
    Tiny,
    /// One length byte followed by the payload; up to 127 bytes.
    SmallBlock,
    /// Four length bytes followed by the payload.
    NormalBlock,
}

#[derive(Debug, Clone)]
struct PendingBlob {
    field_start: usize,
    payload: Vec<u8>,
    encoding: BlobEncoding,
}

/// Lays out one record field by field, in schema order.
///
/// Variable-length values are collected and placed after the fixed region
/// by [`finish`](Self::finish), which also writes their relative offsets.
#[derive(Debug, Clone, Default)]
pub struct RecordBuilder {
    fixed: Vec<u8>,
    blobs: Vec<PendingBlob>,
    has_var_fields: bool,
}

impl RecordBuilder {
    pub fn new() -> RecordBuilder {
        Default::default()
    }

    pub fn int16(self, value: Option<i16>) -> Self {
        self.fixed_field(value.map(i16::to_le_bytes).as_ref().map(|b| &b[..]), 2)
    }

    pub fn int32(self, value: Option<i32>) -> Self {
        self.fixed_field(value.map(i32::to_le_bytes).as_ref().map(|b| &b[..]), 4)
    }

    pub fn int64(self, value: Option<i64>) -> Self {
        self.fixed_field(value.map(i64::to_le_bytes).as_ref().map(|b| &b[..]), 8)
    }

    pub fn float(self, value: Option<f32>) -> Self {
        self.fixed_field(value.map(f32::to_le_bytes).as_ref().map(|b| &b[..]), 4)
    }

    pub fn double(self, value: Option<f64>) -> Self {
        self.fixed_field(value.map(f64::to_le_bytes).as_ref().map(|b| &b[..]), 8)
    }

    /// Decimal text padded with zeros to `size` bytes.
    pub fn fixed_decimal(self, value: Option<&str>, size: usize) -> Self {
        self.string(value, size)
    }

    pub fn string(self, value: Option<&str>, size: usize) -> Self {
        let bytes = value.map(|s| padded(s.as_bytes(), size));
        self.fixed_field(bytes.as_deref(), size)
    }

    pub fn wstring(self, value: Option<&str>, size: usize) -> Self {
        let bytes = value.map(|s| padded(&utf16_bytes(s), size * 2));
        self.fixed_field(bytes.as_deref(), size * 2)
    }

    /// `YYYY-MM-DD` text.
    pub fn date(self, value: Option<&str>) -> Self {
        self.string(value, 10)
    }

    /// `YYYY-MM-DD HH:MM:SS` text.
    pub fn date_time(self, value: Option<&str>) -> Self {
        self.string(value, 19)
    }

    pub fn bool(mut self, value: Option<bool>) -> Self {
        self.fixed.push(match value {
            Some(false) => 0,
            Some(true) => 1,
            None => 2,
        });
        self
    }

    pub fn byte(self, value: Option<u8>) -> Self {
        self.fixed_field(value.as_ref().map(std::slice::from_ref), 1)
    }

    pub fn v_string(self, value: Option<&str>) -> Self {
        self.blob(value.map(str::as_bytes))
    }

    pub fn v_wstring(self, value: Option<&str>) -> Self {
        let bytes = value.map(utf16_bytes);
        self.blob(bytes.as_deref())
    }

    /// A blob in the most compact encoding that fits the payload.
    pub fn blob(self, value: Option<&[u8]>) -> Self {
        let encoding = match value.map(<[u8]>::len) {
            Some(1..=3) => BlobEncoding::Tiny,
            Some(0..=127) => BlobEncoding::SmallBlock,
            _ => BlobEncoding::NormalBlock,
        };
        self.blob_with(value, encoding)
    }

    pub fn blob_with(mut self, value: Option<&[u8]>, encoding: BlobEncoding) -> Self {
        self.has_var_fields = true;
        let field_start = self.fixed.len();
        match value {
            None => self.fixed.extend_from_slice(&1u32.to_le_bytes()),
            Some([]) => self.fixed.extend_from_slice(&0u32.to_le_bytes()),
            Some(payload) if encoding == BlobEncoding::Tiny => {
                assert!(payload.len() <= 3, "tiny blobs hold at most three bytes");
                let mut field = [0u8; 4];
                field[..payload.len()].copy_from_slice(payload);
                field[3] = (payload.len() as u8) << 4;
                self.fixed.extend_from_slice(&field);
            }
            Some(payload) => {
                self.fixed.extend_from_slice(&[0u8; 4]);
                self.blobs.push(PendingBlob {
                    field_start,
                    payload: payload.to_vec(),
                    encoding,
                });
            }
        }
        self
    }

    /// Raw bytes appended to the fixed region as-is.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.fixed.extend_from_slice(bytes);
        self
    }

    /// Produces the record: the fixed region, then, when any variable-length
    /// field was added, the payload length and the payload.
    pub fn finish(mut self) -> Vec<u8> {
        if !self.has_var_fields {
            return self.fixed;
        }
        let var_start = self.fixed.len() + 4;
        let mut var = Vec::new();
        for blob in &self.blobs {
            let offset = (var_start + var.len() - blob.field_start) as u32;
            self.fixed[blob.field_start..blob.field_start + 4]
                .copy_from_slice(&offset.to_le_bytes());
            match blob.encoding {
                BlobEncoding::SmallBlock => {
                    assert!(blob.payload.len() <= 127, "small blocks hold at most 127 bytes");
                    var.push(((blob.payload.len() as u8) << 1) | 1);
                }
                _ => var.extend_from_slice(&(blob.payload.len() as u32 * 2).to_le_bytes()),
            }
            var.extend_from_slice(&blob.payload);
        }
        let mut record = self.fixed;
        record.extend_from_slice(&(var.len() as u32).to_le_bytes());
        record.extend(var);
        record
    }

    fn fixed_field(mut self, value: Option<&[u8]>, len: usize) -> Self {
        match value {
            Some(bytes) => {
                self.fixed.extend_from_slice(bytes);
                self.fixed.push(0);
            }
            None => {
                self.fixed.extend(std::iter::repeat_n(0, len));
                self.fixed.push(1);
            }
        }
        self
    }
}

fn padded(bytes: &[u8], len: usize) -> Vec<u8> {
    let mut out = bytes[..bytes.len().min(len)].to_vec();
    out.resize(len, 0);
    out
}

fn utf16_bytes(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}
