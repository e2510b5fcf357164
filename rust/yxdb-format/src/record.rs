//! Record layout derived from the schema metadata.

use ahash::AHashMap;
use yxdb_common::{Result, error::Error};

use crate::{
    extractor::FieldExtractor,
    field::{FieldDescriptor, FieldType, YxdbField},
    value::Value,
};

/// The fixed layout of a record: one extractor per field, in declaration order,
/// laid out back to back in the fixed region.
///
/// When the schema has variable-length fields, each record additionally carries
/// a four-byte length after the fixed region, followed by the variable payload.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    fields: Vec<YxdbField>,
    extractors: Vec<FieldExtractor>,
    name_to_index: AHashMap<String, usize>,
    fixed_size: usize,
    has_var_fields: bool,
}

impl RecordSchema {
    /// Computes the layout for `descriptors`.
    ///
    /// # Errors
    ///
    /// `UnknownFieldType` if any descriptor has an unrecognized type tag;
    /// `InvalidFormat` if a declared size does not fit the record layout. No
    /// schema is produced in either case.
    pub fn new(descriptors: &[FieldDescriptor]) -> Result<RecordSchema> {
        let mut schema = RecordSchema {
            fields: Vec::with_capacity(descriptors.len()),
            extractors: Vec::with_capacity(descriptors.len()),
            name_to_index: AHashMap::with_capacity(descriptors.len()),
            fixed_size: 0,
            has_var_fields: false,
        };
        let mut start = 0;
        for desc in descriptors {
            let ty = desc.resolve_type()?;
            schema.push(&desc.name, ty, FieldExtractor::new(ty, start, desc.size));
            start = ty
                .footprint(desc.size)
                .and_then(|footprint| start.checked_add(footprint))
                .ok_or_else(|| {
                    Error::invalid_format(
                        "field size",
                        format!("field '{}' of size {} overflows the record", desc.name, desc.size),
                    )
                })?;
            schema.has_var_fields |= ty.is_variable();
        }
        schema.fixed_size = start;
        Ok(schema)
    }

    fn push(&mut self, name: &str, ty: FieldType, extractor: FieldExtractor) {
        let index = self.fields.len();
        self.fields.push(YxdbField {
            name: name.to_string(),
            data_type: ty.data_type(),
        });
        self.extractors.push(extractor);
        self.name_to_index.insert(name.to_string(), index);
    }

    pub fn fields(&self) -> &[YxdbField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Size in bytes of the fixed region of every record.
    pub fn fixed_size(&self) -> usize {
        self.fixed_size
    }

    pub fn has_var_fields(&self) -> bool {
        self.has_var_fields
    }

    pub fn extractor(&self, index: usize) -> Result<&FieldExtractor> {
        self.extractors
            .get(index)
            .ok_or_else(|| Error::index_out_of_range(index, self.extractors.len()))
    }

    /// Resolves a field name to its index. When a name is declared more than
    /// once, the last declaration wins.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.name_to_index
            .get(name)
            .copied()
            .ok_or_else(|| Error::unknown_field_name(name))
    }

    pub fn extract_from_index(&self, index: usize, record: &[u8]) -> Result<Value> {
        self.extractor(index)?.extract(record)
    }

    pub fn extract_from_name(&self, name: &str, record: &[u8]) -> Result<Value> {
        self.extract_from_index(self.index_of(name)?, record)
    }

    pub fn blob_from_index<'a>(&self, index: usize, record: &'a [u8]) -> Result<Option<&'a [u8]>> {
        self.extractor(index)?.extract_blob(record)
    }

    pub fn blob_from_name<'a>(&self, name: &str, record: &'a [u8]) -> Result<Option<&'a [u8]>> {
        self.blob_from_index(self.index_of(name)?, record)
    }
}
