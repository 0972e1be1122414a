//! JSON partitioner for serialized element lists

use serde_json::Value;

use super::{ElementCollector, FormatPartitioner};
use crate::domain::{DomainError, Element, FileType};

/// Reads back element lists written by `convert_to_dict` or an ingest run.
///
/// Each record keeps its own metadata; the collector's base metadata only
/// fills fields the record leaves unset.
#[derive(Debug, Clone, Default)]
pub struct JsonPartitioner;

impl JsonPartitioner {
    pub fn new() -> Self {
        Self
    }
}

impl FormatPartitioner for JsonPartitioner {
    fn file_type(&self) -> FileType {
        FileType::Json
    }

    fn partition_text(
        &self,
        text: &str,
        collector: &mut ElementCollector,
    ) -> Result<(), DomainError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| DomainError::validation(format!("Invalid JSON: {}", e)))?;

        let Value::Array(records) = value else {
            return Err(DomainError::validation(
                "JSON content must be a list of element records",
            ));
        };

        for (position, record) in records.iter().enumerate() {
            let element = Element::from_record(record, position)?;
            let Element {
                element_id,
                category,
                text,
                metadata,
            } = element;

            collector.push_with(category, text, |base| {
                let mut merged = metadata;
                merged.filename = merged.filename.or(base.filename);
                merged.file_directory = merged.file_directory.or(base.file_directory);
                merged.filetype = merged.filetype.or(base.filetype);
                merged.url = merged.url.or(base.url);
                merged.parent_id = merged.parent_id.or(base.parent_id);
                merged.page_number = merged.page_number.or(base.page_number);
                merged.with_extra("source_element_id", Value::String(element_id))
            });
        }

        Ok(())
    }
}
