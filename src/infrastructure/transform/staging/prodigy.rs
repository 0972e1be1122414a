//! Prodigy exports

use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::base::write_csv;
use super::check_len;
use crate::domain::{DomainError, Element};

const RESERVED_KEY: &str = "id";

fn validate_metadata(
    elements: &[Element],
    metadata: &[Map<String, Value>],
) -> Result<Vec<Map<String, Value>>, DomainError> {
    if metadata.is_empty() {
        return Ok(vec![Map::new(); elements.len()]);
    }

    check_len("metadata", elements.len(), metadata.len())?;

    if metadata.iter().any(|m| m.contains_key(RESERVED_KEY)) {
        return Err(DomainError::validation(
            "The key 'id' is reserved and cannot be used in Prodigy metadata",
        ));
    }

    Ok(metadata.to_vec())
}

/// One `{text, meta}` task per element; `meta.id` is the element id
pub fn stage_for_prodigy(
    elements: &[Element],
    metadata: &[Map<String, Value>],
) -> Result<Vec<Map<String, Value>>, DomainError> {
    let metadata = validate_metadata(elements, metadata)?;

    Ok(elements
        .iter()
        .zip(metadata)
        .map(|(element, mut meta)| {
            meta.insert(RESERVED_KEY.to_string(), Value::String(element.element_id.clone()));

            let mut task = Map::new();
            task.insert("text".to_string(), Value::String(element.text.clone()));
            task.insert("meta".to_string(), Value::Object(meta));
            task
        })
        .collect())
}

/// CSV with `text`, `id` and one column per metadata key
pub fn stage_csv_for_prodigy(
    elements: &[Element],
    metadata: &[Map<String, Value>],
) -> Result<String, DomainError> {
    let metadata = validate_metadata(elements, metadata)?;

    let keys: BTreeSet<&String> = metadata.iter().flat_map(|m| m.keys()).collect();
    let columns: Vec<String> = ["text", RESERVED_KEY]
        .iter()
        .map(|c| c.to_string())
        .chain(keys.iter().map(|k| k.to_string()))
        .collect();

    let rows: Vec<Vec<Value>> = elements
        .iter()
        .zip(&metadata)
        .map(|(element, meta)| {
            let mut row = vec![
                Value::String(element.text.clone()),
                Value::String(element.element_id.clone()),
            ];
            row.extend(keys.iter().map(|key| meta.get(*key).cloned().unwrap_or(Value::Null)));
            row
        })
        .collect();

    write_csv(&columns, &rows)
}
