//! Datasaur export

use serde_json::{Map, Value};

use super::check_len;
use crate::domain::transform::DatasaurEntity;
use crate::domain::{DomainError, Element};

fn validate_entity(element: &Element, entity: &DatasaurEntity) -> Result<(), DomainError> {
    let len = element.char_count();

    if entity.start_idx > entity.end_idx || entity.end_idx > len {
        return Err(DomainError::validation(format!(
            "Entity '{}' spans {}..{} outside of element '{}' ({} characters)",
            entity.text, entity.start_idx, entity.end_idx, element.element_id, len
        )));
    }

    Ok(())
}

/// One `{text, entities}` record per element
pub fn stage_for_datasaur(
    elements: &[Element],
    entities: &[Vec<DatasaurEntity>],
) -> Result<Vec<Map<String, Value>>, DomainError> {
    if !entities.is_empty() {
        check_len("entities", elements.len(), entities.len())?;
    }

    let mut records = Vec::with_capacity(elements.len());

    for (idx, element) in elements.iter().enumerate() {
        let element_entities = entities.get(idx).map(Vec::as_slice).unwrap_or_default();

        for entity in element_entities {
            validate_entity(element, entity)?;
        }

        let entities = serde_json::to_value(element_entities)
            .map_err(|e| DomainError::internal(format!("Failed to serialize entities: {}", e)))?;

        let mut record = Map::new();
        record.insert("text".to_string(), Value::String(element.text.clone()));
        record.insert("entities".to_string(), entities);
        records.push(record);
    }

    Ok(records)
}
