//! Generic conversions: dict records, tables and CSV

use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::domain::transform::ElementTable;
use crate::domain::{DomainError, Element};

const BASE_COLUMNS: [&str; 3] = ["type", "element_id", "text"];

/// Serialize one element to its mapping form
pub fn element_to_record(element: &Element) -> Map<String, Value> {
    match serde_json::to_value(element) {
        Ok(Value::Object(map)) => map,
        _ => {
            let mut map = Map::new();
            map.insert("type".to_string(), Value::String(element.category.as_str().to_string()));
            map.insert("element_id".to_string(), Value::String(element.element_id.clone()));
            map.insert("text".to_string(), Value::String(element.text.clone()));
            map
        }
    }
}

/// Serialize every element to its mapping form
pub fn convert_to_dict(elements: &[Element]) -> Vec<Map<String, Value>> {
    elements.iter().map(element_to_record).collect()
}

/// Rebuild elements from their mapping form
pub fn dict_to_elements(records: &[Value]) -> Result<Vec<Element>, DomainError> {
    records
        .iter()
        .enumerate()
        .map(|(position, record)| Element::from_record(record, position))
        .collect()
}

/// One row per element: type, id, text, then every flattened metadata key
/// seen in the sequence (sorted); missing values are null
pub fn convert_to_dataframe(elements: &[Element]) -> ElementTable {
    let flat: Vec<Map<String, Value>> = elements
        .iter()
        .map(|element| element.metadata.to_flat_map())
        .collect();

    let metadata_columns: BTreeSet<&String> = flat.iter().flat_map(|map| map.keys()).collect();

    let columns: Vec<String> = BASE_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(metadata_columns.iter().map(|c| c.to_string()))
        .collect();

    let rows = elements
        .iter()
        .zip(&flat)
        .map(|(element, metadata)| {
            let mut row = vec![
                Value::String(element.category.as_str().to_string()),
                Value::String(element.element_id.clone()),
                Value::String(element.text.clone()),
            ];
            row.extend(
                metadata_columns
                    .iter()
                    .map(|key| metadata.get(*key).cloned().unwrap_or(Value::Null)),
            );
            row
        })
        .collect();

    ElementTable { columns, rows }
}

pub(crate) fn csv_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn write_csv(columns: &[String], rows: &[Vec<Value>]) -> Result<String, DomainError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(columns)
        .map_err(|e| DomainError::internal(format!("Failed to write CSV: {}", e)))?;

    for row in rows {
        writer
            .write_record(row.iter().map(csv_cell))
            .map_err(|e| DomainError::internal(format!("Failed to write CSV: {}", e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| DomainError::internal(format!("Failed to flush CSV: {}", e)))?;

    String::from_utf8(bytes).map_err(|e| DomainError::internal(format!("CSV is not UTF-8: {}", e)))
}

/// Render the element table as CSV text
pub fn convert_to_csv(elements: &[Element]) -> Result<String, DomainError> {
    let table = convert_to_dataframe(elements);
    write_csv(&table.columns, &table.rows)
}
