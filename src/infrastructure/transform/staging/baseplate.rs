//! Baseplate export

use serde_json::{json, Value};

use crate::domain::Element;

/// `{"rows": [{"data": {...}, "metadata": {...}}]}` with flattened metadata
pub fn stage_for_baseplate(elements: &[Element]) -> Value {
    let rows: Vec<Value> = elements
        .iter()
        .map(|element| {
            json!({
                "data": {
                    "type": element.category.as_str(),
                    "element_id": element.element_id,
                    "text": element.text,
                },
                "metadata": element.metadata.to_flat_map(),
            })
        })
        .collect();

    json!({ "rows": rows })
}
