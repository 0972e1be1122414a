//! Weaviate export

use serde_json::{Map, Value};

use super::element_to_record;
use crate::domain::Element;

const EXCLUDED_KEYS: [&str; 1] = ["coordinates"];

/// Class schema properties for a Weaviate collection holding staged elements
pub fn weaviate_properties() -> Vec<&'static str> {
    vec![
        "text",
        "category",
        "filename",
        "file_directory",
        "url",
        "filetype",
        "page_number",
        "category_depth",
        "parent_id",
        "text_as_html",
        "last_modified",
        "languages",
    ]
}

/// One data object per element: its metadata without nested values, plus
/// `text` and `category`
pub fn stage_for_weaviate(elements: &[Element]) -> Vec<Map<String, Value>> {
    elements
        .iter()
        .map(|element| {
            let metadata = element_to_record(element).remove("metadata");
            let mut object: Map<String, Value> = match metadata {
                Some(Value::Object(metadata)) => metadata
                    .into_iter()
                    .filter(|(key, value)| {
                        !EXCLUDED_KEYS.contains(&key.as_str()) && !value.is_object()
                    })
                    .collect(),
                _ => Map::new(),
            };

            object.insert("text".to_string(), Value::String(element.text.clone()));
            object.insert(
                "category".to_string(),
                Value::String(element.category.as_str().to_string()),
            );
            object
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinates, ElementCategory, ElementMetadata};
    use serde_json::json;

    #[test]
    fn test_stage_for_weaviate() {
        let mut metadata = ElementMetadata::new()
            .with_filename("doc.txt")
            .with_page_number(3)
            .with_extra("nested", json!({"a": 1}));
        metadata.coordinates = Some(Coordinates {
            points: vec![(0.0, 0.0), (1.0, 1.0)],
            system: None,
        });

        let elements = vec![Element::new(ElementCategory::Title, "Hello", metadata)];
        let objects = stage_for_weaviate(&elements);

        assert_eq!(
            Value::Object(objects[0].clone()),
            json!({
                "filename": "doc.txt",
                "page_number": 3,
                "text": "Hello",
                "category": "Title",
            })
        );
    }

    #[test]
    fn test_properties_cover_staged_keys() {
        let properties = weaviate_properties();
        assert!(properties.contains(&"text"));
        assert!(properties.contains(&"category"));
        assert!(!properties.contains(&"coordinates"));
    }
}
