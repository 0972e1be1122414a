//! Element metadata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Bounding box of an element on its page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Corner points in reading order
    pub points: Vec<(f64, f64)>,
    /// Coordinate system name (e.g. "PixelSpace")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
}

/// Free-form metadata attached to an element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_directory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filetype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_depth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_as_html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    /// Custom metadata fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ElementMetadata {
    /// Create empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the filename and directory from a path string
    pub fn with_path(mut self, path: &std::path::Path) -> Self {
        self.filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string());
        self.file_directory = path
            .parent()
            .map(|dir| dir.to_string_lossy().to_string())
            .filter(|dir| !dir.is_empty());
        self
    }

    /// Set filename
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Set source URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set MIME type of the source document
    pub fn with_filetype(mut self, filetype: impl Into<String>) -> Self {
        self.filetype = Some(filetype.into());
        self
    }

    /// Set page number
    pub fn with_page_number(mut self, page_number: u32) -> Self {
        self.page_number = Some(page_number);
        self
    }

    /// Set heading depth
    pub fn with_category_depth(mut self, depth: u32) -> Self {
        self.category_depth = Some(depth);
        self
    }

    /// Set parent element id
    pub fn with_parent_id(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Set the HTML rendering of a table
    pub fn with_text_as_html(mut self, html: impl Into<String>) -> Self {
        self.text_as_html = Some(html.into());
        self
    }

    /// Set last-modified timestamp
    pub fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = Some(last_modified);
        self
    }

    /// Set detected or declared languages
    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        self.languages = languages;
        self
    }

    /// Add custom metadata
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Source identifier: URL when fetched remotely, otherwise the file name
    pub fn source(&self) -> Option<&str> {
        self.url.as_deref().or(self.filename.as_deref())
    }

    /// Flatten into a single-level JSON map.
    ///
    /// Nested values (coordinates, custom objects) are joined into
    /// dotted keys, e.g. `coordinates.system`.
    pub fn to_flat_map(&self) -> Map<String, Value> {
        let mut flat = Map::new();

        if let Ok(Value::Object(map)) = serde_json::to_value(self) {
            for (key, value) in map {
                flatten_into(&mut flat, key, value);
            }
        }

        flat
    }

    /// Drop the named top-level keys (used by ingest output filtering)
    pub fn without_keys(&self, keys: &[String]) -> Map<String, Value> {
        let mut map = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };

        for key in keys {
            map.remove(key);
        }

        map
    }
}

fn flatten_into(flat: &mut Map<String, Value>, prefix: String, value: Value) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_into(flat, format!("{}.{}", prefix, key), nested);
            }
        }
        other => {
            flat.insert(prefix, other);
        }
    }
}
