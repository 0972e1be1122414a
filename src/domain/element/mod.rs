//! Normalized content elements
//!
//! An [`Element`] is one unit of parsed document content (paragraph, title,
//! table, list item, ...) together with metadata describing where it came from.
//! Elements are produced in reading order and never mutated in place by the
//! transformation stages.

mod metadata;

pub use metadata::{Coordinates, ElementMetadata};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::DomainError;

/// Ordered sequence of elements produced for one document
pub type ElementSequence = Vec<Element>;

/// Category of a normalized element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementCategory {
    Title,
    NarrativeText,
    ListItem,
    Table,
    Text,
    UncategorizedText,
    CodeSnippet,
    Header,
    Footer,
    PageBreak,
    Image,
    FigureCaption,
    Formula,
    Address,
    EmailAddress,
    CompositeElement,
}

impl ElementCategory {
    /// Name used in serialized output (`type` field)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::NarrativeText => "NarrativeText",
            Self::ListItem => "ListItem",
            Self::Table => "Table",
            Self::Text => "Text",
            Self::UncategorizedText => "UncategorizedText",
            Self::CodeSnippet => "CodeSnippet",
            Self::Header => "Header",
            Self::Footer => "Footer",
            Self::PageBreak => "PageBreak",
            Self::Image => "Image",
            Self::FigureCaption => "FigureCaption",
            Self::Formula => "Formula",
            Self::Address => "Address",
            Self::EmailAddress => "EmailAddress",
            Self::CompositeElement => "CompositeElement",
        }
    }

    /// Parse a serialized category name
    pub fn parse(name: &str) -> Option<Self> {
        let category = match name {
            "Title" => Self::Title,
            "NarrativeText" => Self::NarrativeText,
            "ListItem" => Self::ListItem,
            "Table" => Self::Table,
            "Text" => Self::Text,
            "UncategorizedText" => Self::UncategorizedText,
            "CodeSnippet" => Self::CodeSnippet,
            "Header" => Self::Header,
            "Footer" => Self::Footer,
            "PageBreak" => Self::PageBreak,
            "Image" => Self::Image,
            "FigureCaption" => Self::FigureCaption,
            "Formula" => Self::Formula,
            "Address" => Self::Address,
            "EmailAddress" => Self::EmailAddress,
            "CompositeElement" => Self::CompositeElement,
            _ => return None,
        };

        Some(category)
    }

    /// Whether elements of this category carry running text
    pub fn is_text(&self) -> bool {
        !matches!(self, Self::Table | Self::PageBreak | Self::Image)
    }
}

impl std::fmt::Display for ElementCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized unit of document content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub element_id: String,
    #[serde(rename = "type")]
    pub category: ElementCategory,
    pub text: String,
    #[serde(default)]
    pub metadata: ElementMetadata,
}

impl Element {
    /// Create an element with an id derived from its content
    pub fn new(
        category: ElementCategory,
        text: impl Into<String>,
        metadata: ElementMetadata,
    ) -> Self {
        let text = text.into();
        let element_id = Self::derive_id(category, &text, &metadata, 0);

        Self {
            element_id,
            category,
            text,
            metadata,
        }
    }

    /// Create an element whose id also covers its position in the sequence,
    /// so repeated texts in one document get distinct ids
    pub fn at_position(
        category: ElementCategory,
        text: impl Into<String>,
        metadata: ElementMetadata,
        position: usize,
    ) -> Self {
        let text = text.into();
        let element_id = Self::derive_id(category, &text, &metadata, position);

        Self {
            element_id,
            category,
            text,
            metadata,
        }
    }

    /// Replace the element id
    pub fn with_id(mut self, element_id: impl Into<String>) -> Self {
        self.element_id = element_id.into();
        self
    }

    fn derive_id(
        category: ElementCategory,
        text: &str,
        metadata: &ElementMetadata,
        position: usize,
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update(category.as_str().as_bytes());
        hasher.update(text.as_bytes());

        if let Some(source) = metadata.source() {
            hasher.update(source.as_bytes());
        }

        if let Some(page) = metadata.page_number {
            hasher.update(page.to_le_bytes());
        }

        hasher.update(position.to_le_bytes());

        let digest = hex::encode(hasher.finalize());
        digest[..32].to_string()
    }

    /// Character count of the text payload
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Check if the text payload is blank
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Rebuild an element from its serialized mapping form.
    ///
    /// `type` and `text` are required; a missing `element_id` is derived from
    /// the content and `position`.
    pub fn from_record(record: &Value, position: usize) -> Result<Self, DomainError> {
        let object = record.as_object().ok_or_else(|| {
            DomainError::validation(format!("Element record {} is not an object", position))
        })?;

        let type_name = object.get("type").and_then(Value::as_str).ok_or_else(|| {
            DomainError::validation(format!("Element record {} is missing 'type'", position))
        })?;
        let category = ElementCategory::parse(type_name).ok_or_else(|| {
            DomainError::validation(format!("Unknown element type '{}'", type_name))
        })?;

        let text = object.get("text").and_then(Value::as_str).ok_or_else(|| {
            DomainError::validation(format!("Element record {} is missing 'text'", position))
        })?;

        let metadata = match object.get("metadata") {
            None | Some(Value::Null) => ElementMetadata::default(),
            Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
                DomainError::validation(format!("Invalid metadata in record {}: {}", position, e))
            })?,
        };

        let element = Self::at_position(category, text, metadata, position);

        Ok(match object.get("element_id").and_then(Value::as_str) {
            Some(id) => element.with_id(id),
            None => element,
        })
    }
}
