//! Element partitioner implementations

mod auto;
mod collector;
mod csv;
mod html;
mod json;
mod markdown;
mod text;

pub use auto::AutoPartitioner;
pub use collector::ElementCollector;
pub use csv::CsvPartitioner;
pub use html::HtmlPartitioner;
pub use json::JsonPartitioner;
pub use markdown::MarkdownPartitioner;
pub use text::TextPartitioner;

pub(crate) use text::{is_bulleted, BULLETS};

use std::fmt::Debug;

use crate::domain::{DomainError, FileType};

/// Partitions decoded text of one format into elements
pub trait FormatPartitioner: Send + Sync + Debug {
    /// Format handled by this partitioner
    fn file_type(&self) -> FileType;

    /// Append the elements of `text` to `collector`
    fn partition_text(
        &self,
        text: &str,
        collector: &mut ElementCollector,
    ) -> Result<(), DomainError>;
}

/// Factory for format partitioners
#[derive(Debug, Default)]
pub struct PartitionerFactory;

impl PartitionerFactory {
    /// Create the partitioner for a format
    pub fn create(file_type: FileType) -> Box<dyn FormatPartitioner> {
        match file_type {
            FileType::PlainText => Box::new(TextPartitioner::new()),
            FileType::Markdown => Box::new(MarkdownPartitioner::new()),
            FileType::Html => Box::new(HtmlPartitioner::new()),
            FileType::Json => Box::new(JsonPartitioner::new()),
            FileType::Csv => Box::new(CsvPartitioner::new()),
        }
    }
}

/// Escape text for inclusion in generated HTML
pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }

    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_covers_every_format() {
        for file_type in [
            FileType::PlainText,
            FileType::Markdown,
            FileType::Html,
            FileType::Json,
            FileType::Csv,
        ] {
            assert_eq!(PartitionerFactory::create(file_type).file_type(), file_type);
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    }
}
