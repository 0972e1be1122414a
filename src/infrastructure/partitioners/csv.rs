//! CSV partitioner

use super::{escape_html, ElementCollector, FormatPartitioner};
use crate::domain::{DomainError, ElementCategory, FileType};

/// Turns a CSV file into a single `Table` element
#[derive(Debug, Clone, Default)]
pub struct CsvPartitioner;

impl CsvPartitioner {
    pub fn new() -> Self {
        Self
    }

    fn read_rows(text: &str) -> Result<Vec<Vec<String>>, DomainError> {
        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        reader
            .records()
            .map(|record| {
                record
                    .map(|record| record.iter().map(|cell| cell.trim().to_string()).collect())
                    .map_err(|e| DomainError::validation(format!("Invalid CSV: {}", e)))
            })
            .collect()
    }
}

impl FormatPartitioner for CsvPartitioner {
    fn file_type(&self) -> FileType {
        FileType::Csv
    }

    fn partition_text(
        &self,
        text: &str,
        collector: &mut ElementCollector,
    ) -> Result<(), DomainError> {
        let rows = Self::read_rows(text)?;

        if rows.is_empty() {
            return Ok(());
        }

        let mut html = String::from("<table>");
        for (idx, row) in rows.iter().enumerate() {
            let tag = if idx == 0 { "th" } else { "td" };
            html.push_str("<tr>");
            for cell in row {
                html.push_str(&format!("<{tag}>{}</{tag}>", escape_html(cell)));
            }
            html.push_str("</tr>");
        }
        html.push_str("</table>");

        let text = rows
            .iter()
            .map(|row| row.join(" "))
            .collect::<Vec<_>>()
            .join("\n");

        collector.push_with(ElementCategory::Table, text, |metadata| {
            metadata.with_text_as_html(html)
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ElementMetadata;

    #[test]
    fn test_csv_table() {
        let mut collector = ElementCollector::new(ElementMetadata::new(), false);
        CsvPartitioner::new()
            .partition_text("name,role\nAda,\"Engineer, lead\"\n", &mut collector)
            .unwrap();

        let elements = collector.finish();

        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].category, ElementCategory::Table);
        assert_eq!(elements[0].text, "name role\nAda Engineer, lead");
        assert_eq!(
            elements[0].metadata.text_as_html.as_deref(),
            Some(
                "<table><tr><th>name</th><th>role</th></tr>\
                 <tr><td>Ada</td><td>Engineer, lead</td></tr></table>"
            )
        );
    }

    #[test]
    fn test_empty_csv() {
        let mut collector = ElementCollector::new(ElementMetadata::new(), false);
        CsvPartitioner::new().partition_text("", &mut collector).unwrap();
        assert!(collector.is_empty());
    }
}
