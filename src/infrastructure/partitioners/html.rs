//! HTML partitioner

use scraper::{ElementRef, Html, Selector};

use super::text::{classify_text, normalize_whitespace};
use super::{ElementCollector, FormatPartitioner};
use crate::domain::{DomainError, ElementCategory, FileType};

const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "head", "template", "svg", "nav", "iframe",
];

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "main", "aside", "header", "footer", "h1", "h2", "h3", "h4",
    "h5", "h6", "ul", "ol", "li", "table", "pre", "blockquote", "address", "figure", "figcaption",
    "form", "dl", "dt", "dd",
];

/// Partitioner for HTML documents
#[derive(Debug, Clone, Default)]
pub struct HtmlPartitioner;

impl HtmlPartitioner {
    pub fn new() -> Self {
        Self
    }

    fn has_block_children(element: &ElementRef) -> bool {
        element
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .any(|el| BLOCK_TAGS.contains(&el.value().name()))
    }

    fn element_text(element: &ElementRef) -> String {
        normalize_whitespace(&element.text().collect::<String>())
    }

    fn table_text(table: &ElementRef) -> String {
        let Ok(cells) = Selector::parse("td, th") else {
            return Self::element_text(table);
        };

        table
            .select(&cells)
            .map(|cell| Self::element_text(&cell))
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn walk(element: &ElementRef, collector: &mut ElementCollector) {
        for node in element.children() {
            let Some(child) = ElementRef::wrap(node) else {
                if let Some(text) = node.value().as_text() {
                    let text = normalize_whitespace(text);
                    if !text.is_empty() {
                        collector.push(classify_text(&text), text);
                    }
                }
                continue;
            };

            let tag = child.value().name();

            if SKIPPED_TAGS.contains(&tag) {
                continue;
            }

            match tag {
                "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                    let text = Self::element_text(&child);
                    if !text.is_empty() {
                        let depth = tag[1..].parse::<u32>().unwrap_or(1) - 1;
                        collector.push_title(text, depth);
                    }
                }
                "li" | "dt" | "dd" if !Self::has_block_children(&child) => {
                    let text = Self::element_text(&child);
                    if !text.is_empty() {
                        collector.push(ElementCategory::ListItem, text);
                    }
                }
                "table" => {
                    let text = Self::table_text(&child);
                    if !text.is_empty() {
                        let html = child.html();
                        collector.push_with(ElementCategory::Table, text, |metadata| {
                            metadata.with_text_as_html(html)
                        });
                    }
                }
                "pre" => {
                    let text = child.text().collect::<String>();
                    let text = text.trim_matches('\n').trim_end();
                    if !text.is_empty() {
                        collector.push(ElementCategory::CodeSnippet, text);
                    }
                }
                "address" => {
                    let text = Self::element_text(&child);
                    if !text.is_empty() {
                        collector.push(ElementCategory::Address, text);
                    }
                }
                "figcaption" => {
                    let text = Self::element_text(&child);
                    if !text.is_empty() {
                        collector.push(ElementCategory::FigureCaption, text);
                    }
                }
                "img" => {
                    if let Some(alt) = child.value().attr("alt") {
                        let alt = normalize_whitespace(alt);
                        if !alt.is_empty() {
                            collector.push(ElementCategory::Image, alt);
                        }
                    }
                }
                "br" | "hr" => {}
                _ if Self::has_block_children(&child) => Self::walk(&child, collector),
                _ => {
                    let text = Self::element_text(&child);
                    if !text.is_empty() {
                        collector.push(classify_text(&text), text);
                    }
                }
            }
        }
    }
}

impl FormatPartitioner for HtmlPartitioner {
    fn file_type(&self) -> FileType {
        FileType::Html
    }

    fn partition_text(
        &self,
        text: &str,
        collector: &mut ElementCollector,
    ) -> Result<(), DomainError> {
        let document = Html::parse_document(text);

        let body = Selector::parse("body")
            .ok()
            .and_then(|selector| document.select(&selector).next());

        match body {
            Some(body) => Self::walk(&body, collector),
            None => Self::walk(&document.root_element(), collector),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Element, ElementMetadata};

    fn partition(html: &str) -> Vec<Element> {
        let mut collector = ElementCollector::new(ElementMetadata::new(), false);
        HtmlPartitioner::new()
            .partition_text(html, &mut collector)
            .unwrap();
        collector.finish()
    }

    #[test]
    fn test_headings_paragraphs_and_lists() {
        let html = r#"
            <!DOCTYPE html>
            <html>
            <head><title>Ignored</title></head>
            <body>
                <h1>Hello World</h1>
                <p>This is a paragraph with enough words to be narrative.</p>
                <ul><li>First</li><li>Second</li></ul>
            </body>
            </html>
        "#;

        let elements = partition(html);

        assert_eq!(elements.len(), 4);
        assert_eq!(elements[0].category, ElementCategory::Title);
        assert_eq!(elements[0].text, "Hello World");
        assert_eq!(elements[0].metadata.category_depth, Some(0));
        assert_eq!(elements[1].category, ElementCategory::NarrativeText);
        assert_eq!(
            elements[1].metadata.parent_id.as_deref(),
            Some(elements[0].element_id.as_str())
        );
        assert_eq!(elements[2].category, ElementCategory::ListItem);
        assert_eq!(elements[3].text, "Second");
    }

    #[test]
    fn test_scripts_and_styles_are_skipped() {
        let html = r#"
            <html>
            <head><style>.hidden { display: none; }</style></head>
            <body>
                <p>Visible text stays in the output.</p>
                <script>var x = 'hidden';</script>
            </body>
            </html>
        "#;

        let elements = partition(html);

        assert_eq!(elements.len(), 1);
        assert!(!elements[0].text.contains("hidden"));
    }

    #[test]
    fn test_table_keeps_html() {
        let html = "<body><table><tr><th>Name</th><th>Age</th></tr>\
                    <tr><td>Ada</td><td>36</td></tr></table></body>";

        let elements = partition(html);

        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].category, ElementCategory::Table);
        assert_eq!(elements[0].text, "Name Age Ada 36");
        assert!(elements[0]
            .metadata
            .text_as_html
            .as_deref()
            .unwrap()
            .starts_with("<table>"));
    }

    #[test]
    fn test_nested_divs_and_code() {
        let html =
            "<body><div><div><h2>Usage</h2><pre>cargo build\ncargo test</pre></div></div></body>";

        let elements = partition(html);

        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].metadata.category_depth, Some(1));
        assert_eq!(elements[1].category, ElementCategory::CodeSnippet);
        assert_eq!(elements[1].text, "cargo build\ncargo test");
    }
}
