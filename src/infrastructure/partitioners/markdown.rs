//! Markdown partitioner

use pulldown_cmark::{Event, Options, Parser, Tag};

use super::text::{classify_text, normalize_whitespace};
use super::{escape_html, ElementCollector, FormatPartitioner};
use crate::domain::{DomainError, ElementCategory, FileType};

/// Partitioner for Markdown documents
#[derive(Debug, Clone, Default)]
pub struct MarkdownPartitioner;

#[derive(Default)]
struct TableState {
    rows: Vec<Vec<String>>,
    header_rows: usize,
    in_head: bool,
}

impl TableState {
    fn text(&self) -> String {
        self.rows
            .iter()
            .flatten()
            .filter(|cell| !cell.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn html(&self) -> String {
        let mut html = String::from("<table>");

        for (idx, row) in self.rows.iter().enumerate() {
            let tag = if idx < self.header_rows { "th" } else { "td" };
            html.push_str("<tr>");
            for cell in row {
                html.push_str(&format!("<{tag}>{}</{tag}>", escape_html(cell)));
            }
            html.push_str("</tr>");
        }

        html.push_str("</table>");
        html
    }
}

impl MarkdownPartitioner {
    pub fn new() -> Self {
        Self
    }

    fn flush_item(buffer: &mut String, collector: &mut ElementCollector) {
        let text = normalize_whitespace(buffer);
        buffer.clear();
        if !text.is_empty() {
            collector.push(ElementCategory::ListItem, text);
        }
    }
}

impl FormatPartitioner for MarkdownPartitioner {
    fn file_type(&self) -> FileType {
        FileType::Markdown
    }

    fn partition_text(
        &self,
        text: &str,
        collector: &mut ElementCollector,
    ) -> Result<(), DomainError> {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);

        let mut buffer = String::new();
        let mut item_depth = 0usize;
        let mut in_code = false;
        let mut table: Option<TableState> = None;

        for event in Parser::new_ext(text, options) {
            match event {
                Event::Start(Tag::Heading(..)) | Event::Start(Tag::Paragraph) => {
                    if item_depth == 0 {
                        buffer.clear();
                    }
                }
                Event::End(Tag::Heading(level, ..)) => {
                    let heading = normalize_whitespace(&buffer);
                    buffer.clear();
                    if !heading.is_empty() {
                        collector.push_title(heading, level as u32 - 1);
                    }
                }
                Event::End(Tag::Paragraph) => {
                    if item_depth == 0 {
                        let paragraph = normalize_whitespace(&buffer);
                        buffer.clear();
                        if !paragraph.is_empty() {
                            collector.push(classify_text(&paragraph), paragraph);
                        }
                    } else {
                        buffer.push(' ');
                    }
                }
                Event::Start(Tag::Item) => {
                    if item_depth > 0 {
                        Self::flush_item(&mut buffer, collector);
                    }
                    item_depth += 1;
                    buffer.clear();
                }
                Event::End(Tag::Item) => {
                    Self::flush_item(&mut buffer, collector);
                    item_depth = item_depth.saturating_sub(1);
                }
                Event::Start(Tag::CodeBlock(_)) => {
                    in_code = true;
                    buffer.clear();
                }
                Event::End(Tag::CodeBlock(_)) => {
                    in_code = false;
                    let code = buffer.trim_end().to_string();
                    buffer.clear();
                    if !code.is_empty() {
                        collector.push(ElementCategory::CodeSnippet, code);
                    }
                }
                Event::Start(Tag::Table(_)) => table = Some(TableState::default()),
                Event::Start(Tag::TableHead) => {
                    if let Some(state) = table.as_mut() {
                        state.in_head = true;
                        state.rows.push(Vec::new());
                    }
                }
                Event::End(Tag::TableHead) => {
                    if let Some(state) = table.as_mut() {
                        state.in_head = false;
                        state.header_rows = state.rows.len();
                    }
                }
                Event::Start(Tag::TableRow) => {
                    if let Some(state) = table.as_mut() {
                        state.rows.push(Vec::new());
                    }
                }
                Event::Start(Tag::TableCell) => buffer.clear(),
                Event::End(Tag::TableCell) => {
                    if let Some(row) = table.as_mut().and_then(|state| state.rows.last_mut()) {
                        row.push(normalize_whitespace(&buffer));
                    }
                    buffer.clear();
                }
                Event::End(Tag::Table(_)) => {
                    if let Some(state) = table.take() {
                        let text = state.text();
                        if !text.is_empty() {
                            let html = state.html();
                            collector.push_with(ElementCategory::Table, text, |metadata| {
                                metadata.with_text_as_html(html)
                            });
                        }
                    }
                }
                Event::Text(t) | Event::Code(t) => buffer.push_str(&t),
                Event::SoftBreak | Event::HardBreak => {
                    buffer.push(if in_code { '\n' } else { ' ' });
                }
                _ => {}
            }
        }

        Ok(())
    }
}
