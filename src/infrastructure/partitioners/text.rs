//! Plain text partitioner

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use super::{ElementCollector, FormatPartitioner};
use crate::domain::{DomainError, ElementCategory, FileType};

/// Leading bullet characters recognized on list items
pub(crate) const BULLETS: &[char] = &[
    '\u{2022}', '\u{2023}', '\u{2043}', '\u{204C}', '\u{204D}', '\u{2219}', '\u{25CB}', '\u{25CF}',
    '\u{25D8}', '\u{25E6}', '\u{2619}', '\u{2765}', '\u{2767}', '\u{29BE}', '\u{29BF}', '\u{00B7}',
    '\u{25AA}', '\u{25A0}', '\u{25A1}', '*', '-', '\u{F0B7}',
];

static PARAGRAPH_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t\r]*\n").unwrap());
static EMAIL_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9.\-+_]+@[A-Za-z0-9.\-+_]+\.[A-Za-z]+$").unwrap());
static NUMERIC_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\d\s.,\-()/%$]+$").unwrap());

const TITLE_MAX_WORDS: usize = 12;
const NARRATIVE_MIN_WORDS: usize = 3;
const MAX_CAPS_RATIO: f64 = 0.5;

/// Check if a line starts with a bullet followed by whitespace
pub(crate) fn is_bulleted(line: &str) -> bool {
    let mut chars = line.trim_start().chars();
    match (chars.next(), chars.next()) {
        (Some(bullet), Some(next)) => BULLETS.contains(&bullet) && next.is_whitespace(),
        (Some(bullet), None) => BULLETS.contains(&bullet) && !matches!(bullet, '*' | '-'),
        _ => false,
    }
}

/// Remove a single leading bullet and surrounding whitespace
pub(crate) fn strip_bullet(line: &str) -> &str {
    let trimmed = line.trim_start();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(bullet) if BULLETS.contains(&bullet) => chars.as_str().trim(),
        _ => trimmed.trim_end(),
    }
}

fn caps_ratio(words: &[&str]) -> f64 {
    if words.is_empty() {
        return 0.0;
    }

    let caps = words
        .iter()
        .filter(|word| {
            word.chars().all(|c| !c.is_lowercase()) && word.chars().any(char::is_uppercase)
        })
        .count();

    caps as f64 / words.len() as f64
}

fn is_possible_title(text: &str, words: &[&str]) -> bool {
    if words.is_empty() || words.len() > TITLE_MAX_WORDS {
        return false;
    }

    if text.ends_with(['.', ',', ';', '!', '?']) {
        return false;
    }

    if NUMERIC_ONLY.is_match(text) {
        return false;
    }

    let first_alpha = text.chars().find(|c| c.is_alphabetic());
    first_alpha.is_some_and(char::is_uppercase)
}

fn is_possible_narrative(text: &str, words: &[&str]) -> bool {
    if words.len() < NARRATIVE_MIN_WORDS {
        return false;
    }

    if caps_ratio(words) > MAX_CAPS_RATIO {
        return false;
    }

    text.chars().any(char::is_alphabetic)
}

/// Classify a block of running text by simple layout heuristics
pub(crate) fn classify_text(text: &str) -> ElementCategory {
    let text = text.trim();
    let words: Vec<&str> = text.unicode_words().collect();

    if EMAIL_ONLY.is_match(text) {
        ElementCategory::EmailAddress
    } else if is_possible_title(text, &words) {
        ElementCategory::Title
    } else if is_possible_narrative(text, &words) {
        ElementCategory::NarrativeText
    } else {
        ElementCategory::UncategorizedText
    }
}

/// Collapse all whitespace runs (including newlines) to single spaces
pub(crate) fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Partitioner for plain text.
///
/// Paragraphs are separated by blank lines; form feeds start a new page.
#[derive(Debug, Clone, Default)]
pub struct TextPartitioner;

impl TextPartitioner {
    pub fn new() -> Self {
        Self
    }

    fn partition_paragraph(paragraph: &str, collector: &mut ElementCollector) {
        let lines: Vec<&str> = paragraph
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        if lines.is_empty() {
            return;
        }

        if lines.iter().any(|line| is_bulleted(line)) {
            let mut item = String::new();

            for line in lines {
                if is_bulleted(line) {
                    if !item.is_empty() {
                        collector.push(ElementCategory::ListItem, std::mem::take(&mut item));
                    }
                    item.push_str(strip_bullet(line));
                } else {
                    if !item.is_empty() {
                        item.push(' ');
                    }
                    item.push_str(line);
                }
            }

            if !item.is_empty() {
                collector.push(ElementCategory::ListItem, item);
            }
            return;
        }

        let text = lines.join(" ");
        collector.push(classify_text(&text), text);
    }
}

impl FormatPartitioner for TextPartitioner {
    fn file_type(&self) -> FileType {
        FileType::PlainText
    }

    fn partition_text(
        &self,
        text: &str,
        collector: &mut ElementCollector,
    ) -> Result<(), DomainError> {
        let text = text.replace("\r\n", "\n");
        let pages: Vec<&str> = text.split('\x0c').collect();

        if pages.len() > 1 {
            collector.start_paging();
        }

        for (idx, page) in pages.iter().enumerate() {
            if idx > 0 {
                collector.page_break();
            }

            for paragraph in PARAGRAPH_SPLIT.split(page) {
                Self::partition_paragraph(paragraph, collector);
            }
        }

        Ok(())
    }
}
