//! Text cleaning functions
//!
//! Every function here is pure and maps one text to one text. The
//! translation step lives in the registry because it needs a service.

use encoding_rs::Encoding;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::domain::{AffixParams, DomainError};
use crate::infrastructure::partitioners::{is_bulleted, BULLETS};

static EXTRA_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").unwrap());
static DASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-\u{2013}]").unwrap());
static PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{P}").unwrap());
static LINE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\n\s*").unwrap());
static DOUBLE_LINE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:\s*\n\s*){2}").unwrap());
static E_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^e(?:\s|$)").unwrap());

const SHORT_LINE_WORDS: usize = 5;

/// Mojibake sequences left by UTF-8 text decoded as Windows-1252, and the
/// C1 control characters some exporters use for curly quotes
const QUOTE_REPAIRS: &[(&str, &str)] = &[
    ("\u{91}", "\u{2018}"),
    ("\u{92}", "\u{2019}"),
    ("\u{93}", "\u{201C}"),
    ("\u{94}", "\u{201D}"),
    ("&apos;", "'"),
    ("\u{e2}\u{80}\u{99}", "'"),
    ("\u{e2}\u{80}\u{201C}", "\u{2014}"),
    ("\u{e2}\u{80}\u{201D}", "\u{2013}"),
    ("\u{e2}\u{80}\u{2DC}", "\u{2018}"),
    ("\u{e2}\u{80}\u{A6}", "\u{2026}"),
    ("\u{e2}\u{80}\u{2122}", "\u{2019}"),
    ("\u{e2}\u{80}\u{153}", "\u{201C}"),
    ("\u{e2}\u{80}?", "\u{201D}"),
    ("\u{e2}\u{80}\u{165}", "\u{201D}"),
    ("\u{e2}\u{80}\u{15B}", "\u{201C}"),
    ("\u{e2}\u{80}\u{A8}", "\u{2014}"),
    ("\u{e2}\u{80}\u{142}", "\u{2033}"),
    ("\u{e2}\u{80}\u{17D}", ""),
    ("\u{e2}\u{80}\u{201A}", ""),
    ("\u{e2}\u{80}\u{2030}", ""),
    ("\u{e2}\u{80}\u{2039}", ""),
    ("\u{e2}\u{80}", ""),
];

/// Replace non-breaking spaces and newlines with spaces, collapse repeated
/// spaces and trim
pub fn clean_extra_whitespace(text: &str) -> String {
    let text = text.replace(['\u{a0}', '\n'], " ");
    EXTRA_SPACES.replace_all(&text, " ").trim().to_string()
}

/// Remove one leading bullet character
pub fn clean_bullets(text: &str) -> String {
    match text.chars().next() {
        Some(first) if BULLETS.contains(&first) => text[first.len_utf8()..].trim().to_string(),
        _ => text.to_string(),
    }
}

/// Remove a leading ordered bullet such as `1.1` or `a.b.`
pub fn clean_ordered_bullets(text: &str) -> String {
    let mut tokens = text.split_whitespace();
    let Some(first) = tokens.next() else {
        return text.to_string();
    };

    if !first.contains('.') || first.contains("..") {
        return text.to_string();
    }

    let mut parts: Vec<&str> = first.split('.').collect();
    if parts.last().is_some_and(|part| part.is_empty()) {
        parts.pop();
    }

    if parts.first().map_or(0, |part| part.chars().count()) > 2 {
        return text.to_string();
    }

    tokens.collect::<Vec<_>>().join(" ")
}

fn affix_regex(pattern: &str, ignore_case: bool) -> Result<Regex, DomainError> {
    RegexBuilder::new(pattern)
        .case_insensitive(ignore_case)
        .build()
        .map_err(|e| DomainError::validation(format!("Invalid pattern '{}': {}", pattern, e)))
}

/// Remove a prefix matching the pattern
pub fn clean_prefix(text: &str, params: &AffixParams) -> Result<String, DomainError> {
    let regex = affix_regex(&format!("^(?:{})", params.pattern), params.ignore_case)?;
    let cleaned = regex.replace(text, "");

    Ok(if params.strip {
        cleaned.trim_start().to_string()
    } else {
        cleaned.into_owned()
    })
}

/// Remove a postfix matching the pattern
pub fn clean_postfix(text: &str, params: &AffixParams) -> Result<String, DomainError> {
    let regex = affix_regex(&format!("(?:{})$", params.pattern), params.ignore_case)?;
    let cleaned = regex.replace(text, "");

    Ok(if params.strip {
        cleaned.trim_end().to_string()
    } else {
        cleaned.into_owned()
    })
}

/// Replace hyphens and en dashes with spaces
pub fn clean_dashes(text: &str) -> String {
    DASHES.replace_all(text, " ").trim().to_string()
}

/// Remove trailing `.,:;`
pub fn clean_trailing_punctuation(text: &str) -> String {
    text.trim().trim_end_matches(['.', ',', ':', ';']).to_string()
}

/// Drop every non-ASCII character
pub fn clean_non_ascii_chars(text: &str) -> String {
    text.chars().filter(char::is_ascii).collect()
}

fn group_bullet_paragraph(paragraph: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();

    for line in LINE_BREAK.split(paragraph.trim()) {
        if is_bulleted(line) || E_BULLET.is_match(line) {
            if !current.is_empty() {
                items.push(std::mem::take(&mut current));
            }
            current.push_str(line.trim());
        } else if !line.trim().is_empty() {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(line.trim());
        }
    }

    if !current.is_empty() {
        items.push(current);
    }

    items
}

/// Merge lines of a paragraph that were broken by hard wraps.
///
/// Paragraphs are separated by blank lines. Bulleted paragraphs are grouped
/// per bullet; paragraphs made only of short lines keep their lines.
pub fn group_broken_paragraphs(text: &str) -> String {
    let mut paragraphs = Vec::new();

    for paragraph in DOUBLE_LINE_BREAK.split(text) {
        if paragraph.trim().is_empty() {
            continue;
        }

        let lines: Vec<&str> = LINE_BREAK.split(paragraph).collect();
        let all_lines_short = lines
            .iter()
            .all(|line| line.trim().split(' ').count() < SHORT_LINE_WORDS);
        let trimmed = paragraph.trim();

        if is_bulleted(trimmed) || E_BULLET.is_match(trimmed) {
            paragraphs.extend(group_bullet_paragraph(paragraph));
        } else if all_lines_short {
            paragraphs.extend(
                lines
                    .into_iter()
                    .filter(|line| !line.trim().is_empty())
                    .map(str::to_string),
            );
        } else {
            paragraphs.push(LINE_BREAK.replace_all(paragraph, " ").into_owned());
        }
    }

    paragraphs.join("\n\n")
}

/// Remove every Unicode punctuation character
pub fn remove_punctuation(text: &str) -> String {
    PUNCTUATION.replace_all(text, "").into_owned()
}

/// Repair quote mojibake and normalize curly quotes to ASCII quotes
pub fn replace_unicode_quotes(text: &str) -> String {
    let mut text = text.to_string();

    for (from, to) in QUOTE_REPAIRS {
        if text.contains(from) {
            text = text.replace(from, to);
        }
    }

    text.replace(['\u{2018}', '\u{2019}', '\u{201A}', '\u{2032}'], "'")
        .replace(['\u{201C}', '\u{201D}', '\u{201E}', '\u{2033}'], "\"")
}

/// Reinterpret a string whose characters are raw bytes (as produced by a
/// Latin-1 style misdecode) using the given encoding
pub fn bytes_string_to_string(text: &str, encoding: &str) -> Result<String, DomainError> {
    let bytes = text
        .chars()
        .map(|c| {
            u8::try_from(u32::from(c)).map_err(|_| {
                DomainError::validation(format!(
                    "Character '{}' is not a byte value; text is not a byte string",
                    c
                ))
            })
        })
        .collect::<Result<Vec<u8>, _>>()?;

    let encoding = Encoding::for_label(encoding.trim().as_bytes())
        .ok_or_else(|| DomainError::validation(format!("Unknown encoding '{}'", encoding)))?;

    encoding
        .decode_without_bom_handling_and_without_replacement(&bytes)
        .map(|decoded| decoded.into_owned())
        .ok_or_else(|| {
            DomainError::validation(format!("Bytes are not valid {}", encoding.name()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_extra_whitespace() {
        assert_eq!(
            clean_extra_whitespace("ITEM 1.     BUSINESS\u{a0}\u{a0}\nOVERVIEW "),
            "ITEM 1. BUSINESS OVERVIEW"
        );
        assert_eq!(clean_extra_whitespace("Hello   World!!"), "Hello World!!");
    }

    #[test]
    fn test_clean_bullets() {
        assert_eq!(clean_bullets("\u{2022} An excellent point!"), "An excellent point!");
        assert_eq!(clean_bullets("- dash item"), "dash item");
        assert_eq!(clean_bullets("No bullet \u{2022} here"), "No bullet \u{2022} here");
    }

    #[test]
    fn test_clean_ordered_bullets() {
        assert_eq!(
            clean_ordered_bullets("1.1 This is a very important point"),
            "This is a very important point"
        );
        assert_eq!(
            clean_ordered_bullets("a.b This is a very important point"),
            "This is a very important point"
        );
        assert_eq!(clean_ordered_bullets("1. Numbered"), "Numbered");
        assert_eq!(clean_ordered_bullets("1..1 Not a bullet"), "1..1 Not a bullet");
        assert_eq!(clean_ordered_bullets("Version.2 stays"), "Version.2 stays");
        assert_eq!(clean_ordered_bullets(""), "");
    }

    #[test]
    fn test_clean_prefix_and_postfix() {
        let params = AffixParams::new(r"(SUMMARY|DESCRIPTION):");
        assert_eq!(
            clean_prefix("SUMMARY: This is the best summary of all time!", &params).unwrap(),
            "This is the best summary of all time!"
        );

        let params = AffixParams {
            pattern: "end of report".to_string(),
            ignore_case: true,
            strip: true,
        };
        assert_eq!(
            clean_postfix("The quarterly numbers look good. END OF REPORT", &params).unwrap(),
            "The quarterly numbers look good."
        );

        let invalid = AffixParams::new("(unclosed");
        assert!(clean_prefix("x", &invalid).is_err());
    }

    #[test]
    fn test_clean_prefix_only_at_start() {
        let params = AffixParams::new("Note:");
        assert_eq!(clean_prefix("See Note: below", &params).unwrap(), "See Note: below");
    }

    #[test]
    fn test_clean_dashes_and_trailing_punctuation() {
        assert_eq!(clean_dashes("ITEM 1A: RISK-FACTORS \u{2013}"), "ITEM 1A: RISK FACTORS");
        assert_eq!(clean_trailing_punctuation("  Hello world.,;:  "), "Hello world");
    }

    #[test]
    fn test_clean_non_ascii_chars() {
        assert_eq!(
            clean_non_ascii_chars("\u{2022}This text contains non-ascii characters!\u{2022}"),
            "This text contains non-ascii characters!"
        );
    }

    #[test]
    fn test_group_broken_paragraphs() {
        let text = "The big red fox\nis walking down the lane.\n\n\
                    At the end of the lane\nthe fox met a bear.";
        assert_eq!(
            group_broken_paragraphs(text),
            "The big red fox is walking down the lane.\n\n\
             At the end of the lane the fox met a bear."
        );
    }

    #[test]
    fn test_group_broken_paragraphs_keeps_short_lines() {
        let text = "Apache License\nVersion 2.0\n\nhttp://www.apache.org/licenses/";
        assert_eq!(
            group_broken_paragraphs(text),
            "Apache License\n\nVersion 2.0\n\nhttp://www.apache.org/licenses/"
        );
    }

    #[test]
    fn test_group_broken_paragraphs_bullets() {
        let text = "\u{2022} The big red fox\nis walking down the lane.\n\
                    \u{2022} At the end of the lane\nthe fox met a bear.";
        assert_eq!(
            group_broken_paragraphs(text),
            "\u{2022} The big red fox is walking down the lane.\n\n\
             \u{2022} At the end of the lane the fox met a bear."
        );
    }

    #[test]
    fn test_remove_punctuation() {
        assert_eq!(remove_punctuation("\u{201C}A lovely quote!\u{201D}"), "A lovely quote");
    }

    #[test]
    fn test_replace_unicode_quotes() {
        assert_eq!(
            replace_unicode_quotes("\u{93}A lovely quote!\u{94}"),
            "\"A lovely quote!\""
        );
        assert_eq!(replace_unicode_quotes("It\u{e2}\u{80}\u{99}s"), "It's");
        assert_eq!(replace_unicode_quotes("&apos;single&apos;"), "'single'");
    }

    #[test]
    fn test_bytes_string_to_string() {
        let text = "Hello \u{f0}\u{9f}\u{98}\u{80}";
        assert_eq!(bytes_string_to_string(text, "utf-8").unwrap(), "Hello \u{1F600}");

        assert!(bytes_string_to_string("\u{1F600}", "utf-8").is_err());
        assert!(bytes_string_to_string("abc", "not-an-encoding").is_err());
        assert!(bytes_string_to_string("\u{ff}", "utf-8").is_err());
    }
}
