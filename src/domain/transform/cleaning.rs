//! Cleaning operations

use serde::{Deserialize, Serialize};

use super::{ensure_known, no_params, parse_params, TransformationSpec};
use crate::domain::error::OperationKind;
use crate::domain::DomainError;

/// Parameters for prefix/postfix stripping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AffixParams {
    /// Regular expression anchored at the start (prefix) or end (postfix)
    pub pattern: String,
    #[serde(default)]
    pub ignore_case: bool,
    #[serde(default = "default_true")]
    pub strip: bool,
}

impl AffixParams {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ignore_case: false,
            strip: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BytesStringParams {
    #[serde(default = "default_encoding")]
    encoding: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TranslateParams {
    #[serde(default)]
    source_lang: Option<String>,
    #[serde(default = "default_target_lang")]
    target_lang: String,
}

fn default_true() -> bool {
    true
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

fn default_target_lang() -> String {
    "en".to_string()
}

/// A text cleaning operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleaningOp {
    CleanExtraWhitespace,
    CleanBullets,
    CleanOrderedBullets,
    CleanPostfix(AffixParams),
    CleanPrefix(AffixParams),
    CleanDashes,
    CleanTrailingPunctuation,
    CleanNonAsciiChars,
    GroupBrokenParagraphs,
    RemovePunctuation,
    ReplaceUnicodeQuotes,
    BytesStringToString {
        encoding: String,
    },
    TranslateText {
        source_lang: Option<String>,
        target_lang: String,
    },
}

impl CleaningOp {
    /// Every recognized operation name
    pub const NAMES: [&'static str; 13] = [
        "clean_extra_whitespace",
        "clean_bullets",
        "clean_ordered_bullets",
        "clean_postfix",
        "clean_prefix",
        "clean_dashes",
        "clean_trailing_punctuation",
        "clean_non_ascii_chars",
        "group_broken_paragraphs",
        "remove_punctuation",
        "replace_unicode_quotes",
        "bytes_string_to_string",
        "translate_text",
    ];

    /// Operation name
    pub fn name(&self) -> &'static str {
        match self {
            Self::CleanExtraWhitespace => "clean_extra_whitespace",
            Self::CleanBullets => "clean_bullets",
            Self::CleanOrderedBullets => "clean_ordered_bullets",
            Self::CleanPostfix(_) => "clean_postfix",
            Self::CleanPrefix(_) => "clean_prefix",
            Self::CleanDashes => "clean_dashes",
            Self::CleanTrailingPunctuation => "clean_trailing_punctuation",
            Self::CleanNonAsciiChars => "clean_non_ascii_chars",
            Self::GroupBrokenParagraphs => "group_broken_paragraphs",
            Self::RemovePunctuation => "remove_punctuation",
            Self::ReplaceUnicodeQuotes => "replace_unicode_quotes",
            Self::BytesStringToString { .. } => "bytes_string_to_string",
            Self::TranslateText { .. } => "translate_text",
        }
    }

    /// Build an operation from a named step
    pub fn from_spec(spec: &TransformationSpec) -> Result<Self, DomainError> {
        let name = spec.name.as_str();
        let params = &spec.params;
        ensure_known(OperationKind::Cleaning, &Self::NAMES, name)?;

        let op = match name {
            "clean_postfix" => Self::CleanPostfix(parse_params(name, params)?),
            "clean_prefix" => Self::CleanPrefix(parse_params(name, params)?),
            "bytes_string_to_string" => {
                let p: BytesStringParams = parse_params(name, params)?;
                Self::BytesStringToString {
                    encoding: p.encoding,
                }
            }
            "translate_text" => {
                let p: TranslateParams = parse_params(name, params)?;
                Self::TranslateText {
                    source_lang: p.source_lang,
                    target_lang: p.target_lang,
                }
            }
            _ => {
                no_params(name, params)?;
                match name {
                    "clean_extra_whitespace" => Self::CleanExtraWhitespace,
                    "clean_bullets" => Self::CleanBullets,
                    "clean_ordered_bullets" => Self::CleanOrderedBullets,
                    "clean_dashes" => Self::CleanDashes,
                    "clean_trailing_punctuation" => Self::CleanTrailingPunctuation,
                    "clean_non_ascii_chars" => Self::CleanNonAsciiChars,
                    "group_broken_paragraphs" => Self::GroupBrokenParagraphs,
                    "remove_punctuation" => Self::RemovePunctuation,
                    "replace_unicode_quotes" => Self::ReplaceUnicodeQuotes,
                    other => return Err(DomainError::unsupported(OperationKind::Cleaning, other)),
                }
            }
        };

        Ok(op)
    }

    /// Whether the operation needs a translation service
    pub fn requires_translator(&self) -> bool {
        matches!(self, Self::TranslateText { .. })
    }
}

/// Ordered list of cleaning operations applied left to right
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleaningPipeline {
    steps: Vec<CleaningOp>,
}

impl CleaningPipeline {
    /// Create a pipeline from explicit steps
    pub fn new(steps: Vec<CleaningOp>) -> Self {
        Self { steps }
    }

    /// Build a pipeline from named steps, validating all of them up front
    pub fn from_specs(specs: &[TransformationSpec]) -> Result<Self, DomainError> {
        let steps = specs
            .iter()
            .map(CleaningOp::from_spec)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { steps })
    }

    /// Steps in application order
    pub fn steps(&self) -> &[CleaningOp] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Default for CleaningPipeline {
    /// Quote normalization, non-ASCII stripping, paragraph merging, then
    /// whitespace collapsing last so it cleans up after the earlier steps
    fn default() -> Self {
        Self::new(vec![
            CleaningOp::ReplaceUnicodeQuotes,
            CleaningOp::CleanNonAsciiChars,
            CleaningOp::GroupBrokenParagraphs,
            CleaningOp::CleanExtraWhitespace,
        ])
    }
}
