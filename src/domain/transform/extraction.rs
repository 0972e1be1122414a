//! Extraction operations

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::{ensure_known, no_params, parse_params, TransformationSpec};
use crate::domain::error::OperationKind;
use crate::domain::DomainError;

/// Parameters for text-after / text-before extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnchorParams {
    /// Regular expression locating the anchor
    pub pattern: String,
    /// Which anchor match to use (0 = first)
    #[serde(default)]
    pub index: usize,
    #[serde(default = "default_true")]
    pub strip: bool,
}

impl AnchorParams {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            index: 0,
            strip: true,
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }
}

fn default_true() -> bool {
    true
}

/// A value-extraction operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOp {
    DatetimeTz,
    EmailAddress,
    IpAddress,
    IpAddressName,
    MapiId,
    OrderedBullets,
    TextAfter(AnchorParams),
    TextBefore(AnchorParams),
    UsPhoneNumber,
}

impl ExtractionOp {
    /// Every recognized extraction kind
    pub const NAMES: [&'static str; 9] = [
        "extract_datetimetz",
        "extract_email_address",
        "extract_ip_address",
        "extract_ip_address_name",
        "extract_mapi_id",
        "extract_ordered_bullets",
        "extract_text_after",
        "extract_text_before",
        "extract_us_phone_number",
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::DatetimeTz => "extract_datetimetz",
            Self::EmailAddress => "extract_email_address",
            Self::IpAddress => "extract_ip_address",
            Self::IpAddressName => "extract_ip_address_name",
            Self::MapiId => "extract_mapi_id",
            Self::OrderedBullets => "extract_ordered_bullets",
            Self::TextAfter(_) => "extract_text_after",
            Self::TextBefore(_) => "extract_text_before",
            Self::UsPhoneNumber => "extract_us_phone_number",
        }
    }

    /// Build an operation from a named step
    pub fn from_spec(spec: &TransformationSpec) -> Result<Self, DomainError> {
        let name = spec.name.as_str();
        let params = &spec.params;
        ensure_known(OperationKind::Extraction, &Self::NAMES, name)?;

        let op = match name {
            "extract_text_after" => Self::TextAfter(parse_params(name, params)?),
            "extract_text_before" => Self::TextBefore(parse_params(name, params)?),
            _ => {
                no_params(name, params)?;
                match name {
                    "extract_datetimetz" => Self::DatetimeTz,
                    "extract_email_address" => Self::EmailAddress,
                    "extract_ip_address" => Self::IpAddress,
                    "extract_ip_address_name" => Self::IpAddressName,
                    "extract_mapi_id" => Self::MapiId,
                    "extract_ordered_bullets" => Self::OrderedBullets,
                    "extract_us_phone_number" => Self::UsPhoneNumber,
                    other => {
                        return Err(DomainError::unsupported(OperationKind::Extraction, other))
                    }
                }
            }
        };

        Ok(op)
    }
}

/// Section markers of an ordered bullet such as `2.1.a`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderedBullets {
    pub section: Option<String>,
    pub sub_section: Option<String>,
    pub sub_sub_section: Option<String>,
}

/// Result of an extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ExtractedValue {
    /// Timestamp with offset, if one was found
    DateTime(Option<DateTime<FixedOffset>>),
    /// All matches, in order of appearance
    List(Vec<String>),
    /// A single piece of text (empty when nothing matched)
    Text(String),
    /// Ordered bullet markers
    OrderedBullets(OrderedBullets),
}

impl ExtractedValue {
    /// Text payload, if this is a text result
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// List payload, if this is a list result
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_every_name_parses() {
        for name in ExtractionOp::NAMES {
            let spec = if name.starts_with("extract_text_") {
                TransformationSpec::new(name).with_param("pattern", json!("SPEAKER \\d:"))
            } else {
                TransformationSpec::new(name)
            };

            assert_eq!(ExtractionOp::from_spec(&spec).unwrap().name(), name);
        }
    }

    #[test]
    fn test_unknown_kind() {
        let err =
            ExtractionOp::from_spec(&TransformationSpec::new("extract_zip_code")).unwrap_err();
        assert!(err.is_unsupported_operation());
    }

    #[test]
    fn test_anchor_params_defaults() {
        let spec = TransformationSpec::new("extract_text_after")
            .with_param("pattern", json!("To:"))
            .with_param("index", json!(1));

        let op = ExtractionOp::from_spec(&spec).unwrap();

        assert_eq!(op, ExtractionOp::TextAfter(AnchorParams::new("To:").with_index(1)));
    }

    #[test]
    fn test_extracted_value_serializes_untagged() {
        let value = ExtractedValue::List(vec!["a@b.com".to_string()]);
        assert_eq!(serde_json::to_value(&value).unwrap(), json!(["a@b.com"]));

        let none = ExtractedValue::DateTime(None);
        assert_eq!(serde_json::to_value(&none).unwrap(), json!(null));
    }
}
