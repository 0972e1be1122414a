//! Transformation operation types
//!
//! Each registry (cleaning, extraction, staging, chunking) is a closed
//! enumeration of operations. Internal callers build the enum directly;
//! configuration-driven callers go through [`TransformationSpec`], which is
//! validated eagerly: unknown names fail with
//! [`DomainError::UnsupportedOperation`], bad parameters with
//! [`DomainError::Validation`], both before any work is attempted.

pub mod chunking;
pub mod cleaning;
pub mod extraction;
pub mod staging;

pub use chunking::{ChunkingOp, TitleChunkingParams};
pub use cleaning::{AffixParams, CleaningOp, CleaningPipeline};
pub use extraction::{AnchorParams, ExtractedValue, ExtractionOp, OrderedBullets};
pub use staging::{
    DatasaurEntity, ElementTable, LabelBoxAttachment, LabelBoxParams, LabelStudioParams,
    StagedOutput, StagingOp,
};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::OperationKind;
use super::DomainError;

/// One named step with its parameters, as supplied by configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationSpec {
    pub name: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl TransformationSpec {
    /// Create a step without parameters
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Map::new(),
        }
    }

    /// Add a parameter
    pub fn with_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }
}

impl<S: Into<String>> From<(S, Map<String, Value>)> for TransformationSpec {
    fn from((name, params): (S, Map<String, Value>)) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }
}

/// Fail with `UnsupportedOperation` unless `name` is one of `known`
pub(crate) fn ensure_known(
    kind: OperationKind,
    known: &[&str],
    name: &str,
) -> Result<(), DomainError> {
    if known.contains(&name) {
        Ok(())
    } else {
        Err(DomainError::unsupported(kind, name))
    }
}

/// Deserialize the parameters of a recognized operation
pub(crate) fn parse_params<T: DeserializeOwned>(
    name: &str,
    params: &Map<String, Value>,
) -> Result<T, DomainError> {
    serde_json::from_value(Value::Object(params.clone())).map_err(|e| {
        DomainError::validation(format!("Invalid parameters for '{}': {}", name, e))
    })
}

/// Reject parameters passed to an operation that takes none
pub(crate) fn no_params(name: &str, params: &Map<String, Value>) -> Result<(), DomainError> {
    match params.keys().next() {
        None => Ok(()),
        Some(key) => Err(DomainError::validation(format!(
            "'{}' does not accept parameter '{}'",
            name, key
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_from_tuple() {
        let mut params = Map::new();
        params.insert("pattern".to_string(), Value::String("SUMMARY:".to_string()));

        let spec = TransformationSpec::from(("clean_prefix", params));

        assert_eq!(spec.name, "clean_prefix");
        assert_eq!(spec.params["pattern"], "SUMMARY:");
    }

    #[test]
    fn test_spec_deserializes_without_params() {
        let spec: TransformationSpec =
            serde_json::from_str(r#"{"name": "clean_dashes"}"#).unwrap();

        assert_eq!(spec.name, "clean_dashes");
        assert!(spec.params.is_empty());
    }

    #[test]
    fn test_ensure_known() {
        let known = ["a", "b"];
        assert!(ensure_known(OperationKind::Cleaning, &known, "a").is_ok());

        let err = ensure_known(OperationKind::Cleaning, &known, "c").unwrap_err();
        assert!(err.is_unsupported_operation());
    }

    #[test]
    fn test_no_params_rejects_extras() {
        let mut params = Map::new();
        assert!(no_params("clean_dashes", &params).is_ok());

        params.insert("foo".to_string(), Value::Bool(true));
        let err = no_params("clean_dashes", &params).unwrap_err();
        assert!(err.to_string().contains("foo"));
    }
}
