//! Staging operations and their outputs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

use super::{ensure_known, no_params, parse_params, TransformationSpec};
use crate::domain::element::Element;
use crate::domain::error::OperationKind;
use crate::domain::DomainError;

/// Entity annotation for a Datasaur export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasaurEntity {
    pub text: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub start_idx: usize,
    pub end_idx: usize,
}

/// Attachment for a Label Box import row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabelBoxAttachment {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

/// Parameters for a Label Box export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabelBoxParams {
    /// Directory the element text files are written to
    pub output_directory: PathBuf,
    /// URL prefix under which the directory is served
    pub url_prefix: String,
    #[serde(default)]
    pub external_ids: Option<Vec<String>>,
    #[serde(default)]
    pub attachments: Option<Vec<Vec<LabelBoxAttachment>>>,
    #[serde(default)]
    pub create_directory: bool,
}

/// Parameters for a Label Studio export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabelStudioParams {
    #[serde(default = "default_text_field")]
    pub text_field: String,
    #[serde(default = "default_id_field")]
    pub id_field: String,
    #[serde(default)]
    pub annotations: Option<Vec<Vec<Value>>>,
    #[serde(default)]
    pub predictions: Option<Vec<Vec<Value>>>,
}

impl Default for LabelStudioParams {
    fn default() -> Self {
        Self {
            text_field: default_text_field(),
            id_field: default_id_field(),
            annotations: None,
            predictions: None,
        }
    }
}

fn default_text_field() -> String {
    "text".to_string()
}

fn default_id_field() -> String {
    "ref_id".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MetadataParams {
    #[serde(default)]
    metadata: Vec<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EntitiesParams {
    #[serde(default)]
    entities: Vec<Vec<DatasaurEntity>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecordsParams {
    #[serde(default)]
    records: Vec<Value>,
}

/// An export-format conversion of an element sequence
#[derive(Debug, Clone, PartialEq)]
pub enum StagingOp {
    ConvertToCsv,
    ConvertToDataframe,
    ConvertToDict,
    /// Rebuild elements from serialized records; the target sequence is not read
    DictToElements {
        records: Vec<Value>,
    },
    /// Per-element metadata; an empty list means "no metadata"
    CsvForProdigy {
        metadata: Vec<Map<String, Value>>,
    },
    ForProdigy {
        metadata: Vec<Map<String, Value>>,
    },
    ForBaseplate,
    /// Per-element entity lists; an empty list means "no entities"
    ForDatasaur {
        entities: Vec<Vec<DatasaurEntity>>,
    },
    ForLabelBox(LabelBoxParams),
    ForLabelStudio(LabelStudioParams),
    ForWeaviate,
}

impl StagingOp {
    /// Every recognized staging kind
    pub const NAMES: [&'static str; 11] = [
        "convert_to_csv",
        "convert_to_dataframe",
        "convert_to_dict",
        "dict_to_elements",
        "stage_csv_for_prodigy",
        "stage_for_prodigy",
        "stage_for_baseplate",
        "stage_for_datasaur",
        "stage_for_label_box",
        "stage_for_label_studio",
        "stage_for_weaviate",
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::ConvertToCsv => "convert_to_csv",
            Self::ConvertToDataframe => "convert_to_dataframe",
            Self::ConvertToDict => "convert_to_dict",
            Self::DictToElements { .. } => "dict_to_elements",
            Self::CsvForProdigy { .. } => "stage_csv_for_prodigy",
            Self::ForProdigy { .. } => "stage_for_prodigy",
            Self::ForBaseplate => "stage_for_baseplate",
            Self::ForDatasaur { .. } => "stage_for_datasaur",
            Self::ForLabelBox(_) => "stage_for_label_box",
            Self::ForLabelStudio(_) => "stage_for_label_studio",
            Self::ForWeaviate => "stage_for_weaviate",
        }
    }

    /// Build an operation from a named step
    pub fn from_spec(spec: &TransformationSpec) -> Result<Self, DomainError> {
        let name = spec.name.as_str();
        let params = &spec.params;
        ensure_known(OperationKind::Staging, &Self::NAMES, name)?;

        let op = match name {
            "dict_to_elements" => {
                let p: RecordsParams = parse_params(name, params)?;
                Self::DictToElements { records: p.records }
            }
            "stage_csv_for_prodigy" => {
                let p: MetadataParams = parse_params(name, params)?;
                Self::CsvForProdigy {
                    metadata: p.metadata,
                }
            }
            "stage_for_prodigy" => {
                let p: MetadataParams = parse_params(name, params)?;
                Self::ForProdigy {
                    metadata: p.metadata,
                }
            }
            "stage_for_datasaur" => {
                let p: EntitiesParams = parse_params(name, params)?;
                Self::ForDatasaur {
                    entities: p.entities,
                }
            }
            "stage_for_label_box" => Self::ForLabelBox(parse_params(name, params)?),
            "stage_for_label_studio" => Self::ForLabelStudio(parse_params(name, params)?),
            _ => {
                no_params(name, params)?;
                match name {
                    "convert_to_csv" => Self::ConvertToCsv,
                    "convert_to_dataframe" => Self::ConvertToDataframe,
                    "convert_to_dict" => Self::ConvertToDict,
                    "stage_for_baseplate" => Self::ForBaseplate,
                    "stage_for_weaviate" => Self::ForWeaviate,
                    other => return Err(DomainError::unsupported(OperationKind::Staging, other)),
                }
            }
        };

        Ok(op)
    }
}

/// In-memory table of elements, one row per element
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ElementTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ElementTable {
    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All values of a column, if present
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }
}

/// Result of a staging operation
#[derive(Debug, Clone, PartialEq)]
pub enum StagedOutput {
    /// UTF-8 CSV text
    Csv(String),
    /// Tabular in-memory structure
    Table(ElementTable),
    /// Sequence of string-keyed mappings
    Records(Vec<Map<String, Value>>),
    /// A single JSON document
    Document(Value),
    /// Rebuilt elements
    Elements(Vec<Element>),
}

impl StagedOutput {
    pub fn as_csv(&self) -> Option<&str> {
        match self {
            Self::Csv(csv) => Some(csv),
            _ => None,
        }
    }

    pub fn as_records(&self) -> Option<&[Map<String, Value>]> {
        match self {
            Self::Records(records) => Some(records),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&ElementTable> {
        match self {
            Self::Table(table) => Some(table),
            _ => None,
        }
    }
}
