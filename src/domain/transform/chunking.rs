//! Chunking operations

use serde::{Deserialize, Serialize};

use super::{ensure_known, parse_params, TransformationSpec};
use crate::domain::error::OperationKind;
use crate::domain::DomainError;

/// Configuration for title-based chunking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TitleChunkingParams {
    /// Hard upper bound on chunk text length, in characters
    #[serde(default = "default_max_characters")]
    pub max_characters: usize,
    /// Soft bound: start a new chunk once a section reaches this size
    #[serde(default)]
    pub new_after_n_chars: Option<usize>,
    /// Combine consecutive sections while the result stays under this size
    #[serde(default)]
    pub combine_text_under_n_chars: Option<usize>,
    /// Allow sections to span page boundaries
    #[serde(default = "default_true")]
    pub multipage_sections: bool,
}

fn default_max_characters() -> usize {
    500
}

fn default_true() -> bool {
    true
}

impl Default for TitleChunkingParams {
    fn default() -> Self {
        Self {
            max_characters: default_max_characters(),
            new_after_n_chars: None,
            combine_text_under_n_chars: None,
            multipage_sections: true,
        }
    }
}

impl TitleChunkingParams {
    /// Set the hard maximum
    pub fn with_max_characters(mut self, max: usize) -> Self {
        self.max_characters = max;
        self
    }

    /// Set the soft maximum
    pub fn with_new_after_n_chars(mut self, soft: usize) -> Self {
        self.new_after_n_chars = Some(soft);
        self
    }

    /// Set the combine threshold
    pub fn with_combine_under(mut self, threshold: usize) -> Self {
        self.combine_text_under_n_chars = Some(threshold);
        self
    }

    /// Set whether sections may span pages
    pub fn with_multipage_sections(mut self, multipage: bool) -> Self {
        self.multipage_sections = multipage;
        self
    }

    /// Effective soft maximum
    pub fn soft_max(&self) -> usize {
        self.new_after_n_chars.unwrap_or(self.max_characters)
    }

    /// Effective combine threshold
    pub fn combine_under(&self) -> usize {
        self.combine_text_under_n_chars.unwrap_or(self.max_characters)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.max_characters == 0 {
            return Err(DomainError::validation("max_characters must be greater than 0"));
        }

        if self.soft_max() == 0 {
            return Err(DomainError::validation(
                "new_after_n_chars must be greater than 0",
            ));
        }

        if self.soft_max() > self.max_characters {
            return Err(DomainError::validation(
                "new_after_n_chars must be less than or equal to max_characters",
            ));
        }

        if self.combine_under() > self.max_characters {
            return Err(DomainError::validation(
                "combine_text_under_n_chars must be less than or equal to max_characters",
            ));
        }

        Ok(())
    }
}

/// A chunking strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkingOp {
    ByTitle(TitleChunkingParams),
}

impl ChunkingOp {
    /// Every recognized chunking strategy
    pub const NAMES: [&'static str; 1] = ["chunk_by_title"];

    pub fn name(&self) -> &'static str {
        match self {
            Self::ByTitle(_) => "chunk_by_title",
        }
    }

    /// Build an operation from a named step
    pub fn from_spec(spec: &TransformationSpec) -> Result<Self, DomainError> {
        let name = spec.name.as_str();
        ensure_known(OperationKind::Chunking, &Self::NAMES, name)?;

        let params: TitleChunkingParams = parse_params(name, &spec.params)?;
        params.validate()?;

        Ok(Self::ByTitle(params))
    }
}
