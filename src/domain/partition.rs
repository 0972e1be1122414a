//! Element partitioner trait and types
//!
//! A partitioner turns raw document bytes into an ordered
//! [`ElementSequence`](super::element::ElementSequence). The options map is
//! forwarded verbatim from the caller; partitioners pick the keys they know.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Debug;
use std::path::PathBuf;

use super::element::ElementSequence;
use super::DomainError;

/// Minimum partitioner version accepted by [`crate::infrastructure::DocumentIo`]
pub const MIN_PARTITIONER_VERSION: &str = "0.1.0";

/// Document formats understood by partitioners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    PlainText,
    Markdown,
    Html,
    Json,
    Csv,
}

impl FileType {
    /// Get file extensions associated with this file type
    pub fn extensions(&self) -> &[&str] {
        match self {
            Self::PlainText => &["txt", "text", "log"],
            Self::Markdown => &["md", "markdown"],
            Self::Html => &["html", "htm", "xhtml"],
            Self::Json => &["json"],
            Self::Csv => &["csv"],
        }
    }

    /// Canonical MIME type
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::PlainText => "text/plain",
            Self::Markdown => "text/markdown",
            Self::Html => "text/html",
            Self::Json => "application/json",
            Self::Csv => "text/csv",
        }
    }

    /// Detect from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_lowercase();

        [
            Self::PlainText,
            Self::Markdown,
            Self::Html,
            Self::Json,
            Self::Csv,
        ]
        .into_iter()
        .find(|file_type| file_type.extensions().contains(&ext.as_str()))
    }

    /// Detect from a MIME type (parameters such as charset are ignored)
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.to_lowercase();
        let essence = mime.split(';').next().unwrap_or_default().trim();

        match essence {
            "text/plain" => Some(Self::PlainText),
            "text/markdown" | "text/x-markdown" => Some(Self::Markdown),
            "text/html" | "application/xhtml+xml" => Some(Self::Html),
            "application/json" => Some(Self::Json),
            "text/csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// Options forwarded to the partitioner without validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionOptions {
    params: Map<String, Value>,
}

impl PartitionOptions {
    /// Create empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options from an existing JSON map
    pub fn from_map(params: Map<String, Value>) -> Self {
        Self { params }
    }

    /// Add an option
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// Raw option value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// String option
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }

    /// Boolean option
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.params.get(key).and_then(Value::as_bool)
    }

    /// Iterate over all options
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.params.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Raw document handed to a partitioner
#[derive(Debug, Clone)]
pub struct PartitionInput {
    /// Document bytes
    pub content: Vec<u8>,
    /// Local path the bytes were read from
    pub path: Option<PathBuf>,
    /// Remote URL the bytes were fetched from
    pub url: Option<String>,
    /// Declared MIME type (e.g. HTTP Content-Type)
    pub content_type: Option<String>,
}

impl PartitionInput {
    /// Create input from bytes
    pub fn from_bytes(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
            path: None,
            url: None,
            content_type: None,
        }
    }

    /// Set the local path
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the remote URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the declared content type
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Trait for element partitioners
#[async_trait]
pub trait ElementPartitioner: Send + Sync + Debug {
    /// Partitioner name, for diagnostics
    fn name(&self) -> &str;

    /// Partitioner version, checked against [`MIN_PARTITIONER_VERSION`]
    fn version(&self) -> &str;

    /// Partition a document of any supported format
    async fn partition(
        &self,
        input: PartitionInput,
        options: &PartitionOptions,
    ) -> Result<ElementSequence, DomainError>;
}

/// Compare dotted numeric versions (`"0.10.30"` style). Missing components
/// count as zero; non-numeric components are a configuration error.
pub fn version_at_least(installed: &str, minimum: &str) -> Result<bool, DomainError> {
    let installed = parse_version(installed)?;
    let minimum = parse_version(minimum)?;
    let width = installed.len().max(minimum.len());

    for idx in 0..width {
        let have = installed.get(idx).copied().unwrap_or(0);
        let need = minimum.get(idx).copied().unwrap_or(0);

        if have != need {
            return Ok(have > need);
        }
    }

    Ok(true)
}

fn parse_version(version: &str) -> Result<Vec<u64>, DomainError> {
    let core = version
        .trim()
        .trim_start_matches('v')
        .split(['-', '+'])
        .next()
        .unwrap_or_default();

    core.split('.')
        .map(|part| {
            part.parse::<u64>().map_err(|_| {
                DomainError::configuration(format!("Invalid version string '{}'", version))
            })
        })
        .collect()
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Mock partitioner for testing
    #[derive(Debug)]
    pub struct MockPartitioner {
        version: String,
        result: Mutex<Option<Result<ElementSequence, String>>>,
        calls: Mutex<Vec<PartitionInput>>,
    }

    impl MockPartitioner {
        pub fn new() -> Self {
            Self {
                version: "1.0.0".to_string(),
                result: Mutex::new(None),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn with_version(mut self, version: impl Into<String>) -> Self {
            self.version = version.into();
            self
        }

        pub fn with_result(self, elements: ElementSequence) -> Self {
            *self.result.lock().unwrap() = Some(Ok(elements));
            self
        }

        pub fn with_error(self, error: impl Into<String>) -> Self {
            *self.result.lock().unwrap() = Some(Err(error.into()));
            self
        }

        pub fn calls(&self) -> Vec<PartitionInput> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Default for MockPartitioner {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ElementPartitioner for MockPartitioner {
        fn name(&self) -> &str {
            "mock"
        }

        fn version(&self) -> &str {
            &self.version
        }

        async fn partition(
            &self,
            input: PartitionInput,
            _options: &PartitionOptions,
        ) -> Result<ElementSequence, DomainError> {
            self.calls.lock().unwrap().push(input);

            match self.result.lock().unwrap().take() {
                Some(Ok(elements)) => Ok(elements),
                Some(Err(message)) => Err(DomainError::validation(message)),
                None => Ok(Vec::new()),
            }
        }
    }
}
