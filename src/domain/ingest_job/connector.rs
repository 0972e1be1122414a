//! Source connector trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::BackendKind;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// One document discovered by a connector listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteItem {
    /// Relative path used for the download and output file names
    pub path: String,
    /// Backend location (object key, blob sha, channel id, ...)
    pub locator: String,
    /// Human-readable source, recorded as element `url` metadata
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

impl RemoteItem {
    pub fn new(path: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            locator: locator.into(),
            source_url: None,
            size: None,
            last_modified: None,
        }
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = Some(last_modified);
        self
    }

    /// Path relative to the job directories, with any leading separators and
    /// parent-directory segments removed
    pub fn relative_path(&self) -> String {
        self.path
            .split(['/', '\\'])
            .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// A backend that can enumerate and download documents
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SourceConnector: Send + Sync {
    /// Backend served by this connector
    fn backend(&self) -> BackendKind;

    /// Enumerate the documents at the configured location
    async fn list(&self) -> Result<Vec<RemoteItem>, DomainError>;

    /// Download one listed document
    async fn fetch(&self, item: &RemoteItem) -> Result<Vec<u8>, DomainError>;
}
