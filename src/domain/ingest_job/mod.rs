//! Bulk ingest job domain types
//!
//! This module provides:
//! - `IngestJobConfig` with its processor/read/partition sections and the
//!   per-backend `BackendConfig` union
//! - `IngestJob` state tracking and the `JobReport` returned by a run
//! - `SourceConnector` trait implemented by each backend

pub mod config;
pub mod connector;
pub mod job;

pub use config::{BackendConfig, IngestJobConfig, PartitionConfig, ProcessorConfig, ReadConfig};
pub use connector::{RemoteItem, SourceConnector};
pub use job::{IngestJob, JobReport, JobState};

#[cfg(test)]
pub use connector::MockSourceConnector;

use serde::{Deserialize, Serialize};

/// External system an ingest job pulls from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    S3,
    Azure,
    #[serde(rename = "github")]
    GitHub,
    Slack,
    Discord,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S3 => "s3",
            Self::Azure => "azure",
            Self::GitHub => "github",
            Self::Slack => "slack",
            Self::Discord => "discord",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
