//! Docflow
//!
//! Document ingestion and preprocessing:
//! - Partition local files and URLs into typed elements
//! - Clean, extract from, stage and chunk element text
//! - Bulk ingest from S3, Azure, GitHub, Slack and Discord

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{
    DomainError, Element, ElementCategory, ElementMetadata, ElementSequence, IngestJobConfig,
    JobReport, PartitionOptions, TransformationSpec,
};
pub use infrastructure::{init_logging, DocumentIo};
