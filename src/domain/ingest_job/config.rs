//! Ingest job configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::partition::PartitionOptions;
use crate::domain::DomainError;

use super::BackendKind;

/// Processing options shared by every backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Directory receiving one `<item>.json` element list per document
    pub output_dir: PathBuf,
    /// Item-level parallelism hint for the backend
    #[serde(default = "default_num_processes")]
    pub num_processes: usize,
    #[serde(default = "default_true")]
    pub verbose: bool,
    /// Re-partition items whose output already exists
    #[serde(default)]
    pub reprocess: bool,
    /// Abort the job on the first item failure instead of logging it
    #[serde(default)]
    pub raise_on_error: bool,
    /// Scratch directory for downloads when no download dir is set
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
}

fn default_num_processes() -> usize {
    2
}

fn default_true() -> bool {
    true
}

fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join("docflow")
}

impl ProcessorConfig {
    /// Create a processor config writing to `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            num_processes: default_num_processes(),
            verbose: true,
            reprocess: false,
            raise_on_error: false,
            work_dir: default_work_dir(),
        }
    }

    /// Set the parallelism hint
    pub fn with_num_processes(mut self, num_processes: usize) -> Self {
        self.num_processes = num_processes;
        self
    }

    /// Set the scratch directory
    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    /// Re-partition existing outputs
    pub fn with_reprocess(mut self, reprocess: bool) -> Self {
        self.reprocess = reprocess;
        self
    }

    /// Fail the job on the first item error
    pub fn with_raise_on_error(mut self, raise: bool) -> Self {
        self.raise_on_error = raise;
        self
    }
}

/// Download options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadConfig {
    /// Where raw downloads land (defaults to `<work_dir>/downloads/<backend>`)
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    /// Download again even when the raw file already exists
    #[serde(default)]
    pub re_download: bool,
    /// Keep raw downloads after partitioning
    #[serde(default)]
    pub preserve_downloads: bool,
    /// Stop after downloading; do not partition
    #[serde(default)]
    pub download_only: bool,
    /// Upper bound on the number of documents processed
    #[serde(default)]
    pub max_docs: Option<usize>,
}

impl ReadConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the download directory
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = Some(dir.into());
        self
    }

    /// Keep raw downloads
    pub fn with_preserve_downloads(mut self, preserve: bool) -> Self {
        self.preserve_downloads = preserve;
        self
    }

    /// Only download
    pub fn with_download_only(mut self, download_only: bool) -> Self {
        self.download_only = download_only;
        self
    }

    /// Limit document count
    pub fn with_max_docs(mut self, max_docs: usize) -> Self {
        self.max_docs = Some(max_docs);
        self
    }
}

/// Partitioning options for ingested documents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartitionConfig {
    /// Forwarded to the partitioner
    #[serde(default)]
    pub options: PartitionOptions,
    /// Metadata keys removed from the written output
    #[serde(default)]
    pub metadata_exclude: Vec<String>,
    /// Write metadata as a flat `dotted.key` map
    #[serde(default)]
    pub flatten_metadata: bool,
}

impl PartitionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the forwarded partitioner options
    pub fn with_options(mut self, options: PartitionOptions) -> Self {
        self.options = options;
        self
    }

    /// Exclude metadata keys from the output
    pub fn with_metadata_exclude(mut self, keys: Vec<String>) -> Self {
        self.metadata_exclude = keys;
        self
    }
}

/// Backend-specific source location and extras
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum BackendConfig {
    /// S3-compatible object storage (`s3://bucket/prefix`)
    S3 {
        remote_url: String,
        #[serde(default = "default_true")]
        anonymous: bool,
    },
    /// Azure blob storage (`az://container/prefix`)
    Azure {
        remote_url: String,
        account_name: String,
    },
    /// Source-control hosting repository
    #[serde(rename = "github")]
    GitHub {
        url: String,
        #[serde(default)]
        branch: Option<String>,
        #[serde(default)]
        access_token: Option<String>,
    },
    /// Slack channels over a date range
    Slack {
        channels: Vec<String>,
        token: String,
        #[serde(default)]
        start_date: Option<String>,
        #[serde(default)]
        end_date: Option<String>,
    },
    /// Discord channels
    Discord {
        channels: Vec<String>,
        token: String,
        #[serde(default)]
        period_days: Option<u32>,
    },
}

impl BackendConfig {
    /// Which backend this configuration targets
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::S3 { .. } => BackendKind::S3,
            Self::Azure { .. } => BackendKind::Azure,
            Self::GitHub { .. } => BackendKind::GitHub,
            Self::Slack { .. } => BackendKind::Slack,
            Self::Discord { .. } => BackendKind::Discord,
        }
    }

    fn validate(&self) -> Result<(), DomainError> {
        match self {
            Self::S3 { remote_url, .. } => require_scheme(remote_url, &["s3", "s3a"]),
            Self::Azure {
                remote_url,
                account_name,
            } => {
                require_scheme(remote_url, &["az", "abfs", "abfss", "azure", "adl"])?;
                require_non_empty("account_name", account_name)
            }
            Self::GitHub { url, .. } => require_non_empty("url", url),
            Self::Slack {
                channels, token, ..
            }
            | Self::Discord {
                channels, token, ..
            } => {
                if channels.is_empty() || channels.iter().any(|c| c.trim().is_empty()) {
                    return Err(DomainError::validation(
                        "channels must contain at least one non-empty channel id",
                    ));
                }
                require_non_empty("token", token)
            }
        }
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{} cannot be empty", field)));
    }
    Ok(())
}

fn require_scheme(remote_url: &str, schemes: &[&str]) -> Result<(), DomainError> {
    let url = url::Url::parse(remote_url)
        .map_err(|e| {
            DomainError::validation(format!("Invalid remote URL '{}': {}", remote_url, e))
        })?;

    if !schemes.contains(&url.scheme()) {
        return Err(DomainError::validation(format!(
            "Remote URL '{}' must use one of the schemes: {}",
            remote_url,
            schemes.join(", ")
        )));
    }

    Ok(())
}

/// Complete configuration of one bulk ingest run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestJobConfig {
    pub processor: ProcessorConfig,
    #[serde(default)]
    pub read: ReadConfig,
    #[serde(default)]
    pub partition: PartitionConfig,
    pub backend: BackendConfig,
}

impl IngestJobConfig {
    /// Create a job from its three option groups and a backend
    pub fn new(processor: ProcessorConfig, backend: BackendConfig) -> Self {
        Self {
            processor,
            read: ReadConfig::default(),
            partition: PartitionConfig::default(),
            backend,
        }
    }

    /// S3 bucket/prefix ingest
    pub fn s3(
        remote_url: impl Into<String>,
        output_dir: impl Into<PathBuf>,
        num_processes: usize,
        anonymous: bool,
    ) -> Self {
        Self::new(
            ProcessorConfig::new(output_dir).with_num_processes(num_processes),
            BackendConfig::S3 {
                remote_url: remote_url.into(),
                anonymous,
            },
        )
    }

    /// Azure blob container ingest
    pub fn azure(
        remote_url: impl Into<String>,
        output_dir: impl Into<PathBuf>,
        account_name: impl Into<String>,
        num_processes: usize,
    ) -> Self {
        Self::new(
            ProcessorConfig::new(output_dir).with_num_processes(num_processes),
            BackendConfig::Azure {
                remote_url: remote_url.into(),
                account_name: account_name.into(),
            },
        )
    }

    /// Repository ingest on a branch
    pub fn github(
        url: impl Into<String>,
        branch: impl Into<String>,
        output_dir: impl Into<PathBuf>,
        num_processes: usize,
    ) -> Self {
        Self::new(
            ProcessorConfig::new(output_dir).with_num_processes(num_processes),
            BackendConfig::GitHub {
                url: url.into(),
                branch: Some(branch.into()),
                access_token: None,
            },
        )
    }

    /// Slack channel ingest over a date range
    pub fn slack(
        channels: Vec<String>,
        token: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
        output_dir: impl Into<PathBuf>,
        num_processes: usize,
    ) -> Self {
        Self::new(
            ProcessorConfig::new(output_dir).with_num_processes(num_processes),
            BackendConfig::Slack {
                channels,
                token: token.into(),
                start_date: Some(start_date.into()),
                end_date: Some(end_date.into()),
            },
        )
    }

    /// Discord channel ingest
    pub fn discord(
        channels: Vec<String>,
        token: impl Into<String>,
        output_dir: impl Into<PathBuf>,
        num_processes: usize,
    ) -> Self {
        Self::new(
            ProcessorConfig::new(output_dir).with_num_processes(num_processes),
            BackendConfig::Discord {
                channels,
                token: token.into(),
                period_days: None,
            },
        )
    }

    /// Replace the read options
    pub fn with_read(mut self, read: ReadConfig) -> Self {
        self.read = read;
        self
    }

    /// Replace the partition options
    pub fn with_partition(mut self, partition: PartitionConfig) -> Self {
        self.partition = partition;
        self
    }

    /// Replace the processor options
    pub fn with_processor(mut self, processor: ProcessorConfig) -> Self {
        self.processor = processor;
        self
    }

    /// Directory for raw downloads
    pub fn download_dir(&self) -> PathBuf {
        self.read.download_dir.clone().unwrap_or_else(|| {
            self.processor
                .work_dir
                .join("downloads")
                .join(self.backend.kind().as_str())
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.processor.output_dir.as_os_str().is_empty() {
            return Err(DomainError::validation("output_dir cannot be empty"));
        }

        if self.processor.num_processes == 0 {
            return Err(DomainError::validation(
                "num_processes must be greater than 0",
            ));
        }

        if self.read.max_docs == Some(0) {
            return Err(DomainError::validation("max_docs must be greater than 0"));
        }

        self.backend.validate()
    }
}
