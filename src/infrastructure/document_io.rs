//! Document retrieval, normalization, transformation and bulk ingest entry
//! points

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::AppConfig;
use crate::domain::{
    version_at_least, CleaningPipeline, DomainError, Element, ElementPartitioner, ElementSequence,
    ExtractedValue, IngestJobConfig, JobReport, PartitionInput, PartitionOptions, SourceReference,
    StagedOutput, TransformationSpec, Translator, MIN_PARTITIONER_VERSION,
};
use crate::infrastructure::http_client::{HttpClient, HttpClientTrait};
use crate::infrastructure::ingest::{ApiEndpoints, ConnectorFactory, IngestDispatcher, IngestRunner};
use crate::infrastructure::partitioners::AutoPartitioner;
use crate::infrastructure::transform::TransformationRegistry;
use crate::infrastructure::translation::HttpTranslator;

/// Defaults for the per-backend ingest shortcuts
#[derive(Debug, Clone, PartialEq)]
pub struct IngestDefaults {
    pub num_processes: usize,
    pub work_dir: PathBuf,
}

impl Default for IngestDefaults {
    fn default() -> Self {
        Self {
            num_processes: 2,
            work_dir: std::env::temp_dir().join("docflow"),
        }
    }
}

/// Entry point tying together source resolution, element normalization,
/// the transformation registry and the ingest dispatcher
#[derive(Debug, Clone)]
pub struct DocumentIo {
    partitioner: Arc<dyn ElementPartitioner>,
    http: Arc<dyn HttpClientTrait>,
    registry: TransformationRegistry,
    dispatcher: IngestDispatcher,
    ingest_defaults: IngestDefaults,
}

impl DocumentIo {
    /// Build the component, failing when the partitioner is older than
    /// [`MIN_PARTITIONER_VERSION`]
    pub fn new(
        partitioner: Arc<dyn ElementPartitioner>,
        http: Arc<dyn HttpClientTrait>,
    ) -> Result<Self, DomainError> {
        if !version_at_least(partitioner.version(), MIN_PARTITIONER_VERSION)? {
            return Err(DomainError::configuration(format!(
                "Partitioner '{}' version {} is older than the minimum supported version {}",
                partitioner.name(),
                partitioner.version(),
                MIN_PARTITIONER_VERSION
            )));
        }

        let dispatcher = IngestDispatcher::new(
            ConnectorFactory::new(http.clone()),
            IngestRunner::new(partitioner.clone()),
        );

        Ok(Self {
            partitioner,
            http,
            registry: TransformationRegistry::new(),
            dispatcher,
            ingest_defaults: IngestDefaults::default(),
        })
    }

    /// Build with the built-in partitioner, a reqwest client and, when an
    /// endpoint is configured, the HTTP translator
    pub fn from_config(config: &AppConfig) -> Result<Self, DomainError> {
        let http: Arc<dyn HttpClientTrait> = Arc::new(HttpClient::with_options(
            Duration::from_secs(config.http.timeout_secs),
            &config.http.user_agent,
        )?);

        let mut io = Self::new(Arc::new(AutoPartitioner::new()), http.clone())?
            .with_ingest_defaults(IngestDefaults {
                num_processes: config.ingest.num_processes,
                work_dir: config.ingest.work_dir.clone(),
            });

        if let Some(endpoint) = &config.translation.endpoint {
            let mut translator = HttpTranslator::new(http, endpoint.clone());
            if let Some(api_key) = &config.translation.api_key {
                translator = translator.with_api_key(api_key.clone());
            }
            io = io.with_translator(Arc::new(translator));
        }

        Ok(io)
    }

    /// Enable `translate_text`
    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.registry = TransformationRegistry::with_translator(translator);
        self
    }

    /// Use other base URLs for the HTTP ingest backends
    pub fn with_endpoints(mut self, endpoints: ApiEndpoints) -> Self {
        self.dispatcher = IngestDispatcher::new(
            ConnectorFactory::new(self.http.clone()).with_endpoints(endpoints),
            IngestRunner::new(self.partitioner.clone()),
        );
        self
    }

    pub fn with_ingest_defaults(mut self, defaults: IngestDefaults) -> Self {
        self.ingest_defaults = defaults;
        self
    }

    pub fn registry(&self) -> &TransformationRegistry {
        &self.registry
    }

    /// Resolve a URL or local path and partition it into elements.
    ///
    /// `options` are forwarded to the partitioner unchanged.
    pub async fn parse_file_or_url(
        &self,
        reference: &str,
        options: &PartitionOptions,
    ) -> Result<ElementSequence, DomainError> {
        match SourceReference::classify(reference) {
            SourceReference::Url(url) => {
                info!(url = %url, "Retrieving document from URL");

                let result = async {
                    let response = self.http.get(url.as_str(), vec![]).await?;
                    let input = PartitionInput::from_bytes(response.body.to_vec())
                        .with_url(url.as_str())
                        .with_content_type("text/html");
                    self.partitioner.partition(input, options).await
                }
                .await;

                result.map_err(|e| DomainError::source_fetch(url.as_str(), e))
            }
            SourceReference::Path(path) => {
                let path_display = path.display().to_string();

                if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                    return Err(DomainError::source_not_found(path_display));
                }

                info!(path = %path_display, "Partitioning local document");

                let result = async {
                    let content = tokio::fs::read(&path).await?;
                    let input = PartitionInput::from_bytes(content).with_path(path.clone());
                    self.partitioner.partition(input, options).await
                }
                .await;

                result.map_err(|e| DomainError::source_parse(path_display, e))
            }
        }
    }

    /// Run a cleaning pipeline over `text`; `None` selects the default
    /// pipeline. Every step is validated before any is applied.
    pub async fn clean_text_data(
        &self,
        text: &str,
        options: Option<&[TransformationSpec]>,
    ) -> Result<String, DomainError> {
        let pipeline = match options {
            Some(specs) => CleaningPipeline::from_specs(specs)?,
            None => CleaningPipeline::default(),
        };

        debug!(steps = pipeline.steps().len(), "Cleaning text");
        self.registry.clean_pipeline(text, &pipeline).await
    }

    /// Apply one named extraction to `text`
    pub fn extract_data_from_text(
        &self,
        text: &str,
        spec: &TransformationSpec,
    ) -> Result<ExtractedValue, DomainError> {
        self.registry.apply_extraction(text, spec)
    }

    /// Convert elements to a named export format
    pub async fn stage_elements(
        &self,
        elements: &[Element],
        spec: &TransformationSpec,
    ) -> Result<StagedOutput, DomainError> {
        self.registry.apply_staging(elements, spec).await
    }

    /// Group elements with a named chunking strategy
    pub fn chunk_elements(
        &self,
        elements: &[Element],
        spec: &TransformationSpec,
    ) -> Result<ElementSequence, DomainError> {
        self.registry.apply_chunking(elements, spec)
    }

    /// Run a fully specified ingest job
    pub async fn run_ingest(&self, config: IngestJobConfig) -> Result<JobReport, DomainError> {
        self.dispatcher.run(config).await
    }

    fn with_defaults(
        &self,
        mut config: IngestJobConfig,
        num_processes: Option<usize>,
    ) -> IngestJobConfig {
        config.processor.num_processes =
            num_processes.unwrap_or(self.ingest_defaults.num_processes);
        config.processor.work_dir = self.ingest_defaults.work_dir.clone();
        config
    }

    /// Ingest every object below an `s3://bucket/prefix` URL
    pub async fn run_s3_ingest(
        &self,
        remote_url: &str,
        output_dir: impl Into<PathBuf>,
        num_processes: Option<usize>,
        anonymous: bool,
    ) -> Result<JobReport, DomainError> {
        let config = IngestJobConfig::s3(remote_url, output_dir, 1, anonymous);
        self.run_ingest(self.with_defaults(config, num_processes)).await
    }

    /// Ingest every blob below an `az://container/prefix` URL
    pub async fn run_azure_ingest(
        &self,
        remote_url: &str,
        output_dir: impl Into<PathBuf>,
        account_name: &str,
        num_processes: Option<usize>,
    ) -> Result<JobReport, DomainError> {
        let config = IngestJobConfig::azure(remote_url, output_dir, account_name, 1);
        self.run_ingest(self.with_defaults(config, num_processes)).await
    }

    /// Ingest every file of a repository branch
    pub async fn run_github_ingest(
        &self,
        url: &str,
        branch: &str,
        output_dir: impl Into<PathBuf>,
        num_processes: Option<usize>,
    ) -> Result<JobReport, DomainError> {
        let config = IngestJobConfig::github(url, branch, output_dir, 1);
        self.run_ingest(self.with_defaults(config, num_processes)).await
    }

    /// Ingest Slack channel histories between two dates
    pub async fn run_slack_ingest(
        &self,
        channels: Vec<String>,
        token: &str,
        start_date: &str,
        end_date: &str,
        output_dir: impl Into<PathBuf>,
        num_processes: Option<usize>,
    ) -> Result<JobReport, DomainError> {
        let config = IngestJobConfig::slack(channels, token, start_date, end_date, output_dir, 1);
        self.run_ingest(self.with_defaults(config, num_processes)).await
    }

    /// Ingest Discord channel messages
    pub async fn run_discord_ingest(
        &self,
        channels: Vec<String>,
        token: &str,
        output_dir: impl Into<PathBuf>,
        num_processes: Option<usize>,
    ) -> Result<JobReport, DomainError> {
        let config = IngestJobConfig::discord(channels, token, output_dir, 1);
        self.run_ingest(self.with_defaults(config, num_processes)).await
    }
}
