//! Ingest job lifecycle

use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info};

use super::factory::ConnectorFactory;
use super::runner::IngestRunner;
use crate::domain::{DomainError, IngestJob, IngestJobConfig, JobReport, SourceConnector};

/// Builds the connector for a job configuration and drives the run through
/// `Configured -> Running -> Completed | Failed`
#[derive(Debug, Clone)]
pub struct IngestDispatcher {
    factory: ConnectorFactory,
    runner: IngestRunner,
}

impl IngestDispatcher {
    pub fn new(factory: ConnectorFactory, runner: IngestRunner) -> Self {
        Self { factory, runner }
    }

    /// Run one job to completion. Any failure marks the job failed and is
    /// returned unchanged; nothing is retried.
    pub async fn run(&self, config: IngestJobConfig) -> Result<JobReport, DomainError> {
        config.validate()?;
        let connector = self.factory.create(&config.backend)?;
        self.run_with_connector(config, connector).await
    }

    /// Run a job against an already built connector
    pub async fn run_with_connector(
        &self,
        config: IngestJobConfig,
        connector: Arc<dyn SourceConnector>,
    ) -> Result<JobReport, DomainError> {
        config.validate()?;

        let mut job = IngestJob::new(config.backend.kind());
        job.start()?;

        info!(
            job_id = %job.id(),
            backend = %job.backend(),
            output_dir = %config.processor.output_dir.display(),
            num_processes = config.processor.num_processes,
            "Ingest job started"
        );

        let stats = match self.runner.run(&config, connector).await {
            Ok(stats) => stats,
            Err(e) => {
                job.fail()?;
                error!(
                    job_id = %job.id(),
                    backend = %job.backend(),
                    error = %e,
                    "Ingest job failed"
                );
                return Err(e);
            }
        };

        job.complete()?;

        let report = JobReport {
            job_id: job.id().to_string(),
            backend: job.backend(),
            state: job.state(),
            listed: stats.listed,
            downloaded: stats.downloaded,
            processed: stats.processed,
            skipped: stats.skipped,
            failed: stats.failed,
            outputs: stats.outputs,
            started_at: job.started_at().unwrap_or_else(Utc::now),
            finished_at: job.finished_at().unwrap_or_else(Utc::now),
        };

        if config.processor.verbose {
            info!(
                job_id = %report.job_id,
                backend = %report.backend,
                processed = report.processed,
                skipped = report.skipped,
                failed = report.failed,
                duration_ms = report.duration_ms(),
                "Ingest job completed"
            );
        }

        Ok(report)
    }
}
