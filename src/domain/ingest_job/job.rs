//! Job lifecycle and run report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::domain::DomainError;

use super::BackendKind;

/// Lifecycle state of one ingest run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Configured,
    Running,
    Completed,
    Failed,
}

impl JobState {
    /// Check if the state is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Check if a transition to `next` is allowed
    pub fn can_transition_to(&self, next: JobState) -> bool {
        matches!(
            (self, next),
            (Self::Configured, Self::Running)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configured => "configured",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks the state of a single dispatched job
#[derive(Debug, Clone)]
pub struct IngestJob {
    id: String,
    backend: BackendKind,
    state: JobState,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl IngestJob {
    /// Create a job in the `Configured` state
    pub fn new(backend: BackendKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            backend,
            state: JobState::Configured,
            started_at: None,
            finished_at: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Move to `Running`
    pub fn start(&mut self) -> Result<(), DomainError> {
        self.transition(JobState::Running)?;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    /// Move to `Completed`
    pub fn complete(&mut self) -> Result<(), DomainError> {
        self.transition(JobState::Completed)?;
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    /// Move to `Failed`
    pub fn fail(&mut self) -> Result<(), DomainError> {
        self.transition(JobState::Failed)?;
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    fn transition(&mut self, next: JobState) -> Result<(), DomainError> {
        if !self.state.can_transition_to(next) {
            return Err(DomainError::internal(format!(
                "Invalid job state transition: {} -> {}",
                self.state, next
            )));
        }

        self.state = next;
        Ok(())
    }
}

/// Outcome of a completed ingest run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobReport {
    pub job_id: String,
    pub backend: BackendKind,
    pub state: JobState,
    /// Items returned by the listing (after `max_docs`)
    pub listed: usize,
    /// Raw files written to the download directory
    pub downloaded: usize,
    /// Element files written to the output directory
    pub processed: usize,
    /// Items skipped because their output already existed
    pub skipped: usize,
    /// Items whose download or partitioning failed
    pub failed: usize,
    /// Paths of the element files written
    pub outputs: Vec<PathBuf>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl JobReport {
    /// Wall-clock duration of the run, in milliseconds
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
