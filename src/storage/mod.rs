//! Storage module for scrape jobs
//!
//! This module handles job bookkeeping around the scrape core, including:
//! - The job record and its status lifecycle
//! - In-memory and SQLite job stores behind one trait
//! - Running a stored job through a coordinator

mod memory;
mod schema;
mod sqlite;
mod traits;

pub use memory::MemoryJobStore;
pub use sqlite::SqliteJobStore;
pub use traits::{JobFilter, JobStore, StorageError, StorageResult};

use crate::config::StorageConfig;
use crate::crawler::{Coordinator, ScrapeRequest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use uuid::Uuid;

/// A scrape job and its outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: Uuid,
    pub request: ScrapeRequest,
    pub status: JobStatus,

    /// Serialized scrape output, set on completion
    pub data: Option<serde_json::Value>,

    /// Error message, set on failure
    pub error: Option<String>,

    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<f64>,
}

impl JobRecord {
    /// A fresh pending job created now
    pub fn new(request: ScrapeRequest) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            request,
            status: JobStatus::Pending,
            data: None,
            error: None,
            created_at: Utc::now(),
            completed_at: None,
            duration_seconds: None,
        }
    }
}

/// Status of a scrape job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Returns true if a job may move from this status to `next`
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Running)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Failed)
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_db_string())
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_string(&s.to_ascii_lowercase())
            .ok_or_else(|| format!("unknown job status '{}'", s))
    }
}

/// Checks a status change, naming the job on failure
pub(crate) fn check_transition(
    job_id: Uuid,
    from: JobStatus,
    to: JobStatus,
) -> StorageResult<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(StorageError::InvalidTransition { job_id, from, to })
    }
}

/// Opens the configured job store
///
/// A configured `database-path` selects SQLite; otherwise jobs live in memory
/// for the lifetime of the returned store.
pub fn open_store(config: &StorageConfig) -> StorageResult<Box<dyn JobStore>> {
    match config.database_path.as_deref() {
        Some(path) => {
            tracing::debug!("Opening job database at {}", path);
            Ok(Box::new(SqliteJobStore::new(Path::new(path))?))
        }
        None => Ok(Box::new(MemoryJobStore::new())),
    }
}

/// Runs a stored job to completion
///
/// The job is marked running, scraped, then marked completed with its output
/// and duration, or failed with the error's message. A scrape failure is
/// recorded on the job, not returned; only storage errors are returned.
pub async fn run_job<S>(
    store: &mut S,
    coordinator: &Coordinator,
    job_id: Uuid,
) -> crate::Result<JobRecord>
where
    S: JobStore + ?Sized,
{
    let job = store.get_job(job_id)?;
    store.mark_running(job_id)?;
    tracing::info!("Job {} started for {}", job_id, job.request.url);

    let started = Instant::now();
    match coordinator.scrape(&job.request).await {
        Ok(output) => {
            let data = serde_json::to_value(&output).map_err(StorageError::from)?;
            let duration = started.elapsed().as_secs_f64();
            store.complete_job(job_id, data, duration)?;
            tracing::info!("Job {} completed in {:.2}s", job_id, duration);
        }
        Err(e) => {
            tracing::warn!("Job {} failed: {}", job_id, e);
            store.fail_job(job_id, &e.to_string())?;
        }
    }

    Ok(store.get_job(job_id)?)
}
