//! Storage traits and error types
//!
//! This module defines the trait interface for job store backends and
//! associated error types.

use crate::crawler::ScrapeRequest;
use crate::storage::{JobRecord, JobStatus};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Job not found: {0}")]
    JobNotFound(Uuid),

    #[error("Invalid status transition for job {job_id}: {from:?} -> {to:?}")]
    InvalidTransition {
        job_id: Uuid,
        from: JobStatus,
        to: JobStatus,
    },
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Which jobs `list_jobs` returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobFilter {
    /// Only jobs in this status
    pub status: Option<JobStatus>,

    /// Maximum jobs returned
    pub limit: usize,

    /// Jobs skipped from the newest end
    pub offset: usize,
}

impl Default for JobFilter {
    fn default() -> Self {
        Self {
            status: None,
            limit: 50,
            offset: 0,
        }
    }
}

impl JobFilter {
    pub fn all() -> Self {
        Self {
            limit: usize::MAX,
            ..Self::default()
        }
    }
}

/// Trait for job store implementations
///
/// A store is owned by its caller and handed to whatever runs jobs; there is
/// no process-wide registry. Status changes follow
/// `Pending -> Running -> Completed | Failed` and anything else is rejected
/// with [`StorageError::InvalidTransition`].
pub trait JobStore: Send {
    /// Records a new pending job
    fn create_job(&mut self, request: ScrapeRequest) -> StorageResult<JobRecord>;

    /// Gets a job by ID
    fn get_job(&self, job_id: Uuid) -> StorageResult<JobRecord>;

    /// Lists jobs newest first
    fn list_jobs(&self, filter: &JobFilter) -> StorageResult<Vec<JobRecord>>;

    /// Moves a pending job to running
    fn mark_running(&mut self, job_id: Uuid) -> StorageResult<()>;

    /// Stores a running job's output and marks it completed
    fn complete_job(
        &mut self,
        job_id: Uuid,
        data: serde_json::Value,
        duration_seconds: f64,
    ) -> StorageResult<()>;

    /// Stores a running job's error and marks it failed
    fn fail_job(&mut self, job_id: Uuid, error: &str) -> StorageResult<()>;

    /// Deletes a job, returning whether it existed
    fn delete_job(&mut self, job_id: Uuid) -> StorageResult<bool>;
}
