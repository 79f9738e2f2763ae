//! In-memory job store
//!
//! Jobs live for as long as the store value does. Nothing is shared between
//! stores, so each caller decides the lifetime of its own job history.

use crate::crawler::ScrapeRequest;
use crate::storage::traits::{JobFilter, JobStore, StorageError, StorageResult};
use crate::storage::{check_transition, JobRecord, JobStatus};
use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

/// Job store backed by an owned map
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    jobs: HashMap<Uuid, JobRecord>,

    /// Job IDs in creation order
    order: Vec<Uuid>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    fn job_mut(&mut self, job_id: Uuid) -> StorageResult<&mut JobRecord> {
        self.jobs
            .get_mut(&job_id)
            .ok_or(StorageError::JobNotFound(job_id))
    }

    fn transition(&mut self, job_id: Uuid, to: JobStatus) -> StorageResult<&mut JobRecord> {
        let job = self.job_mut(job_id)?;
        check_transition(job_id, job.status, to)?;
        job.status = to;
        Ok(job)
    }
}

impl JobStore for MemoryJobStore {
    fn create_job(&mut self, request: ScrapeRequest) -> StorageResult<JobRecord> {
        let job = JobRecord::new(request);
        self.order.push(job.job_id);
        self.jobs.insert(job.job_id, job.clone());
        Ok(job)
    }

    fn get_job(&self, job_id: Uuid) -> StorageResult<JobRecord> {
        self.jobs
            .get(&job_id)
            .cloned()
            .ok_or(StorageError::JobNotFound(job_id))
    }

    fn list_jobs(&self, filter: &JobFilter) -> StorageResult<Vec<JobRecord>> {
        Ok(self
            .order
            .iter()
            .rev()
            .filter_map(|id| self.jobs.get(id))
            .filter(|job| filter.status.map_or(true, |s| job.status == s))
            .skip(filter.offset)
            .take(filter.limit)
            .cloned()
            .collect())
    }

    fn mark_running(&mut self, job_id: Uuid) -> StorageResult<()> {
        self.transition(job_id, JobStatus::Running)?;
        Ok(())
    }

    fn complete_job(
        &mut self,
        job_id: Uuid,
        data: serde_json::Value,
        duration_seconds: f64,
    ) -> StorageResult<()> {
        let job = self.transition(job_id, JobStatus::Completed)?;
        job.data = Some(data);
        job.completed_at = Some(Utc::now());
        job.duration_seconds = Some(duration_seconds);
        Ok(())
    }

    fn fail_job(&mut self, job_id: Uuid, error: &str) -> StorageResult<()> {
        let job = self.transition(job_id, JobStatus::Failed)?;
        job.error = Some(error.to_string());
        job.completed_at = Some(Utc::now());
        Ok(())
    }

    fn delete_job(&mut self, job_id: Uuid) -> StorageResult<bool> {
        let existed = self.jobs.remove(&job_id).is_some();
        if existed {
            self.order.retain(|id| *id != job_id);
        }
        Ok(existed)
    }
}
