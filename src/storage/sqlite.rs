//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the JobStore trait.
//! Requests and outputs are stored as JSON text columns.

use crate::crawler::ScrapeRequest;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{JobFilter, JobStore, StorageError, StorageResult};
use crate::storage::{check_transition, JobRecord, JobStatus};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use uuid::Uuid;

const SELECT_JOB: &str = "SELECT job_id, request, status, data, error, created_at, \
                          completed_at, duration_seconds FROM jobs";

/// SQLite job store
pub struct SqliteJobStore {
    conn: Connection,
}

impl SqliteJobStore {
    /// Opens or creates a job database at `path`
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn status_of(&self, job_id: Uuid) -> StorageResult<JobStatus> {
        let status: Option<String> = self
            .conn
            .query_row(
                "SELECT status FROM jobs WHERE job_id = ?1",
                params![job_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        let status = status.ok_or(StorageError::JobNotFound(job_id))?;
        JobStatus::from_db_string(&status)
            .ok_or_else(|| StorageError::Serialization(format!("unknown job status '{}'", status)))
    }

    fn transition(&self, job_id: Uuid, to: JobStatus) -> StorageResult<()> {
        let from = self.status_of(job_id)?;
        check_transition(job_id, from, to)
    }
}

impl JobStore for SqliteJobStore {
    fn create_job(&mut self, request: ScrapeRequest) -> StorageResult<JobRecord> {
        let job = JobRecord::new(request);
        self.conn.execute(
            "INSERT INTO jobs (job_id, request, status, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                job.job_id.to_string(),
                serde_json::to_string(&job.request)?,
                job.status.to_db_string(),
                timestamp(&job.created_at),
            ],
        )?;
        Ok(job)
    }

    fn get_job(&self, job_id: Uuid) -> StorageResult<JobRecord> {
        let raw = self
            .conn
            .query_row(
                &format!("{} WHERE job_id = ?1", SELECT_JOB),
                params![job_id.to_string()],
                RawJob::from_row,
            )
            .optional()?;

        raw.ok_or(StorageError::JobNotFound(job_id))?.into_record()
    }

    fn list_jobs(&self, filter: &JobFilter) -> StorageResult<Vec<JobRecord>> {
        let limit = i64::try_from(filter.limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(filter.offset).unwrap_or(i64::MAX);

        let raws = match filter.status {
            Some(status) => {
                let mut stmt = self.conn.prepare(&format!(
                    "{} WHERE status = ?1 ORDER BY seq DESC LIMIT ?2 OFFSET ?3",
                    SELECT_JOB
                ))?;
                let rows = stmt.query_map(
                    params![status.to_db_string(), limit, offset],
                    RawJob::from_row,
                )?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "{} ORDER BY seq DESC LIMIT ?1 OFFSET ?2",
                    SELECT_JOB
                ))?;
                let rows = stmt.query_map(params![limit, offset], RawJob::from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };

        raws.into_iter().map(RawJob::into_record).collect()
    }

    fn mark_running(&mut self, job_id: Uuid) -> StorageResult<()> {
        self.transition(job_id, JobStatus::Running)?;
        self.conn.execute(
            "UPDATE jobs SET status = ?1 WHERE job_id = ?2",
            params![JobStatus::Running.to_db_string(), job_id.to_string()],
        )?;
        Ok(())
    }

    fn complete_job(
        &mut self,
        job_id: Uuid,
        data: serde_json::Value,
        duration_seconds: f64,
    ) -> StorageResult<()> {
        self.transition(job_id, JobStatus::Completed)?;
        self.conn.execute(
            "UPDATE jobs SET status = ?1, data = ?2, completed_at = ?3, duration_seconds = ?4 \
             WHERE job_id = ?5",
            params![
                JobStatus::Completed.to_db_string(),
                serde_json::to_string(&data)?,
                timestamp(&Utc::now()),
                duration_seconds,
                job_id.to_string(),
            ],
        )?;
        Ok(())
    }

    fn fail_job(&mut self, job_id: Uuid, error: &str) -> StorageResult<()> {
        self.transition(job_id, JobStatus::Failed)?;
        self.conn.execute(
            "UPDATE jobs SET status = ?1, error = ?2, completed_at = ?3 WHERE job_id = ?4",
            params![
                JobStatus::Failed.to_db_string(),
                error,
                timestamp(&Utc::now()),
                job_id.to_string(),
            ],
        )?;
        Ok(())
    }

    fn delete_job(&mut self, job_id: Uuid) -> StorageResult<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM jobs WHERE job_id = ?1",
            params![job_id.to_string()],
        )?;
        Ok(deleted > 0)
    }
}

/// A jobs row before JSON and timestamp decoding
struct RawJob {
    job_id: String,
    request: String,
    status: String,
    data: Option<String>,
    error: Option<String>,
    created_at: String,
    completed_at: Option<String>,
    duration_seconds: Option<f64>,
}

impl RawJob {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            job_id: row.get(0)?,
            request: row.get(1)?,
            status: row.get(2)?,
            data: row.get(3)?,
            error: row.get(4)?,
            created_at: row.get(5)?,
            completed_at: row.get(6)?,
            duration_seconds: row.get(7)?,
        })
    }

    fn into_record(self) -> StorageResult<JobRecord> {
        let job_id = Uuid::parse_str(&self.job_id).map_err(|e| {
            StorageError::Serialization(format!("bad job id '{}': {}", self.job_id, e))
        })?;
        let status = JobStatus::from_db_string(&self.status).ok_or_else(|| {
            StorageError::Serialization(format!("unknown job status '{}'", self.status))
        })?;
        let data = self
            .data
            .as_deref()
            .map(serde_json::from_str::<serde_json::Value>)
            .transpose()?;

        Ok(JobRecord {
            job_id,
            request: serde_json::from_str(&self.request)?,
            status,
            data,
            error: self.error,
            created_at: parse_timestamp(&self.created_at)?,
            completed_at: self.completed_at.as_deref().map(parse_timestamp).transpose()?,
            duration_seconds: self.duration_seconds,
        })
    }
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StorageError::Serialization(format!("bad timestamp '{}': {}", s, e)))
}
