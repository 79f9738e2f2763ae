//! Job analytics
//!
//! This module aggregates a job history into totals, a success rate, the
//! mean completion time and a per-day histogram.

use crate::storage::{JobFilter, JobRecord, JobStatus, JobStore, StorageResult};
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregate statistics over a set of jobs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobAnalytics {
    pub total_jobs: usize,
    pub completed_jobs: usize,
    pub failed_jobs: usize,
    pub pending_jobs: usize,
    pub running_jobs: usize,

    /// Completed jobs as a percentage of all jobs, 2 decimals
    pub success_rate: f64,

    /// Mean duration of completed jobs in seconds, 2 decimals
    pub average_completion_time: Option<f64>,

    /// `YYYY-MM-DD` creation date to job count
    pub jobs_by_date: BTreeMap<String, usize>,
}

impl JobAnalytics {
    pub fn from_jobs(jobs: &[JobRecord]) -> Self {
        let count = |status: JobStatus| jobs.iter().filter(|j| j.status == status).count();

        let total_jobs = jobs.len();
        let completed_jobs = count(JobStatus::Completed);

        let success_rate = if total_jobs > 0 {
            round2(completed_jobs as f64 / total_jobs as f64 * 100.0)
        } else {
            0.0
        };

        let durations: Vec<f64> = jobs
            .iter()
            .filter(|j| j.status == JobStatus::Completed)
            .filter_map(|j| j.duration_seconds)
            .collect();
        let average_completion_time = if durations.is_empty() {
            None
        } else {
            Some(round2(durations.iter().sum::<f64>() / durations.len() as f64))
        };

        let mut jobs_by_date = BTreeMap::new();
        for job in jobs {
            let day = job.created_at.date_naive().format("%Y-%m-%d").to_string();
            *jobs_by_date.entry(day).or_insert(0) += 1;
        }

        Self {
            total_jobs,
            completed_jobs,
            failed_jobs: count(JobStatus::Failed),
            pending_jobs: count(JobStatus::Pending),
            running_jobs: count(JobStatus::Running),
            success_rate,
            average_completion_time,
            jobs_by_date,
        }
    }

    /// Loads every job from a store and aggregates it
    pub fn load(store: &dyn JobStore) -> StorageResult<Self> {
        let jobs = store.list_jobs(&JobFilter::all())?;
        Ok(Self::from_jobs(&jobs))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Prints analytics to stdout in a formatted manner
pub fn print_analytics(analytics: &JobAnalytics) {
    println!("=== Job Analytics ===\n");

    println!("Jobs:");
    println!("  Total: {}", analytics.total_jobs);
    println!("  Completed: {}", analytics.completed_jobs);
    println!("  Failed: {}", analytics.failed_jobs);
    println!("  Pending: {}", analytics.pending_jobs);
    println!("  Running: {}", analytics.running_jobs);
    println!();

    println!("Success Rate: {:.2}%", analytics.success_rate);
    match analytics.average_completion_time {
        Some(avg) => println!("Average Completion Time: {:.2}s", avg),
        None => println!("Average Completion Time: n/a"),
    }

    if !analytics.jobs_by_date.is_empty() {
        println!();
        println!("Jobs by Date:");
        for (day, count) in &analytics.jobs_by_date {
            println!("  {}: {}", day, count);
        }
    }
}
