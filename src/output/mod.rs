//! Output module for job exports and analytics
//!
//! This module handles:
//! - Exporting a job record as pretty JSON or as a CSV sheet
//! - Writing exports to files
//! - Aggregating job history into analytics

mod csv;
mod json;
pub mod stats;
mod traits;

pub use self::csv::{escape_field, export_csv, MAX_CSV_ROWS};
pub use json::export_json;
pub use stats::{print_analytics, JobAnalytics};
pub use traits::{ExportFormat, OutputError, OutputResult};

use crate::storage::JobRecord;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Formats a job record in the requested format
pub fn export_job(job: &JobRecord, format: ExportFormat) -> OutputResult<String> {
    match format {
        ExportFormat::Json => export_json(job),
        ExportFormat::Csv => Ok(export_csv(job)),
    }
}

/// Writes a job export to a file
pub fn write_export(job: &JobRecord, format: ExportFormat, output_path: &Path) -> OutputResult<()> {
    let content = export_job(job, format)?;

    let mut file = File::create(output_path)?;
    file.write_all(content.as_bytes())?;

    tracing::info!("Wrote {} export of job {} to {}", format, job.job_id, output_path.display());
    Ok(())
}

/// Default file name for an export, e.g. `scrape_<id>.csv`
pub fn export_file_name(job: &JobRecord, format: ExportFormat) -> String {
    format!("scrape_{}.{}", job.job_id, format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::ScrapeRequest;

    #[test]
    fn test_write_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let job = JobRecord::new(ScrapeRequest::new("example.com"));
        let path = dir.path().join(export_file_name(&job, ExportFormat::Csv));

        write_export(&job, ExportFormat::Csv, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("Field,Value\r\n"));
        assert!(path.to_string_lossy().ends_with(".csv"));
    }

    #[test]
    fn test_export_job_json() {
        let job = JobRecord::new(ScrapeRequest::new("example.com"));
        let text = export_job(&job, ExportFormat::Json).unwrap();
        assert!(text.starts_with('{'));
    }
}
