use crate::output::traits::OutputResult;
use crate::storage::JobRecord;

/// Formats a job record as pretty-printed JSON
pub fn export_json(job: &JobRecord) -> OutputResult<String> {
    Ok(serde_json::to_string_pretty(job)?)
}
