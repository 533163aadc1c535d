use crate::errors::{ReporterError, ReporterResult};
use crate::model::RunSummary;
use std::path::Path;

/// Pretty-printed JSON text of a run summary.
pub fn to_json(summary: &RunSummary) -> ReporterResult<String> {
    serde_json::to_string_pretty(summary).map_err(ReporterError::Serialization)
}

pub fn write_results(path: &Path, json: &str) -> ReporterResult<()> {
    std::fs::write(path, json).map_err(|source| ReporterError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a results file back into a summary.
pub fn read_results(path: &Path) -> ReporterResult<RunSummary> {
    let invalid = |message: String| ReporterError::InvalidResults {
        path: path.to_path_buf(),
        message,
    };
    let raw = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
    serde_json::from_str(&raw).map_err(|e| invalid(e.to_string()))
}
