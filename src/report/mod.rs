use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::editor::fields::FieldMap;
use crate::runner::state::{RunSummary, TestResult};

pub const DRAFT_SCHEMA_VERSION: u32 = 1;

/// Exportable message draft: the composed fields plus a summary of the last
/// response, if any
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftArtifact {
    pub schema_version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    pub fields: FieldMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSummary {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u64>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunReport<'a> {
    run_id: &'a str,
    summary: &'a RunSummary,
    results: &'a [TestResult],
    generated_at: DateTime<Utc>,
}

/// Write the JSON report for a finished run
pub fn write_run_report(
    output_dir: &Path,
    run_id: &str,
    results: &[TestResult],
    summary: &RunSummary,
) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(format!("test-run-{}.json", run_id));

    let report = RunReport {
        run_id,
        summary,
        results,
        generated_at: Utc::now(),
    };
    std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;

    println!("JSON report saved to: {}", path.display());
    Ok(path)
}

/// Write an exported draft artifact. Defaults to a timestamped file name in
/// the current directory when no path is given.
pub fn write_draft(artifact: &DraftArtifact, output: Option<&Path>) -> Result<PathBuf> {
    let path = match output {
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(format!(
            "iso8583-message-{}.json",
            Utc::now().timestamp_millis()
        )),
    };
    std::fs::write(&path, serde_json::to_string_pretty(artifact)?)?;
    Ok(path)
}
