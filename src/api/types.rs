//! REST API types for upload responses.
//!
//! Single-file processing returns the workbook bytes directly as an
//! attachment; the batch endpoint returns JSON built from these types, with
//! the combined workbook embedded as base64.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::ProcessStats;
use crate::transform::pipeline::BatchOutcome;

/// Response sent after a batch upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    /// Unique job identifier
    pub job_id: String,

    /// Status: "ready", "warning" (some files failed), "error" (all failed)
    pub status: String,

    /// Combined workbook (one sheet per processed file), base64-encoded.
    /// Absent when every file failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workbook: Option<String>,

    /// Per-file outcomes, in upload order
    pub files: Vec<FileReport>,

    /// Metadata about the run
    pub metadata: BatchMetadata,
}

/// Outcome of one uploaded file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    /// Original file name
    pub file_name: String,

    /// "ok" or "error"
    pub status: String,

    /// Failure reason when status is "error"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Run statistics when status is "ok"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<FileStats>,
}

/// Per-file run statistics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStats {
    pub rows_in: usize,
    pub rows_kept: usize,
    pub unclassified: usize,
    pub staff_count: usize,
}

impl From<ProcessStats> for FileStats {
    fn from(stats: ProcessStats) -> Self {
        FileStats {
            rows_in: stats.rows_in,
            rows_kept: stats.rows_kept,
            unclassified: stats.unclassified,
            staff_count: stats.staff_count,
        }
    }
}

/// Metadata about a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchMetadata {
    /// When the run finished
    pub generated_at: DateTime<Utc>,

    /// Files received
    pub total_files: usize,

    /// Files processed cleanly
    pub processed_files: usize,

    /// Files that failed
    pub failed_files: usize,
}

impl BatchResponse {
    /// Build the response from a batch outcome and the combined workbook.
    pub fn from_outcome(outcome: &BatchOutcome, workbook: Option<Vec<u8>>) -> Self {
        let files: Vec<FileReport> = outcome
            .files
            .iter()
            .map(|file| match &file.result {
                Ok(table) => FileReport {
                    file_name: file.name.clone(),
                    status: "ok".to_string(),
                    error: None,
                    stats: Some(table.stats.into()),
                },
                Err(err) => FileReport {
                    file_name: file.name.clone(),
                    status: "error".to_string(),
                    error: Some(err.to_string()),
                    stats: None,
                },
            })
            .collect();

        let processed = outcome.successes().count();
        let failed = files.len() - processed;
        let status = if processed == 0 {
            "error"
        } else if failed > 0 {
            "warning"
        } else {
            "ready"
        };

        BatchResponse {
            job_id: Uuid::new_v4().to_string(),
            status: status.to_string(),
            workbook: workbook.map(|bytes| BASE64.encode(bytes)),
            metadata: BatchMetadata {
                generated_at: Utc::now(),
                total_files: files.len(),
                processed_files: processed,
                failed_files: failed,
            },
            files,
        }
    }
}

/// Create an error response body.
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "files": [],
    })
}
