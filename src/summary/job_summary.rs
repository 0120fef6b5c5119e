//! Job summary describing one finished `jobs run`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use super::failure::{ExitCode, FailureKind, Status};
use crate::jobs::{JobError, JobHandle, JobOutcome, JobResult, JobStatus};

/// Schema version for the job summary
pub const SUMMARY_SCHEMA_VERSION: u32 = 1;

/// Schema identifier for the job summary
pub const SUMMARY_SCHEMA_ID: &str = "adwords/job_summary@1";

/// Success and failure counts of one part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartSummary {
    pub part_index: u32,
    pub succeeded: usize,
    pub failed: usize,
}

impl From<&JobResult> for PartSummary {
    fn from(result: &JobResult) -> Self {
        Self {
            part_index: result.part_index,
            succeeded: result.succeeded,
            failed: result.failed,
        }
    }
}

/// Job summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    pub schema_version: u32,
    pub schema_id: String,

    /// When the summary was created
    pub created_at: DateTime<Utc>,

    /// Remote job id; absent when no part was accepted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<i64>,

    pub total_parts: u32,

    /// Last status observed for the job
    pub final_status: JobStatus,

    pub status: Status,

    /// Failure kind (when status is not success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_kind: Option<FailureKind>,

    /// Stable exit code
    pub exit_code: i32,

    /// Status queries issued while waiting
    pub polls: u32,

    /// Wall-clock wait duration in milliseconds
    pub duration_ms: u64,

    /// Per-part results (completed jobs only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<PartSummary>,

    pub human_summary: String,

    /// Error message (when the run ended with an error)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobSummary {
    fn base(handle: &JobHandle, status: Status, exit_code: ExitCode) -> Self {
        Self {
            schema_version: SUMMARY_SCHEMA_VERSION,
            schema_id: SUMMARY_SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            job_id: handle.id().map(|id| id.value()),
            total_parts: handle.total_parts(),
            final_status: handle.status(),
            status,
            failure_kind: None,
            exit_code: exit_code.as_i32(),
            polls: 0,
            duration_ms: 0,
            parts: Vec::new(),
            human_summary: String::new(),
            error: None,
        }
    }

    /// Summary of a job that reached COMPLETED
    pub fn completed(handle: &JobHandle, outcome: &JobOutcome, results: &[JobResult]) -> Self {
        let mut summary = Self::base(handle, Status::Success, ExitCode::Success);
        summary.final_status = outcome.status;
        summary.polls = outcome.elapsed_polls;
        summary.duration_ms = duration_ms(outcome.elapsed);
        summary.parts = results.iter().map(PartSummary::from).collect();
        summary.human_summary = format!(
            "Job {} completed: {} part(s), {} operation(s) succeeded, {} failed after {} poll(s)",
            summary.job_label(),
            summary.total_parts,
            summary.total_succeeded(),
            summary.total_failed(),
            summary.polls
        );
        summary
    }

    /// Summary of a job the remote reported as FAILED
    pub fn failed(handle: &JobHandle, outcome: &JobOutcome) -> Self {
        let kind = FailureKind::JobFailed;
        let mut summary = Self::base(handle, Status::Failed, kind.exit_code());
        summary.final_status = outcome.status;
        summary.failure_kind = Some(kind);
        summary.polls = outcome.elapsed_polls;
        summary.duration_ms = duration_ms(outcome.elapsed);
        summary.human_summary = format!(
            "Job {} failed after {} poll(s)",
            summary.job_label(),
            summary.polls
        );
        summary
    }

    /// Summary of a run that ended with a coordinator error
    pub fn from_error(handle: &JobHandle, error: &JobError, elapsed: Duration) -> Self {
        let kind = error.failure_kind();
        let status = if kind == FailureKind::Cancelled {
            Status::Cancelled
        } else {
            Status::Failed
        };

        let mut summary = Self::base(handle, status, kind.exit_code());
        summary.failure_kind = Some(kind);
        summary.polls = error.polls().unwrap_or(0);
        summary.duration_ms = duration_ms(elapsed);
        summary.error = Some(error.to_string());
        summary.human_summary = format!("Job {}: {}: {}", summary.job_label(), kind.description(), error);
        summary
    }

    pub fn total_succeeded(&self) -> usize {
        self.parts.iter().map(|p| p.succeeded).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.parts.iter().map(|p| p.failed).sum()
    }

    fn job_label(&self) -> String {
        self.job_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "(unsubmitted)".to_string())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("JSON serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
