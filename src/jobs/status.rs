//! Job status machine
//!
//! Job statuses: UNSUBMITTED → PENDING → PROCESSING → {COMPLETED | FAILED}
//!
//! UNSUBMITTED exists only locally. Every other status is reported by the
//! remote service and recorded verbatim.

use std::fmt;

use adwords_protocol::ops::BasicJobStatus;
use serde::{Deserialize, Serialize};

/// Check if a status is terminal (no further transitions possible)
pub trait TerminalState {
    fn is_terminal(&self) -> bool;
}

/// Status of a bulk mutate job as observed by this client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// No part has been accepted yet
    Unsubmitted,
    /// Waiting for the remaining parts, or queued for processing
    Pending,
    /// The remote service is applying the operations
    Processing,
    /// All parts processed; results are available
    Completed,
    /// The job failed as a whole
    Failed,
}

impl TerminalState for JobStatus {
    fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl JobStatus {
    /// Parse a raw status string reported by the remote service.
    ///
    /// Returns `None` for anything the client does not recognise.
    pub fn from_remote(raw: &str) -> Option<Self> {
        BasicJobStatus::parse(raw).map(Self::from)
    }

    /// Check if transition from this status to target is expected
    pub fn can_transition_to(&self, target: JobStatus) -> bool {
        match (self, target) {
            (JobStatus::Unsubmitted, JobStatus::Unsubmitted) => false,
            (JobStatus::Unsubmitted, _) => true,

            (JobStatus::Pending, JobStatus::Pending) => true,
            (JobStatus::Pending, JobStatus::Processing) => true,
            (JobStatus::Pending, JobStatus::Completed) => true,
            (JobStatus::Pending, JobStatus::Failed) => true,

            (JobStatus::Processing, JobStatus::Processing) => true,
            (JobStatus::Processing, JobStatus::Completed) => true,
            (JobStatus::Processing, JobStatus::Failed) => true,

            // Terminal statuses cannot transition
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Unsubmitted => "UNSUBMITTED",
            JobStatus::Pending => "PENDING",
            JobStatus::Processing => "PROCESSING",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
        }
    }
}

impl From<BasicJobStatus> for JobStatus {
    fn from(status: BasicJobStatus) -> Self {
        match status {
            BasicJobStatus::Pending => JobStatus::Pending,
            BasicJobStatus::Processing => JobStatus::Processing,
            BasicJobStatus::Completed => JobStatus::Completed,
            BasicJobStatus::Failed => JobStatus::Failed,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
