//! Failure taxonomy and stable exit codes

use serde::{Deserialize, Serialize};

/// Outcome of a job run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Job completed
    Success,
    /// Job failed remotely, or the client gave up on it
    Failed,
    /// The wait was cancelled locally
    Cancelled,
}

impl Status {
    pub fn default_exit_code(&self) -> ExitCode {
        match self {
            Status::Success => ExitCode::Success,
            Status::Failed => ExitCode::JobFailed,
            Status::Cancelled => ExitCode::Cancelled,
        }
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self, Status::Success)
    }
}

/// Failure kind - categorizes the cause of failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// Bad input: part count, part index, scope, config
    InvalidArgument,
    /// Operation not allowed in the job's current status
    InvalidState,
    /// The remote refused the request
    RemoteRejected,
    /// Transport failure, transient API error or malformed response
    RemoteUnavailable,
    /// The job did not finish before the deadline
    Timeout,
    /// The remote reported the job as FAILED
    JobFailed,
    /// The wait was cancelled
    Cancelled,
}

impl FailureKind {
    /// Get the stable exit code for this failure kind
    pub fn exit_code(&self) -> ExitCode {
        match self {
            FailureKind::InvalidArgument | FailureKind::InvalidState => ExitCode::InvalidInput,
            FailureKind::RemoteRejected => ExitCode::RemoteRejected,
            FailureKind::RemoteUnavailable => ExitCode::RemoteUnavailable,
            FailureKind::Timeout => ExitCode::Timeout,
            FailureKind::JobFailed => ExitCode::JobFailed,
            FailureKind::Cancelled => ExitCode::Cancelled,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FailureKind::InvalidArgument => "Invalid argument",
            FailureKind::InvalidState => "Invalid job state",
            FailureKind::RemoteRejected => "Rejected by the remote service",
            FailureKind::RemoteUnavailable => "Remote service unavailable",
            FailureKind::Timeout => "Timed out waiting for the job",
            FailureKind::JobFailed => "Job failed",
            FailureKind::Cancelled => "Wait cancelled",
        }
    }
}

/// Stable process exit codes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ExitCode {
    #[default]
    Success = 0,
    /// Invalid argument, configuration or job state
    InvalidInput = 2,
    RemoteRejected = 10,
    RemoteUnavailable = 20,
    Timeout = 30,
    /// The job finished as FAILED
    JobFailed = 40,
    Cancelled = 80,
}

impl ExitCode {
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    pub fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(ExitCode::Success),
            2 => Some(ExitCode::InvalidInput),
            10 => Some(ExitCode::RemoteRejected),
            20 => Some(ExitCode::RemoteUnavailable),
            30 => Some(ExitCode::Timeout),
            40 => Some(ExitCode::JobFailed),
            80 => Some(ExitCode::Cancelled),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExitCode::Success)
    }
}
