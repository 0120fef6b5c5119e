//! Coordinator errors and their exit codes.

use std::time::Duration;

use adwords_protocol::ErrorCode;

use crate::service::ServiceError;
use crate::summary::FailureKind;

/// Errors surfaced by the job coordinator
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Remote rejected the request: {message}")]
    RemoteRejected {
        message: String,
        code: Option<ErrorCode>,
    },

    #[error("Remote unavailable: {message}")]
    RemoteUnavailable { message: String },

    #[error("Timed out after {polls} status queries ({elapsed:?})")]
    Timeout { polls: u32, elapsed: Duration },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Cancelled after {polls} status queries")]
    Cancelled { polls: u32 },
}

impl JobError {
    /// Map a service failure: remote validation errors are rejections,
    /// everything else means the remote could not be relied upon.
    pub fn from_service(error: ServiceError) -> Self {
        if error.is_rejection() {
            let code = error.api_error().map(|e| e.code);
            JobError::RemoteRejected {
                message: error.to_string(),
                code,
            }
        } else {
            JobError::RemoteUnavailable {
                message: error.to_string(),
            }
        }
    }

    /// Map error to failure kind for exit code
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            JobError::InvalidArgument(_) => FailureKind::InvalidArgument,
            JobError::InvalidState(_) => FailureKind::InvalidState,
            JobError::RemoteRejected { .. } => FailureKind::RemoteRejected,
            JobError::RemoteUnavailable { .. } => FailureKind::RemoteUnavailable,
            JobError::Timeout { .. } => FailureKind::Timeout,
            JobError::Cancelled { .. } => FailureKind::Cancelled,
        }
    }

    /// Get exit code for this error
    pub fn exit_code(&self) -> i32 {
        self.failure_kind().exit_code().as_i32()
    }

    /// Status queries issued before the error, when known
    pub fn polls(&self) -> Option<u32> {
        match self {
            JobError::Timeout { polls, .. } | JobError::Cancelled { polls } => Some(*polls),
            _ => None,
        }
    }
}

/// Result type for coordinator operations
pub type CoordinatorResult<T> = Result<T, JobError>;
