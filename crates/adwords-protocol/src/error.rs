//! Error types returned by AdWords API services.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error reasons reported by the remote API.
///
/// Codes are stable and used for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed request, missing required fields, or invalid field values.
    InvalidRequest,
    /// Missing or invalid developer token / auth token.
    AuthenticationError,
    /// The addressed service does not exist.
    UnknownService,
    /// The service has no such method.
    UnknownMethod,
    /// Too many requests; back off and retry.
    RateExceeded,
    /// Transient server-side failure.
    InternalError,
    /// The referenced entity does not exist.
    EntityNotFound,
    /// The referenced bulk mutate job does not exist.
    JobNotFound,
    /// `numRequestParts` is missing or below one.
    InvalidNumRequestParts,
    /// The request part index lies outside `[0, numRequestParts)`.
    PartIndexOutOfRange,
    /// A part with the same index was already received for this job.
    DuplicatePartIndex,
    /// An operation stream has no scoping entity.
    MissingScopingEntity,
    /// The scoping entity differs from the one the job was created with.
    ScopeMismatch,
    /// All declared request parts were already received.
    AllPartsReceived,
    /// Results are only returned for completed jobs.
    ResultsNotReady,
}

impl ErrorCode {
    /// Whether the failure is worth retrying for read-only calls.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateExceeded | Self::InternalError)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::AuthenticationError => "AUTHENTICATION_ERROR",
            Self::UnknownService => "UNKNOWN_SERVICE",
            Self::UnknownMethod => "UNKNOWN_METHOD",
            Self::RateExceeded => "RATE_EXCEEDED",
            Self::InternalError => "INTERNAL_ERROR",
            Self::EntityNotFound => "ENTITY_NOT_FOUND",
            Self::JobNotFound => "JOB_NOT_FOUND",
            Self::InvalidNumRequestParts => "INVALID_NUM_REQUEST_PARTS",
            Self::PartIndexOutOfRange => "PART_INDEX_OUT_OF_RANGE",
            Self::DuplicatePartIndex => "DUPLICATE_PART_INDEX",
            Self::MissingScopingEntity => "MISSING_SCOPING_ENTITY",
            Self::ScopeMismatch => "SCOPE_MISMATCH",
            Self::AllPartsReceived => "ALL_PARTS_RECEIVED",
            Self::ResultsNotReady => "RESULTS_NOT_READY",
        };
        f.write_str(s)
    }
}

/// API error payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{code}: {message}")]
pub struct ApiError {
    /// Error reason.
    pub code: ErrorCode,
    /// Human-readable, single-line message.
    pub message: String,
    /// OGNL-style path of the offending field, e.g. `operations[0].operand.request.partIndex`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_path: Option<String>,
    /// The offending value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field_path: None,
            trigger: None,
        }
    }

    /// Attach the offending field path.
    pub fn at(mut self, field_path: impl Into<String>) -> Self {
        self.field_path = Some(field_path.into());
        self
    }

    /// Attach the offending value.
    pub fn with_trigger(mut self, trigger: impl ToString) -> Self {
        self.trigger = Some(trigger.to_string());
        self
    }

    /// Create an INVALID_REQUEST error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Create a JOB_NOT_FOUND error.
    pub fn job_not_found(job_id: i64) -> Self {
        Self::new(ErrorCode::JobNotFound, format!("bulk mutate job {} not found", job_id))
            .with_trigger(job_id)
    }

    /// Create a DUPLICATE_PART_INDEX error.
    pub fn duplicate_part_index(job_id: i64, part_index: u32) -> Self {
        Self::new(
            ErrorCode::DuplicatePartIndex,
            format!("job {} already received part {}", job_id, part_index),
        )
        .at("operand.request.partIndex")
        .with_trigger(part_index)
    }

    /// Create a PART_INDEX_OUT_OF_RANGE error.
    pub fn part_index_out_of_range(part_index: u32, num_request_parts: u32) -> Self {
        Self::new(
            ErrorCode::PartIndexOutOfRange,
            format!(
                "part index {} is outside [0, {})",
                part_index, num_request_parts
            ),
        )
        .at("operand.request.partIndex")
        .with_trigger(part_index)
    }

    /// Create an UNKNOWN_METHOD error.
    pub fn unknown_method(service: &str, method: &str) -> Self {
        Self::new(
            ErrorCode::UnknownMethod,
            format!("{} has no method '{}'", service, method),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_serializes_screaming_snake() {
        let json = serde_json::to_string(&ErrorCode::DuplicatePartIndex).unwrap();
        assert_eq!(json, "\"DUPLICATE_PART_INDEX\"");
        assert_eq!(ErrorCode::DuplicatePartIndex.to_string(), "DUPLICATE_PART_INDEX");
    }

    #[test]
    fn test_transient_codes() {
        assert!(ErrorCode::RateExceeded.is_transient());
        assert!(ErrorCode::InternalError.is_transient());
        assert!(!ErrorCode::ScopeMismatch.is_transient());
    }

    #[test]
    fn test_api_error_display_and_fields() {
        let err = ApiError::duplicate_part_index(42, 1);
        assert_eq!(err.to_string(), "DUPLICATE_PART_INDEX: job 42 already received part 1");
        assert_eq!(err.field_path.as_deref(), Some("operand.request.partIndex"));
        assert_eq!(err.trigger.as_deref(), Some("1"));

        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["fieldPath"], "operand.request.partIndex");
    }
}
