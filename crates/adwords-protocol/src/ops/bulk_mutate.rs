//! BulkMutateJobService data objects.
//!
//! A bulk mutate job is uploaded in `numRequestParts` parts. The first part
//! is sent with operator ADD and creates the job; later parts are sent with
//! operator SET and the job id. Once every part has arrived the server
//! processes the job and exposes one [`BulkMutateResult`] per part.

use serde::{Deserialize, Serialize};

use super::entities::{EntityId, Operand, Operation, Operator};
use crate::error::ApiError;

/// Job status as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BasicJobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl BasicJobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }

    /// Parse a raw status string; `None` for anything unrecognized.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "PENDING" => Some(Self::Pending),
            "PROCESSING" => Some(Self::Processing),
            "COMPLETED" => Some(Self::Completed),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Mutations sharing one scoping entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStream {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoping_entity_id: Option<EntityId>,
    #[serde(default)]
    pub operations: Vec<Operation<Operand>>,
}

impl OperationStream {
    pub fn new(scope: EntityId, operations: Vec<Operation<Operand>>) -> Self {
        Self {
            scoping_entity_id: Some(scope),
            operations,
        }
    }
}

/// One uploaded part of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkMutateRequest {
    pub part_index: u32,
    #[serde(default)]
    pub operation_streams: Vec<OperationStream>,
}

impl BulkMutateRequest {
    pub fn operation_count(&self) -> usize {
        self.operation_streams.iter().map(|s| s.operations.len()).sum()
    }
}

/// Outcome of a single operation in a processed part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "resultType")]
pub enum OperationResult {
    ReturnValue { value: Operand },
    Failure { error: ApiError },
    BatchFailure { error: ApiError },
    Unprocessed,
    Lost,
}

impl OperationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::ReturnValue { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStreamResult {
    #[serde(default)]
    pub operation_results: Vec<OperationResult>,
}

/// Results for one part of a completed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkMutateResult {
    pub part_index: u32,
    #[serde(default)]
    pub operation_stream_results: Vec<OperationStreamResult>,
}

impl BulkMutateResult {
    fn results(&self) -> impl Iterator<Item = &OperationResult> {
        self.operation_stream_results
            .iter()
            .flat_map(|s| s.operation_results.iter())
    }

    pub fn succeeded_count(&self) -> usize {
        self.results().filter(|r| r.is_success()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results().filter(|r| !r.is_success()).count()
    }
}

/// The job object exchanged with `mutate` and `get`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkMutateJob {
    /// Server-assigned id; absent when creating a job.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub num_request_parts: u32,
    #[serde(default)]
    pub num_request_parts_received: u32,
    /// Raw status string. Kept untyped so unknown statuses survive decoding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<BulkMutateRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<BulkMutateResult>,
}

impl BulkMutateJob {
    pub fn basic_status(&self) -> Option<BasicJobStatus> {
        self.status.as_deref().and_then(BasicJobStatus::parse)
    }
}

/// Operation passed to `BulkMutateJobService.mutate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOperation {
    pub operator: Operator,
    pub operand: BulkMutateJob,
}

/// Selector for `BulkMutateJobService.get`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkMutateJobSelector {
    pub job_ids: Vec<i64>,
    /// When set, the returned job carries the result of this part.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_part_index: Option<u32>,
}

impl BulkMutateJobSelector {
    pub fn for_job(job_id: i64) -> Self {
        Self {
            job_ids: vec![job_id],
            result_part_index: None,
        }
    }

    pub fn with_result_part(mut self, part_index: u32) -> Self {
        self.result_part_index = Some(part_index);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::ops::entities::{AdGroup, AdGroupBids, AdGroupStatus};
    use serde_json::json;

    #[test]
    fn test_status_parse() {
        assert_eq!(BasicJobStatus::parse("PROCESSING"), Some(BasicJobStatus::Processing));
        assert_eq!(BasicJobStatus::parse("ARCHIVED"), None);
        assert_eq!(BasicJobStatus::Failed.as_str(), "FAILED");
    }

    #[test]
    fn test_job_keeps_unknown_status() {
        let job: BulkMutateJob =
            serde_json::from_value(json!({"id": 9, "status": "ARCHIVED"})).unwrap();
        assert_eq!(job.status.as_deref(), Some("ARCHIVED"));
        assert_eq!(job.basic_status(), None);
    }

    #[test]
    fn test_selector_wire_shape() {
        let selector = BulkMutateJobSelector::for_job(5).with_result_part(1);
        let value = serde_json::to_value(&selector).unwrap();
        assert_eq!(value, json!({"jobIds": [5], "resultPartIndex": 1}));
    }

    #[test]
    fn test_result_counts() {
        let group = AdGroup {
            id: Some(1),
            campaign_id: 2,
            name: "g".to_string(),
            status: AdGroupStatus::Enabled,
            bids: AdGroupBids::default(),
        };
        let result = BulkMutateResult {
            part_index: 0,
            operation_stream_results: vec![OperationStreamResult {
                operation_results: vec![
                    OperationResult::ReturnValue {
                        value: Operand::AdGroup(group),
                    },
                    OperationResult::Failure {
                        error: ApiError::new(ErrorCode::InvalidRequest, "bad"),
                    },
                    OperationResult::Unprocessed,
                ],
            }],
        };
        assert_eq!(result.succeeded_count(), 1);
        assert_eq!(result.failed_count(), 2);
    }
}
