//! Local job handle, parts, outcomes and results.

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use adwords_protocol::ops::{BulkMutateResult, EntityId, Operand, Operation};
use serde::{Deserialize, Serialize};

use super::status::JobStatus;

/// Remote-assigned bulk mutate job id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub i64);

impl JobId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One labelled part of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPart {
    /// 0-based, unique within the job
    pub part_index: u32,
    /// Entity the operations are scoped to, e.g. a campaign
    pub scope: EntityId,
    /// Mutations, applied in order
    pub operations: Vec<Operation<Operand>>,
}

impl JobPart {
    pub fn new(part_index: u32, scope: EntityId, operations: Vec<Operation<Operand>>) -> Self {
        Self {
            part_index,
            scope,
            operations,
        }
    }
}

/// Client-side view of one bulk mutate job.
///
/// The id is unset until the first part is accepted and never changes
/// afterwards. `total_parts` is fixed at creation.
#[derive(Debug, Clone)]
pub struct JobHandle {
    id: Option<JobId>,
    total_parts: u32,
    status: JobStatus,
    submitted_parts: BTreeSet<u32>,
}

impl JobHandle {
    pub(crate) fn new(total_parts: u32) -> Self {
        Self {
            id: None,
            total_parts,
            status: JobStatus::Unsubmitted,
            submitted_parts: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> Option<JobId> {
        self.id
    }

    pub fn total_parts(&self) -> u32 {
        self.total_parts
    }

    /// Last status reported by the remote service
    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// Part indices accepted so far, ascending
    pub fn submitted_parts(&self) -> impl Iterator<Item = u32> + '_ {
        self.submitted_parts.iter().copied()
    }

    pub fn is_submitted(&self) -> bool {
        self.id.is_some()
    }

    pub(crate) fn assign_id(&mut self, id: JobId) {
        if self.id.is_none() {
            self.id = Some(id);
        }
    }

    pub(crate) fn record_part(&mut self, part_index: u32) {
        self.submitted_parts.insert(part_index);
    }

    pub(crate) fn set_status(&mut self, status: JobStatus) {
        self.status = status;
    }
}

/// How a job ended, as observed by `await_completion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobOutcome {
    /// `Completed` or `Failed`
    pub status: JobStatus,
    /// Number of status queries issued
    pub elapsed_polls: u32,
    /// Wall-clock time spent waiting
    pub elapsed: Duration,
}

/// Result for one part of a completed job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobResult {
    pub part_index: u32,
    /// Operations that produced a return value
    pub succeeded: usize,
    /// Operations that failed, were skipped, or were lost
    pub failed: usize,
    /// Per-operation results as returned by the service
    pub payload: BulkMutateResult,
}

impl From<BulkMutateResult> for JobResult {
    fn from(payload: BulkMutateResult) -> Self {
        Self {
            part_index: payload.part_index,
            succeeded: payload.succeeded_count(),
            failed: payload.failed_count(),
            payload,
        }
    }
}
