//! Remote interface the coordinator drives.
//!
//! Credentials and transport live behind this trait; the coordinator only
//! deals in job ids, parts and raw statuses.

use adwords_protocol::ops::{BulkMutateResult, EntityId, Operand, Operation};

use crate::service::ServiceError;

use super::handle::JobId;

/// One part submission.
#[derive(Debug, Clone, Copy)]
pub struct SubmitRequest<'a> {
    /// Unset for the first part of a job
    pub job_id: Option<JobId>,
    pub part_index: u32,
    pub total_parts: u32,
    pub operations: &'a [Operation<Operand>],
    pub scope: EntityId,
    /// True when this submission creates the job
    pub is_first_part: bool,
}

/// Acknowledgement of an accepted part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitAck {
    pub job_id: Option<JobId>,
    pub raw_status: Option<String>,
}

/// Answer to a status query.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub raw_status: Option<String>,
    /// Present when a result part index was requested and is available
    pub result: Option<BulkMutateResult>,
}

/// Job submission and status queries.
pub trait JobService {
    /// Submit one part. Exactly one remote call.
    fn submit_job(&self, request: &SubmitRequest<'_>) -> Result<SubmitAck, ServiceError>;

    /// Query the job status, optionally with the result of one part.
    fn query_job_status(
        &self,
        job_id: JobId,
        result_part_index: Option<u32>,
    ) -> Result<StatusReport, ServiceError>;
}

impl<T: JobService + ?Sized> JobService for &T {
    fn submit_job(&self, request: &SubmitRequest<'_>) -> Result<SubmitAck, ServiceError> {
        (**self).submit_job(request)
    }

    fn query_job_status(
        &self,
        job_id: JobId,
        result_part_index: Option<u32>,
    ) -> Result<StatusReport, ServiceError> {
        (**self).query_job_status(job_id, result_part_index)
    }
}
