//! Typed facades over [`ServiceClient`].

use adwords_protocol::ops::{
    methods, AdGroup, AdGroupCriterion, BulkMutateJob, BulkMutateJobSelector, BulkMutateRequest,
    CriterionBidLandscape, GetArgs, JobMutateArgs, JobOperation, ListReturnValue, MutateArgs,
    Operation, OperationStream, Operator, Page, Selector,
};
use tracing::debug;

use super::client::ServiceClient;
use super::error::{ServiceError, ServiceResult};
use crate::jobs::{JobId, JobService, StatusReport, SubmitAck, SubmitRequest};
use crate::paging::PagedQuery;

/// Uploads bulk mutate jobs and reports their progress.
pub struct BulkMutateJobService {
    client: ServiceClient,
}

impl BulkMutateJobService {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ServiceClient {
        &self.client
    }

    /// Create a job (ADD) or append a part to it (SET)
    pub fn mutate(&self, operation: JobOperation) -> ServiceResult<BulkMutateJob> {
        self.client.invoke(methods::MUTATE, &JobMutateArgs { operation })
    }

    pub fn get(&self, selector: &BulkMutateJobSelector) -> ServiceResult<Vec<BulkMutateJob>> {
        self.client.invoke(methods::GET, &GetArgs { selector })
    }
}

impl JobService for BulkMutateJobService {
    fn submit_job(&self, request: &SubmitRequest<'_>) -> Result<SubmitAck, ServiceError> {
        let operator = if request.is_first_part {
            Operator::Add
        } else {
            Operator::Set
        };

        let operand = BulkMutateJob {
            id: request.job_id.map(|id| id.value()),
            num_request_parts: request.total_parts,
            num_request_parts_received: 0,
            status: None,
            request: Some(BulkMutateRequest {
                part_index: request.part_index,
                operation_streams: vec![OperationStream::new(
                    request.scope,
                    request.operations.to_vec(),
                )],
            }),
            result: None,
        };

        let job = self.mutate(JobOperation { operator, operand })?;
        debug!(
            job_id = ?job.id,
            parts_received = job.num_request_parts_received,
            status = ?job.status,
            "part accepted"
        );

        Ok(SubmitAck {
            job_id: job.id.map(JobId),
            raw_status: job.status,
        })
    }

    fn query_job_status(
        &self,
        job_id: JobId,
        result_part_index: Option<u32>,
    ) -> Result<StatusReport, ServiceError> {
        let mut selector = BulkMutateJobSelector::for_job(job_id.value());
        if let Some(part) = result_part_index {
            selector = selector.with_result_part(part);
        }

        let job = self
            .get(&selector)?
            .into_iter()
            .find(|job| job.id == Some(job_id.value()))
            .ok_or_else(|| ServiceError::Protocol(format!("job {} missing from get response", job_id)))?;

        Ok(StatusReport {
            raw_status: job.status,
            result: job.result,
        })
    }
}

/// Reporting data: criterion bid landscapes.
pub struct DataService {
    client: ServiceClient,
}

impl DataService {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ServiceClient {
        &self.client
    }

    pub fn get_criterion_bid_landscape(
        &self,
        selector: &Selector,
    ) -> ServiceResult<Page<CriterionBidLandscape>> {
        self.client
            .invoke(methods::GET_CRITERION_BID_LANDSCAPE, &GetArgs { selector })
    }

    /// All landscape pages for `selector`, paging over landscape points.
    pub fn bid_landscapes(
        &self,
        selector: Selector,
    ) -> PagedQuery<
        CriterionBidLandscape,
        ServiceError,
        impl FnMut(&Selector) -> ServiceResult<Page<CriterionBidLandscape>> + '_,
    > {
        PagedQuery::new(selector, move |s: &Selector| self.get_criterion_bid_landscape(s))
    }
}

pub struct AdGroupService {
    client: ServiceClient,
}

impl AdGroupService {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ServiceClient {
        &self.client
    }

    pub fn get(&self, selector: &Selector) -> ServiceResult<Page<AdGroup>> {
        self.client.invoke(methods::GET, &GetArgs { selector })
    }

    pub fn mutate(&self, operations: Vec<Operation<AdGroup>>) -> ServiceResult<ListReturnValue<AdGroup>> {
        self.client.invoke(methods::MUTATE, &MutateArgs { operations })
    }

    pub fn pages(
        &self,
        selector: Selector,
    ) -> PagedQuery<AdGroup, ServiceError, impl FnMut(&Selector) -> ServiceResult<Page<AdGroup>> + '_>
    {
        PagedQuery::new(selector, move |s: &Selector| self.get(s))
    }
}

pub struct AdGroupCriterionService {
    client: ServiceClient,
}

impl AdGroupCriterionService {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ServiceClient {
        &self.client
    }

    pub fn get(&self, selector: &Selector) -> ServiceResult<Page<AdGroupCriterion>> {
        self.client.invoke(methods::GET, &GetArgs { selector })
    }

    pub fn mutate(
        &self,
        operations: Vec<Operation<AdGroupCriterion>>,
    ) -> ServiceResult<ListReturnValue<AdGroupCriterion>> {
        self.client.invoke(methods::MUTATE, &MutateArgs { operations })
    }
}
