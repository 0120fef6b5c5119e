//! Sandbox state: bulk jobs and campaign-management entities.

use std::collections::{BTreeMap, HashMap, VecDeque};

use adwords_protocol::ops::{
    AdGroup, AdGroupAd, AdGroupCriterion, BasicJobStatus, BulkMutateJob,
    BulkMutateRequest, BulkMutateResult, CriterionBidLandscape, EntityId, Operand, Operation,
    OperationResult, OperationStreamResult, Operator,
};
use adwords_protocol::{ApiError, ErrorCode};
use chrono::{DateTime, Utc};

/// First id handed out to entities created in the sandbox
const FIRST_ENTITY_ID: i64 = 1000;

/// A bulk mutate job held by the sandbox
#[derive(Debug, Clone)]
pub struct SandboxJob {
    pub id: i64,
    pub num_request_parts: u32,
    /// Scoping entity of the first part
    pub scope: EntityId,
    pub parts: BTreeMap<u32, BulkMutateRequest>,
    pub status: BasicJobStatus,
    /// Statuses still to go through, one per status poll
    pub progression: VecDeque<BasicJobStatus>,
    pub results: BTreeMap<u32, BulkMutateResult>,
    /// Status history for debugging
    pub history: Vec<(BasicJobStatus, DateTime<Utc>)>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SandboxJob {
    pub fn new(id: i64, num_request_parts: u32, scope: EntityId) -> Self {
        let now = Utc::now();
        Self {
            id,
            num_request_parts,
            scope,
            parts: BTreeMap::new(),
            status: BasicJobStatus::Pending,
            progression: VecDeque::new(),
            results: BTreeMap::new(),
            history: vec![(BasicJobStatus::Pending, now)],
            created_at: now,
            updated_at: now,
        }
    }

    pub fn all_parts_received(&self) -> bool {
        self.parts.len() as u32 >= self.num_request_parts
    }

    pub fn transition(&mut self, status: BasicJobStatus) {
        let now = Utc::now();
        self.status = status;
        self.history.push((status, now));
        self.updated_at = now;
    }

    /// Wire form of the job, optionally carrying one part's result
    pub fn to_wire(&self, result: Option<BulkMutateResult>) -> BulkMutateJob {
        BulkMutateJob {
            id: Some(self.id),
            num_request_parts: self.num_request_parts,
            num_request_parts_received: self.parts.len() as u32,
            status: Some(self.status.as_str().to_string()),
            request: None,
            result,
        }
    }
}

/// Mutable sandbox state
#[derive(Debug, Clone)]
pub struct SandboxState {
    next_job_id: i64,
    next_entity_id: i64,
    next_server_request: u64,
    pub jobs: BTreeMap<i64, SandboxJob>,
    /// Per-job progression overrides, consumed when the last part arrives
    pub job_progressions: HashMap<i64, Vec<BasicJobStatus>>,
    pub default_progression: Vec<BasicJobStatus>,
    pub ad_groups: Vec<AdGroup>,
    pub criteria: Vec<AdGroupCriterion>,
    pub ads: Vec<AdGroupAd>,
    pub landscapes: Vec<CriterionBidLandscape>,
}

impl Default for SandboxState {
    fn default() -> Self {
        Self {
            next_job_id: 1,
            next_entity_id: FIRST_ENTITY_ID,
            next_server_request: 1,
            jobs: BTreeMap::new(),
            job_progressions: HashMap::new(),
            default_progression: vec![
                BasicJobStatus::Processing,
                BasicJobStatus::Processing,
                BasicJobStatus::Completed,
            ],
            ad_groups: Vec::new(),
            criteria: Vec::new(),
            ads: Vec::new(),
            landscapes: Vec::new(),
        }
    }
}

impl SandboxState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_job_id(&mut self) -> i64 {
        let id = self.next_job_id;
        self.next_job_id += 1;
        id
    }

    pub fn next_entity_id(&mut self) -> i64 {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        id
    }

    /// Server-side request id for a response header
    pub fn next_server_request_id(&mut self) -> String {
        let id = self.next_server_request;
        self.next_server_request += 1;
        format!("sbx-{:06}", id)
    }

    /// Start the job's progression once its last part has arrived
    pub fn start_progression(&mut self, job_id: i64) {
        let progression = self
            .job_progressions
            .remove(&job_id)
            .unwrap_or_else(|| self.default_progression.clone());
        if let Some(job) = self.jobs.get_mut(&job_id) {
            job.progression = progression.into();
        }
    }

    /// Advance the job by one status poll.
    ///
    /// Reaching COMPLETED applies every part's operations and stores the
    /// per-part results.
    pub fn advance_job(&mut self, job_id: i64) {
        let next = match self.jobs.get_mut(&job_id) {
            Some(job) if job.all_parts_received() => job.progression.pop_front(),
            _ => None,
        };
        let Some(next) = next else {
            return;
        };

        let parts = match self.jobs.get_mut(&job_id) {
            Some(job) => {
                job.transition(next);
                if next != BasicJobStatus::Completed {
                    return;
                }
                job.parts.clone()
            }
            None => return,
        };

        let results: BTreeMap<u32, BulkMutateResult> = parts
            .into_iter()
            .map(|(index, part)| (index, self.process_part(&part)))
            .collect();

        if let Some(job) = self.jobs.get_mut(&job_id) {
            job.results = results;
        }
    }

    fn process_part(&mut self, part: &BulkMutateRequest) -> BulkMutateResult {
        let operation_stream_results = part
            .operation_streams
            .iter()
            .map(|stream| OperationStreamResult {
                operation_results: stream
                    .operations
                    .iter()
                    .map(|op| match self.apply_operand(op) {
                        Ok(value) => OperationResult::ReturnValue { value },
                        Err(error) => OperationResult::Failure { error },
                    })
                    .collect(),
            })
            .collect();

        BulkMutateResult {
            part_index: part.part_index,
            operation_stream_results,
        }
    }

    /// Apply one bulk operation
    pub fn apply_operand(&mut self, op: &Operation<Operand>) -> Result<Operand, ApiError> {
        match &op.operand {
            Operand::AdGroup(group) => self
                .apply_ad_group(op.operator, group.clone())
                .map(Operand::AdGroup),
            Operand::AdGroupCriterion(criterion) => self
                .apply_criterion(op.operator, criterion.clone())
                .map(Operand::AdGroupCriterion),
            Operand::AdGroupAd(ad) => self.apply_ad(op.operator, ad.clone()).map(Operand::AdGroupAd),
        }
    }

    pub fn apply_ad_group(&mut self, operator: Operator, mut group: AdGroup) -> Result<AdGroup, ApiError> {
        match operator {
            Operator::Add => {
                if group.id.is_some() {
                    return Err(ApiError::invalid_request("id must not be set on ADD").at("operand.id"));
                }
                group.id = Some(self.next_entity_id());
                self.ad_groups.push(group.clone());
                Ok(group)
            }
            Operator::Set => {
                let id = group
                    .id
                    .ok_or_else(|| ApiError::invalid_request("id is required on SET").at("operand.id"))?;
                let existing = self
                    .ad_groups
                    .iter_mut()
                    .find(|g| g.id == Some(id))
                    .ok_or_else(|| ad_group_not_found(id))?;
                *existing = group.clone();
                Ok(group)
            }
            Operator::Remove => Err(ApiError::invalid_request(
                "ad groups are removed with SET status DELETED",
            )
            .at("operator")),
        }
    }

    pub fn apply_criterion(
        &mut self,
        operator: Operator,
        mut criterion: AdGroupCriterion,
    ) -> Result<AdGroupCriterion, ApiError> {
        if !self.has_ad_group(criterion.ad_group_id) {
            return Err(ad_group_not_found(criterion.ad_group_id));
        }

        match operator {
            Operator::Add => {
                criterion.criterion_id = Some(self.next_entity_id());
                self.criteria.push(criterion.clone());
                Ok(criterion)
            }
            Operator::Set | Operator::Remove => {
                let criterion_id = criterion.criterion_id.ok_or_else(|| {
                    ApiError::invalid_request("criterionId is required").at("operand.criterionId")
                })?;
                let position = self
                    .criteria
                    .iter()
                    .position(|c| {
                        c.ad_group_id == criterion.ad_group_id && c.criterion_id == Some(criterion_id)
                    })
                    .ok_or_else(|| {
                        ApiError::new(
                            ErrorCode::EntityNotFound,
                            format!("criterion {} not found", criterion_id),
                        )
                        .with_trigger(criterion_id)
                    })?;

                if operator == Operator::Remove {
                    Ok(self.criteria.remove(position))
                } else {
                    self.criteria[position] = criterion.clone();
                    Ok(criterion)
                }
            }
        }
    }

    pub fn apply_ad(&mut self, operator: Operator, ad: AdGroupAd) -> Result<AdGroupAd, ApiError> {
        if !self.has_ad_group(ad.ad_group_id) {
            return Err(ad_group_not_found(ad.ad_group_id));
        }

        match operator {
            Operator::Add => {
                self.ads.push(ad.clone());
                Ok(ad)
            }
            Operator::Remove => {
                let position = self
                    .ads
                    .iter()
                    .position(|a| *a == ad)
                    .ok_or_else(|| ApiError::new(ErrorCode::EntityNotFound, "ad not found"))?;
                Ok(self.ads.remove(position))
            }
            Operator::Set => Err(ApiError::invalid_request("text ads are immutable").at("operator")),
        }
    }

    pub fn has_ad_group(&self, id: i64) -> bool {
        self.ad_groups.iter().any(|g| g.id == Some(id))
    }
}

fn ad_group_not_found(id: i64) -> ApiError {
    ApiError::new(ErrorCode::EntityNotFound, format!("ad group {} not found", id)).with_trigger(id)
}
