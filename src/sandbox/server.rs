//! In-process simulation of the remote API
//!
//! Routes request envelopes by service and method, validates them the way
//! the live API does and keeps all state in memory. Clones share state, so a
//! test can keep one handle for setup and assertions while the transport
//! owns another.

use std::cmp::Ordering;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use adwords_protocol::ops::data::fields as landscape_fields;
use adwords_protocol::ops::{
    methods, services, AdGroup, AdGroupBids, AdGroupCriterion, AdGroupStatus, BasicJobStatus,
    BidLandscapePoint, BulkMutateJobSelector, BulkMutateRequest, Criterion, CriterionBidLandscape,
    EntityId, GetArgs, JobMutateArgs, JobOperation, Keyword, KeywordMatchType, ListReturnValue,
    Money, MutateArgs, Operator, Page, Placement, Selector, SortOrder,
};
use adwords_protocol::{ApiError, ApiRequest, ApiResponse, ErrorCode, ResponseHeader};
use chrono::{Days, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::failure::{FailureConfig, FailureInjector};
use super::state::{SandboxJob, SandboxState};
use crate::service::{find_service, TransportError};

/// One request seen by the sandbox
#[derive(Debug, Clone)]
pub struct CallRecord {
    /// `Service.method`
    pub method_key: String,
    pub endpoint: String,
    pub request_id: String,
    pub at: Instant,
}

/// Ids of the entities created by [`SandboxServer::seed_demo`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoSeed {
    pub campaign_id: i64,
    pub ad_group_id: i64,
    pub criterion_id: i64,
}

/// Successful handler output
struct Handled {
    payload: Value,
    operations: i64,
}

/// Simulated remote API
#[derive(Clone, Default)]
pub struct SandboxServer {
    state: Arc<Mutex<SandboxState>>,
    failures: Arc<Mutex<FailureInjector>>,
    calls: Arc<Mutex<Vec<CallRecord>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SandboxServer {
    pub fn new() -> Self {
        Self::default()
    }

    // === Test configuration ===

    pub fn inject_failure(&self, method_key: &str, config: FailureConfig) {
        lock(&self.failures).inject(method_key, config);
    }

    pub fn inject_error(&self, method_key: &str, code: ErrorCode, message: &str) {
        self.inject_failure(method_key, FailureConfig::error(code, message));
    }

    pub fn clear_failures(&self) {
        lock(&self.failures).clear();
    }

    /// Statuses every job goes through after its last part arrives
    pub fn set_default_progression(&self, statuses: Vec<BasicJobStatus>) {
        lock(&self.state).default_progression = statuses;
    }

    /// Override the progression of one job.
    ///
    /// Takes effect when the job's last part arrives; an empty progression
    /// keeps the job PENDING.
    pub fn set_job_progression(&self, job_id: i64, statuses: Vec<BasicJobStatus>) {
        let mut state = lock(&self.state);
        let started = state
            .jobs
            .get(&job_id)
            .is_some_and(SandboxJob::all_parts_received);
        if started {
            if let Some(job) = state.jobs.get_mut(&job_id) {
                job.progression = statuses.into();
            }
        } else {
            state.job_progressions.insert(job_id, statuses);
        }
    }

    /// Add an ad group, assigning an id when unset
    pub fn seed_ad_group(&self, mut group: AdGroup) -> i64 {
        let mut state = lock(&self.state);
        let id = match group.id {
            Some(id) => id,
            None => state.next_entity_id(),
        };
        group.id = Some(id);
        state.ad_groups.push(group);
        id
    }

    /// Add a criterion, assigning an id when unset
    pub fn seed_criterion(&self, mut criterion: AdGroupCriterion) -> i64 {
        let mut state = lock(&self.state);
        let id = match criterion.criterion_id {
            Some(id) => id,
            None => state.next_entity_id(),
        };
        criterion.criterion_id = Some(id);
        state.criteria.push(criterion);
        id
    }

    pub fn seed_landscape(&self, landscape: CriterionBidLandscape) {
        lock(&self.state).landscapes.push(landscape);
    }

    /// Seed a small account: one campaign with three ad groups, two
    /// criteria and a twelve-point bid landscape for the first keyword.
    pub fn seed_demo(&self) -> DemoSeed {
        let campaign_id = 100;
        let groups = [
            ("Mars Cruise", AdGroupStatus::Enabled),
            ("Venus Flyby", AdGroupStatus::Paused),
            ("Jupiter Tours", AdGroupStatus::Enabled),
        ];

        let group_ids: Vec<i64> = groups
            .iter()
            .map(|(name, status)| {
                self.seed_ad_group(AdGroup {
                    id: None,
                    campaign_id,
                    name: name.to_string(),
                    status: *status,
                    bids: AdGroupBids {
                        keyword_max_cpc: Some(Money::from_micros(1_000_000)),
                        site_max_cpc: None,
                    },
                })
            })
            .collect();
        let ad_group_id = group_ids[0];

        let criterion_id = self.seed_criterion(AdGroupCriterion {
            ad_group_id,
            criterion_id: None,
            criterion: Criterion::Keyword(Keyword {
                text: "mars cruise".to_string(),
                match_type: KeywordMatchType::Broad,
            }),
            max_cpc: Some(Money::from_micros(1_500_000)),
        });
        self.seed_criterion(AdGroupCriterion {
            ad_group_id,
            criterion_id: None,
            criterion: Criterion::Placement(Placement {
                url: "www.example.com".to_string(),
            }),
            max_cpc: None,
        });

        let today = Utc::now().date_naive();
        let landscape_points = (1..=12)
            .map(|step: i64| BidLandscapePoint {
                bid: Money::from_micros(step * 500_000),
                clicks: step * 7,
                cost: Money::from_micros(step * step * 350_000),
                impressions: step * 120,
            })
            .collect();
        self.seed_landscape(CriterionBidLandscape {
            ad_group_id,
            criterion_id,
            start_date: (today - Days::new(7)).format("%Y%m%d").to_string(),
            end_date: today.format("%Y%m%d").to_string(),
            landscape_points,
        });

        DemoSeed {
            campaign_id,
            ad_group_id,
            criterion_id,
        }
    }

    // === Assertions ===

    pub fn job_status(&self, job_id: i64) -> Option<BasicJobStatus> {
        lock(&self.state).jobs.get(&job_id).map(|job| job.status)
    }

    pub fn job_parts_received(&self, job_id: i64) -> Option<u32> {
        lock(&self.state)
            .jobs
            .get(&job_id)
            .map(|job| job.parts.len() as u32)
    }

    pub fn ad_groups(&self) -> Vec<AdGroup> {
        lock(&self.state).ad_groups.clone()
    }

    pub fn criteria(&self) -> Vec<AdGroupCriterion> {
        lock(&self.state).criteria.clone()
    }

    pub fn calls(&self) -> Vec<CallRecord> {
        lock(&self.calls).clone()
    }

    pub fn calls_to(&self, method_key: &str) -> Vec<CallRecord> {
        lock(&self.calls)
            .iter()
            .filter(|call| call.method_key == method_key)
            .cloned()
            .collect()
    }

    pub fn call_count(&self, method_key: &str) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|call| call.method_key == method_key)
            .count()
    }

    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    // === Request handling ===

    /// Handle one request envelope addressed to `endpoint`
    pub fn handle_request(&self, endpoint: &str, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let started = Instant::now();
        let method_key = request.method_key();

        lock(&self.calls).push(CallRecord {
            method_key: method_key.clone(),
            endpoint: endpoint.to_string(),
            request_id: request.request_id.clone(),
            at: started,
        });

        let failure = lock(&self.failures).check(&method_key).cloned();
        if let Some(failure) = failure {
            if let Some(delay) = failure.delay {
                thread::sleep(delay);
            }
            if failure.drop_connection {
                debug!(method = %method_key, "sandbox dropping connection");
                return Err(TransportError::ConnectionDropped);
            }
            if let Some(code) = failure.error_code {
                let message = failure
                    .error_message
                    .unwrap_or_else(|| "Injected failure".to_string());
                return Ok(ApiResponse::error(
                    request.request_id.clone(),
                    Some(self.response_header(0, started)),
                    ApiError::new(code, message),
                ));
            }
        }

        let response = match self.dispatch(endpoint, request) {
            Ok(handled) => ApiResponse::success(
                request.request_id.clone(),
                self.response_header(handled.operations, started),
                handled.payload,
            ),
            Err(error) => {
                debug!(method = %method_key, code = %error.code, "sandbox rejected request");
                ApiResponse::error(
                    request.request_id.clone(),
                    Some(self.response_header(0, started)),
                    error,
                )
            }
        };
        Ok(response)
    }

    fn response_header(&self, operations: i64, started: Instant) -> ResponseHeader {
        let elapsed = started.elapsed().min(Duration::from_secs(3600));
        ResponseHeader {
            request_id: lock(&self.state).next_server_request_id(),
            operations: Some(operations),
            response_time: Some(elapsed.as_millis() as i64),
            units: Some(operations.max(1)),
        }
    }

    fn dispatch(&self, endpoint: &str, request: &ApiRequest) -> Result<Handled, ApiError> {
        if request.header.developer_token.trim().is_empty() {
            return Err(
                ApiError::new(ErrorCode::AuthenticationError, "developer token is required")
                    .at("header.developerToken"),
            );
        }

        let signature = find_service(&request.service).ok_or_else(|| {
            ApiError::new(
                ErrorCode::UnknownService,
                format!("unknown service '{}'", request.service),
            )
        })?;
        if !endpoint.ends_with(&format!("/api/adwords/{}", signature)) {
            return Err(ApiError::new(
                ErrorCode::UnknownService,
                format!("{} is not served at {}", signature.name, endpoint),
            ));
        }

        match (signature.name, request.method.as_str()) {
            (services::BULK_MUTATE_JOB_SERVICE, methods::MUTATE) => {
                self.handle_job_mutate(decode(request)?)
            }
            (services::BULK_MUTATE_JOB_SERVICE, methods::GET) => self.handle_job_get(decode(request)?),
            (services::DATA_SERVICE, methods::GET_CRITERION_BID_LANDSCAPE) => {
                self.handle_bid_landscape(decode(request)?)
            }
            (services::AD_GROUP_SERVICE, methods::GET) => self.handle_ad_group_get(decode(request)?),
            (services::AD_GROUP_SERVICE, methods::MUTATE) => {
                self.handle_ad_group_mutate(request, decode(request)?)
            }
            (services::AD_GROUP_CRITERION_SERVICE, methods::GET) => {
                self.handle_criterion_get(decode(request)?)
            }
            (services::AD_GROUP_CRITERION_SERVICE, methods::MUTATE) => {
                self.handle_criterion_mutate(request, decode(request)?)
            }
            (service, method) => Err(ApiError::unknown_method(service, method)),
        }
    }

    // === BulkMutateJobService ===

    fn handle_job_mutate(&self, args: JobMutateArgs) -> Result<Handled, ApiError> {
        let JobOperation { operator, operand } = args.operation;
        let mut state = lock(&self.state);

        let job_id = match operator {
            Operator::Add => {
                if operand.id.is_some() {
                    return Err(ApiError::invalid_request("id must not be set when creating a job")
                        .at("operand.id"));
                }
                if operand.num_request_parts < 1 {
                    return Err(ApiError::new(
                        ErrorCode::InvalidNumRequestParts,
                        "numRequestParts must be at least 1",
                    )
                    .at("operand.numRequestParts")
                    .with_trigger(operand.num_request_parts));
                }
                let part = required_part(&operand.request)?;
                if part.part_index >= operand.num_request_parts {
                    return Err(ApiError::part_index_out_of_range(
                        part.part_index,
                        operand.num_request_parts,
                    ));
                }
                let scope = part_scope(part)?;

                let id = state.next_job_id();
                state
                    .jobs
                    .insert(id, SandboxJob::new(id, operand.num_request_parts, scope));
                id
            }
            Operator::Set => {
                let id = operand
                    .id
                    .ok_or_else(|| ApiError::invalid_request("id is required").at("operand.id"))?;
                let job = state.jobs.get(&id).ok_or_else(|| ApiError::job_not_found(id))?;
                if job.all_parts_received() {
                    return Err(ApiError::new(
                        ErrorCode::AllPartsReceived,
                        format!("job {} already received all {} parts", id, job.num_request_parts),
                    )
                    .with_trigger(id));
                }
                let part = required_part(&operand.request)?;
                if part.part_index >= job.num_request_parts {
                    return Err(ApiError::part_index_out_of_range(
                        part.part_index,
                        job.num_request_parts,
                    ));
                }
                if job.parts.contains_key(&part.part_index) {
                    return Err(ApiError::duplicate_part_index(id, part.part_index));
                }
                if part_scope(part)? != job.scope {
                    return Err(ApiError::new(
                        ErrorCode::ScopeMismatch,
                        format!("part scope differs from the scope job {} was created with", id),
                    )
                    .at("operand.request.operationStreams.scopingEntityId"));
                }
                id
            }
            Operator::Remove => {
                return Err(ApiError::invalid_request("jobs cannot be removed").at("operator"));
            }
        };

        let part = operand.request.ok_or_else(|| ApiError::invalid_request("request is required"))?;
        let operations = part.operation_count() as i64;

        let all_received = match state.jobs.get_mut(&job_id) {
            Some(job) => {
                job.parts.insert(part.part_index, part);
                job.all_parts_received()
            }
            None => return Err(ApiError::job_not_found(job_id)),
        };
        if all_received {
            state.start_progression(job_id);
        }

        let wire = state
            .jobs
            .get(&job_id)
            .map(|job| job.to_wire(None))
            .ok_or_else(|| ApiError::job_not_found(job_id))?;
        Ok(Handled {
            payload: encode(&wire)?,
            operations,
        })
    }

    fn handle_job_get(&self, args: GetArgs<BulkMutateJobSelector>) -> Result<Handled, ApiError> {
        let selector = args.selector;
        if selector.job_ids.is_empty() {
            return Err(ApiError::invalid_request("at least one job id is required")
                .at("selector.jobIds"));
        }

        let mut state = lock(&self.state);
        let mut jobs = Vec::with_capacity(selector.job_ids.len());

        for &id in &selector.job_ids {
            if selector.result_part_index.is_none() {
                state.advance_job(id);
            }
            let job = state.jobs.get(&id).ok_or_else(|| ApiError::job_not_found(id))?;

            let result = match selector.result_part_index {
                None => None,
                Some(part) => {
                    if job.status != BasicJobStatus::Completed {
                        return Err(ApiError::new(
                            ErrorCode::ResultsNotReady,
                            format!("job {} is {}", id, job.status.as_str()),
                        )
                        .with_trigger(id));
                    }
                    if part >= job.num_request_parts {
                        return Err(ApiError::part_index_out_of_range(part, job.num_request_parts)
                            .at("selector.resultPartIndex"));
                    }
                    job.results.get(&part).cloned()
                }
            };
            jobs.push(job.to_wire(result));
        }

        Ok(Handled {
            payload: encode(&jobs)?,
            operations: jobs.len() as i64,
        })
    }

    // === DataService ===

    fn handle_bid_landscape(&self, args: GetArgs<Selector>) -> Result<Handled, ApiError> {
        let selector = args.selector;
        check_fields(
            &selector,
            &[landscape_fields::AD_GROUP_ID, landscape_fields::CRITERION_ID],
        )?;

        let state = lock(&self.state);
        let start = selector.paging.start_index as usize;
        let end = start.saturating_add(selector.paging.number_results as usize);

        // Pages are windows over the flattened points of matching landscapes
        let mut entries: Vec<CriterionBidLandscape> = Vec::new();
        let mut index = 0usize;
        for landscape in state.landscapes.iter().filter(|l| {
            selector
                .predicates
                .iter()
                .all(|p| p.matches(&landscape_field(l, &p.field)))
        }) {
            for point in &landscape.landscape_points {
                if (start..end).contains(&index) {
                    match entries.last_mut() {
                        Some(last)
                            if last.ad_group_id == landscape.ad_group_id
                                && last.criterion_id == landscape.criterion_id =>
                        {
                            last.landscape_points.push(*point);
                        }
                        _ => entries.push(CriterionBidLandscape {
                            ad_group_id: landscape.ad_group_id,
                            criterion_id: landscape.criterion_id,
                            start_date: landscape.start_date.clone(),
                            end_date: landscape.end_date.clone(),
                            landscape_points: vec![*point],
                        }),
                    }
                }
                index += 1;
            }
        }

        let page = Page {
            total_num_entries: index as u32,
            entries,
        };
        Ok(Handled {
            payload: encode(&page)?,
            operations: page.entries.len() as i64,
        })
    }

    // === AdGroupService / AdGroupCriterionService ===

    fn handle_ad_group_get(&self, args: GetArgs<Selector>) -> Result<Handled, ApiError> {
        let state = lock(&self.state);
        let page = select_page(&state.ad_groups, &args.selector, AD_GROUP_FIELDS, ad_group_field)?;
        Ok(Handled {
            operations: page.entries.len() as i64,
            payload: encode(&page)?,
        })
    }

    fn handle_criterion_get(&self, args: GetArgs<Selector>) -> Result<Handled, ApiError> {
        let state = lock(&self.state);
        let page = select_page(&state.criteria, &args.selector, CRITERION_FIELDS, criterion_field)?;
        Ok(Handled {
            operations: page.entries.len() as i64,
            payload: encode(&page)?,
        })
    }

    fn handle_ad_group_mutate(&self, request: &ApiRequest, args: MutateArgs<AdGroup>) -> Result<Handled, ApiError> {
        self.mutate_atomically(request, args, SandboxState::apply_ad_group)
    }

    fn handle_criterion_mutate(
        &self,
        request: &ApiRequest,
        args: MutateArgs<AdGroupCriterion>,
    ) -> Result<Handled, ApiError> {
        self.mutate_atomically(request, args, SandboxState::apply_criterion)
    }

    /// Apply all operations or none; `validateOnly` never commits.
    fn mutate_atomically<T: Serialize>(
        &self,
        request: &ApiRequest,
        args: MutateArgs<T>,
        apply: fn(&mut SandboxState, Operator, T) -> Result<T, ApiError>,
    ) -> Result<Handled, ApiError> {
        if args.operations.is_empty() {
            return Err(ApiError::invalid_request("at least one operation is required").at("operations"));
        }

        let mut state = lock(&self.state);
        let mut scratch = state.clone();

        let value = args
            .operations
            .into_iter()
            .enumerate()
            .map(|(i, op)| apply(&mut scratch, op.operator, op.operand).map_err(|e| at_operation(i, e)))
            .collect::<Result<Vec<T>, ApiError>>()?;

        if !request.header.validate_only {
            *state = scratch;
        }

        let operations = value.len() as i64;
        Ok(Handled {
            payload: encode(&ListReturnValue { value })?,
            operations,
        })
    }
}

const AD_GROUP_FIELDS: &[&str] = &["Id", "CampaignId", "Name", "Status"];

const CRITERION_FIELDS: &[&str] = &["AdGroupId", "CriterionId", "Text", "MatchType"];

fn ad_group_field(group: &AdGroup, field: &str) -> String {
    match field {
        "Id" => group.id.map(|id| id.to_string()).unwrap_or_default(),
        "CampaignId" => group.campaign_id.to_string(),
        "Name" => group.name.clone(),
        "Status" => group.status.as_str().to_string(),
        _ => String::new(),
    }
}

fn criterion_field(criterion: &AdGroupCriterion, field: &str) -> String {
    match (field, &criterion.criterion) {
        ("AdGroupId", _) => criterion.ad_group_id.to_string(),
        ("CriterionId", _) => criterion.criterion_id.map(|id| id.to_string()).unwrap_or_default(),
        ("Text", Criterion::Keyword(keyword)) => keyword.text.clone(),
        ("Text", Criterion::Placement(placement)) => placement.url.clone(),
        ("MatchType", Criterion::Keyword(keyword)) => match keyword.match_type {
            KeywordMatchType::Exact => "EXACT",
            KeywordMatchType::Phrase => "PHRASE",
            KeywordMatchType::Broad => "BROAD",
        }
        .to_string(),
        _ => String::new(),
    }
}

fn landscape_field(landscape: &CriterionBidLandscape, field: &str) -> String {
    match field {
        landscape_fields::AD_GROUP_ID => landscape.ad_group_id.to_string(),
        landscape_fields::CRITERION_ID => landscape.criterion_id.to_string(),
        _ => String::new(),
    }
}

/// Reject predicates and orderings on fields the service does not filter on
fn check_fields(selector: &Selector, known: &[&str]) -> Result<(), ApiError> {
    let predicate_fields = selector.predicates.iter().map(|p| &p.field);
    let order_fields = selector.ordering.iter().map(|o| &o.field);

    match predicate_fields.chain(order_fields).find(|f| !known.contains(&f.as_str())) {
        Some(field) => Err(ApiError::invalid_request(format!("field '{}' is not selectable", field))
            .at("selector")
            .with_trigger(field)),
        None => Ok(()),
    }
}

/// Filter, order and window `items` per `selector`
fn select_page<T: Clone>(
    items: &[T],
    selector: &Selector,
    known: &[&str],
    value_of: fn(&T, &str) -> String,
) -> Result<Page<T>, ApiError> {
    check_fields(selector, known)?;

    let mut matching: Vec<&T> = items
        .iter()
        .filter(|item| {
            selector
                .predicates
                .iter()
                .all(|p| p.matches(&value_of(item, &p.field)))
        })
        .collect();

    // Stable sorts applied last key first
    for order in selector.ordering.iter().rev() {
        matching.sort_by(|a, b| {
            let ordering = compare_values(&value_of(a, &order.field), &value_of(b, &order.field));
            match order.sort_order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        });
    }

    let total = matching.len();
    let entries = matching
        .into_iter()
        .skip(selector.paging.start_index as usize)
        .take(selector.paging.number_results as usize)
        .cloned()
        .collect();

    Ok(Page {
        total_num_entries: total as u32,
        entries,
    })
}

fn compare_values(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

fn required_part(request: &Option<BulkMutateRequest>) -> Result<&BulkMutateRequest, ApiError> {
    request
        .as_ref()
        .ok_or_else(|| ApiError::invalid_request("request part is required").at("operand.request"))
}

/// The single scoping entity shared by every stream of a part
fn part_scope(part: &BulkMutateRequest) -> Result<EntityId, ApiError> {
    let mut scope: Option<EntityId> = None;
    for (i, stream) in part.operation_streams.iter().enumerate() {
        let stream_scope = stream.scoping_entity_id.ok_or_else(|| {
            ApiError::new(
                ErrorCode::MissingScopingEntity,
                "operation stream has no scoping entity",
            )
            .at(format!("operand.request.operationStreams[{}].scopingEntityId", i))
        })?;
        match scope {
            None => scope = Some(stream_scope),
            Some(first) if first != stream_scope => {
                return Err(ApiError::new(
                    ErrorCode::ScopeMismatch,
                    "operation streams of one part must share a scoping entity",
                )
                .at(format!("operand.request.operationStreams[{}].scopingEntityId", i)));
            }
            Some(_) => {}
        }
    }
    scope.ok_or_else(|| {
        ApiError::invalid_request("request has no operation streams")
            .at("operand.request.operationStreams")
    })
}

fn at_operation(index: usize, error: ApiError) -> ApiError {
    let path = match &error.field_path {
        Some(path) => format!("operations[{}].{}", index, path),
        None => format!("operations[{}]", index),
    };
    error.at(path)
}

fn decode<T: DeserializeOwned>(request: &ApiRequest) -> Result<T, ApiError> {
    serde_json::from_value(request.payload.clone()).map_err(|e| {
        ApiError::invalid_request(format!("malformed {} payload: {}", request.method_key(), e))
    })
}

fn encode<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::new(ErrorCode::InternalError, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use adwords_protocol::ops::{
        BulkMutateJob, Operand, Operation, OperationStream, Predicate,
    };
    use adwords_protocol::RequestHeader;
    use serde_json::json;

    const JOB_ENDPOINT: &str = "http://sandbox/api/adwords/job/v201008/BulkMutateJobService";

    fn request(service: &str, method: &str, payload: Value) -> ApiRequest {
        ApiRequest {
            service: service.to_string(),
            method: method.to_string(),
            request_id: "req-1".to_string(),
            header: RequestHeader {
                developer_token: "dev".to_string(),
                user_agent: "test".to_string(),
                ..Default::default()
            },
            payload,
        }
    }

    fn keyword_op(ad_group_id: i64) -> Operation<Operand> {
        Operation::add(Operand::AdGroupCriterion(AdGroupCriterion {
            ad_group_id,
            criterion_id: None,
            criterion: Criterion::Keyword(Keyword {
                text: "cruise".to_string(),
                match_type: KeywordMatchType::Exact,
            }),
            max_cpc: None,
        }))
    }

    fn job_op(operator: Operator, id: Option<i64>, parts: u32, part_index: u32, scope: Option<EntityId>) -> Value {
        let operand = BulkMutateJob {
            id,
            num_request_parts: parts,
            num_request_parts_received: 0,
            status: None,
            request: Some(BulkMutateRequest {
                part_index,
                operation_streams: vec![OperationStream {
                    scoping_entity_id: scope,
                    operations: vec![keyword_op(1000)],
                }],
            }),
            result: None,
        };
        json!({ "operation": JobOperation { operator, operand } })
    }

    fn mutate(server: &SandboxServer, payload: Value) -> ApiResponse {
        server
            .handle_request(JOB_ENDPOINT, &request("BulkMutateJobService", "mutate", payload))
            .unwrap()
    }

    fn error_code(response: &ApiResponse) -> Option<ErrorCode> {
        response.error.as_ref().map(|e| e.code)
    }

    #[test]
    fn test_missing_token_rejected() {
        let server = SandboxServer::new();
        let mut req = request("AdGroupService", "get", json!({"selector": {}}));
        req.header.developer_token.clear();

        let response = server
            .handle_request("http://sandbox/api/adwords/cm/v201101/AdGroupService", &req)
            .unwrap();
        assert_eq!(error_code(&response), Some(ErrorCode::AuthenticationError));
        assert_eq!(server.call_count("AdGroupService.get"), 1);
    }

    #[test]
    fn test_unknown_routes() {
        let server = SandboxServer::new();

        let response = server
            .handle_request("http://sandbox/api/adwords/cm/v201101/CampaignService", &request("CampaignService", "get", json!({})))
            .unwrap();
        assert_eq!(error_code(&response), Some(ErrorCode::UnknownService));

        let response = server
            .handle_request(JOB_ENDPOINT, &request("BulkMutateJobService", "query", json!({})))
            .unwrap();
        assert_eq!(error_code(&response), Some(ErrorCode::UnknownMethod));

        // Right service, wrong version
        let response = server
            .handle_request(
                "http://sandbox/api/adwords/job/v201101/BulkMutateJobService",
                &request("BulkMutateJobService", "get", json!({"selector": {"jobIds": [1]}})),
            )
            .unwrap();
        assert_eq!(error_code(&response), Some(ErrorCode::UnknownService));
    }

    #[test]
    fn test_job_part_validation() {
        let server = SandboxServer::new();
        let scope = Some(EntityId::ad_group(1000));

        let response = mutate(&server, job_op(Operator::Add, None, 0, 0, scope));
        assert_eq!(error_code(&response), Some(ErrorCode::InvalidNumRequestParts));

        let response = mutate(&server, job_op(Operator::Add, None, 2, 2, scope));
        assert_eq!(error_code(&response), Some(ErrorCode::PartIndexOutOfRange));

        let response = mutate(&server, job_op(Operator::Add, None, 2, 0, None));
        assert_eq!(error_code(&response), Some(ErrorCode::MissingScopingEntity));

        let response = mutate(&server, job_op(Operator::Set, Some(77), 2, 1, scope));
        assert_eq!(error_code(&response), Some(ErrorCode::JobNotFound));

        let created = mutate(&server, job_op(Operator::Add, None, 2, 0, scope));
        assert!(created.ok);
        let job: BulkMutateJob = serde_json::from_value(created.payload.unwrap()).unwrap();
        let id = job.id.unwrap();
        assert_eq!(job.status.as_deref(), Some("PENDING"));
        assert_eq!(job.num_request_parts_received, 1);

        let response = mutate(&server, job_op(Operator::Set, Some(id), 2, 0, scope));
        assert_eq!(error_code(&response), Some(ErrorCode::DuplicatePartIndex));

        let response = mutate(&server, job_op(Operator::Set, Some(id), 2, 1, Some(EntityId::campaign(5))));
        assert_eq!(error_code(&response), Some(ErrorCode::ScopeMismatch));

        let response = mutate(&server, job_op(Operator::Set, Some(id), 2, 1, scope));
        assert!(response.ok);
        assert_eq!(server.job_parts_received(id), Some(2));

        let response = mutate(&server, job_op(Operator::Set, Some(id), 2, 1, scope));
        assert_eq!(error_code(&response), Some(ErrorCode::AllPartsReceived));

        let response = mutate(&server, job_op(Operator::Remove, Some(id), 2, 1, scope));
        assert_eq!(error_code(&response), Some(ErrorCode::InvalidRequest));
    }

    #[test]
    fn test_job_progression_and_results() {
        let server = SandboxServer::new();
        let seed = server.seed_demo();
        server.set_default_progression(vec![BasicJobStatus::Processing, BasicJobStatus::Completed]);

        let created = mutate(
            &server,
            job_op(Operator::Add, None, 1, 0, Some(EntityId::ad_group(seed.ad_group_id))),
        );
        let id = serde_json::from_value::<BulkMutateJob>(created.payload.unwrap())
            .unwrap()
            .id
            .unwrap();

        let get = |part: Option<u32>| {
            let mut selector = json!({"jobIds": [id]});
            if let Some(part) = part {
                selector["resultPartIndex"] = json!(part);
            }
            server
                .handle_request(JOB_ENDPOINT, &request("BulkMutateJobService", "get", json!({"selector": selector})))
                .unwrap()
        };

        assert_eq!(error_code(&get(Some(0))), Some(ErrorCode::ResultsNotReady));
        assert_eq!(server.job_status(id), Some(BasicJobStatus::Pending));

        let first = get(None);
        assert_eq!(first.payload.unwrap()[0]["status"], "PROCESSING");
        let second = get(None);
        assert_eq!(second.payload.unwrap()[0]["status"], "COMPLETED");

        let with_result = get(Some(0));
        let jobs: Vec<BulkMutateJob> = serde_json::from_value(with_result.payload.unwrap()).unwrap();
        assert_eq!(jobs[0].result.as_ref().map(|r| r.succeeded_count()), Some(1));
        assert_eq!(server.criteria().len(), 3);
    }

    #[test]
    fn test_landscape_pages_over_points() {
        let server = SandboxServer::new();
        let seed = server.seed_demo();
        let selector = Selector::builder()
            .predicate(Predicate::equals("AdGroupId", seed.ad_group_id))
            .predicate(Predicate::equals("CriterionId", seed.criterion_id))
            .page_size(5)
            .build();

        let mut selector_value = serde_json::to_value(&selector).unwrap();
        selector_value["paging"]["startIndex"] = json!(10);
        let response = server
            .handle_request(
                "http://sandbox/api/adwords/cm/v201506/DataService",
                &request("DataService", "getCriterionBidLandscape", json!({"selector": selector_value})),
            )
            .unwrap();

        let page: Page<CriterionBidLandscape> = serde_json::from_value(response.payload.unwrap()).unwrap();
        assert_eq!(page.total_num_entries, 12);
        assert_eq!(page.entries.len(), 1);
        assert_eq!(page.entries[0].landscape_points.len(), 2);
    }

    #[test]
    fn test_ad_group_filter_order_and_validate_only() {
        let server = SandboxServer::new();
        let seed = server.seed_demo();
        let endpoint = "http://sandbox/api/adwords/cm/v201101/AdGroupService";

        let selector = Selector::builder()
            .predicate(Predicate::equals("CampaignId", seed.campaign_id))
            .predicate(Predicate::equals("Status", "ENABLED"))
            .order_by("Name", SortOrder::Descending)
            .build();
        let response = server
            .handle_request(endpoint, &request("AdGroupService", "get", json!({"selector": selector})))
            .unwrap();
        let page: Page<AdGroup> = serde_json::from_value(response.payload.unwrap()).unwrap();
        let names: Vec<&str> = page.entries.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Mars Cruise", "Jupiter Tours"]);

        let add = json!({"operations": [Operation::add(AdGroup {
            id: None,
            campaign_id: seed.campaign_id,
            name: "Saturn Rings".to_string(),
            status: AdGroupStatus::Enabled,
            bids: AdGroupBids::default(),
        })]});
        let mut dry_run = request("AdGroupService", "mutate", add.clone());
        dry_run.header.validate_only = true;
        assert!(server.handle_request(endpoint, &dry_run).unwrap().ok);
        assert_eq!(server.ad_groups().len(), 3);

        let response = server
            .handle_request(endpoint, &request("AdGroupService", "mutate", add))
            .unwrap();
        assert!(response.ok);
        assert_eq!(server.ad_groups().len(), 4);
        assert_eq!(response.header.unwrap().operations, Some(1));
    }

    #[test]
    fn test_unknown_selector_field_rejected() {
        let server = SandboxServer::new();
        let selector = Selector::builder().predicate(Predicate::equals("Budget", 1)).build();
        let response = server
            .handle_request(
                "http://sandbox/api/adwords/cm/v201101/AdGroupService",
                &request("AdGroupService", "get", json!({"selector": selector})),
            )
            .unwrap();
        assert_eq!(error_code(&response), Some(ErrorCode::InvalidRequest));
    }

    #[test]
    fn test_injected_failures() {
        let server = SandboxServer::new();
        server.inject_failure("BulkMutateJobService.get", FailureConfig::dropped().with_fail_count(1));
        let req = request("BulkMutateJobService", "get", json!({"selector": {"jobIds": [1]}}));

        let first = server.handle_request(JOB_ENDPOINT, &req);
        assert!(matches!(first, Err(TransportError::ConnectionDropped)));

        let second = server.handle_request(JOB_ENDPOINT, &req).unwrap();
        assert_eq!(error_code(&second), Some(ErrorCode::JobNotFound));

        server.inject_error("BulkMutateJobService.get", ErrorCode::RateExceeded, "slow down");
        let third = server.handle_request(JOB_ENDPOINT, &req).unwrap();
        assert_eq!(error_code(&third), Some(ErrorCode::RateExceeded));
        assert_eq!(server.calls_to("BulkMutateJobService.get").len(), 3);
    }
}
