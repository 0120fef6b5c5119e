//! Service-specific data objects.

pub mod bulk_mutate;
pub mod data;
pub mod entities;
pub mod selector;

pub use bulk_mutate::{
    BasicJobStatus, BulkMutateJob, BulkMutateJobSelector, BulkMutateRequest, BulkMutateResult,
    JobOperation, OperationResult, OperationStream, OperationStreamResult,
};
pub use data::{BidLandscapePoint, CriterionBidLandscape};
pub use entities::{
    AdGroup, AdGroupAd, AdGroupBids, AdGroupCriterion, AdGroupStatus, Criterion, EntityId,
    EntityIdType, Keyword, KeywordMatchType, ListReturnValue, Money, Operand, Operation, Operator,
    Page, Placement, TextAd,
};
pub use selector::{OrderBy, Paging, Predicate, PredicateOperator, Selector, SelectorBuilder, SortOrder};

use serde::{Deserialize, Serialize};

/// Arguments of a list-style `get` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetArgs<S> {
    pub selector: S,
}

/// Arguments of a standard `mutate` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutateArgs<T> {
    pub operations: Vec<Operation<T>>,
}

/// Arguments of `BulkMutateJobService.mutate`, which takes a single operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMutateArgs {
    pub operation: JobOperation,
}

/// Known service names.
pub mod services {
    pub const BULK_MUTATE_JOB_SERVICE: &str = "BulkMutateJobService";
    pub const DATA_SERVICE: &str = "DataService";
    pub const AD_GROUP_SERVICE: &str = "AdGroupService";
    pub const AD_GROUP_CRITERION_SERVICE: &str = "AdGroupCriterionService";
}

/// Known method names.
pub mod methods {
    pub const GET: &str = "get";
    pub const MUTATE: &str = "mutate";
    pub const GET_CRITERION_BID_LANDSCAPE: &str = "getCriterionBidLandscape";
}
