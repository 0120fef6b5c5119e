//! DataService data objects: criterion bid landscapes.

use serde::{Deserialize, Serialize};

use super::entities::Money;

/// Selector field names understood by `getCriterionBidLandscape`.
pub mod fields {
    pub const AD_GROUP_ID: &str = "AdGroupId";
    pub const CRITERION_ID: &str = "CriterionId";
    pub const START_DATE: &str = "StartDate";
    pub const END_DATE: &str = "EndDate";
    pub const BID: &str = "Bid";
    pub const LOCAL_CLICKS: &str = "LocalClicks";
    pub const LOCAL_COST: &str = "LocalCost";
    pub const LOCAL_IMPRESSIONS: &str = "LocalImpressions";
}

/// Estimated performance at one bid amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidLandscapePoint {
    pub bid: Money,
    pub clicks: i64,
    pub cost: Money,
    pub impressions: i64,
}

/// Simulated bids for one criterion over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionBidLandscape {
    pub ad_group_id: i64,
    pub criterion_id: i64,
    /// `yyyyMMdd`.
    pub start_date: String,
    /// `yyyyMMdd`.
    pub end_date: String,
    #[serde(default)]
    pub landscape_points: Vec<BidLandscapePoint>,
}
