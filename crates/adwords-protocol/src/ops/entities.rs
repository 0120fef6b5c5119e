//! Campaign-management entities carried in mutate operations and list pages.

use serde::{Deserialize, Serialize};

/// Monetary amount in micros of the account currency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    pub micro_amount: i64,
}

impl Money {
    pub fn from_micros(micro_amount: i64) -> Self {
        Self { micro_amount }
    }
}

/// Mutate operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    Add,
    Set,
    Remove,
}

/// Kind of entity a scoping id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityIdType {
    CampaignId,
    AdGroupId,
}

/// Typed entity id, used to scope an operation stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityId {
    #[serde(rename = "type")]
    pub kind: EntityIdType,
    pub value: i64,
}

impl EntityId {
    pub fn campaign(value: i64) -> Self {
        Self {
            kind: EntityIdType::CampaignId,
            value,
        }
    }

    pub fn ad_group(value: i64) -> Self {
        Self {
            kind: EntityIdType::AdGroupId,
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAd {
    pub headline: String,
    pub description1: String,
    pub description2: String,
    pub display_url: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdGroupAd {
    pub ad_group_id: i64,
    pub ad: TextAd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeywordMatchType {
    Exact,
    Phrase,
    Broad,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyword {
    pub text: String,
    pub match_type: KeywordMatchType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub url: String,
}

/// Targeting criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "criterionType")]
pub enum Criterion {
    Keyword(Keyword),
    Placement(Placement),
}

/// Criterion attached to an ad group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdGroupCriterion {
    pub ad_group_id: i64,
    /// Assigned by the server on ADD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criterion_id: Option<i64>,
    pub criterion: Criterion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cpc: Option<Money>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdGroupStatus {
    Enabled,
    Paused,
    Deleted,
}

impl AdGroupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "ENABLED",
            Self::Paused => "PAUSED",
            Self::Deleted => "DELETED",
        }
    }
}

/// Manual CPC bids set on an ad group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdGroupBids {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword_max_cpc: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_max_cpc: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdGroup {
    /// Assigned by the server on ADD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub campaign_id: i64,
    pub name: String,
    pub status: AdGroupStatus,
    #[serde(default)]
    pub bids: AdGroupBids,
}

/// Operand of a mutate operation inside an operation stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operandType")]
pub enum Operand {
    AdGroup(AdGroup),
    AdGroupAd(AdGroupAd),
    AdGroupCriterion(AdGroupCriterion),
}

impl Operand {
    /// Ad group the operand belongs to, when known.
    pub fn ad_group_id(&self) -> Option<i64> {
        match self {
            Self::AdGroup(group) => group.id,
            Self::AdGroupAd(ad) => Some(ad.ad_group_id),
            Self::AdGroupCriterion(criterion) => Some(criterion.ad_group_id),
        }
    }
}

/// A single mutate operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation<T> {
    pub operator: Operator,
    pub operand: T,
}

impl<T> Operation<T> {
    pub fn add(operand: T) -> Self {
        Self {
            operator: Operator::Add,
            operand,
        }
    }

    pub fn set(operand: T) -> Self {
        Self {
            operator: Operator::Set,
            operand,
        }
    }

    pub fn remove(operand: T) -> Self {
        Self {
            operator: Operator::Remove,
            operand,
        }
    }
}

/// One page of a list-style `get` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Total number of entries matching the selector, across all pages.
    #[serde(default)]
    pub total_num_entries: u32,
    #[serde(default = "Vec::new")]
    pub entries: Vec<T>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            total_num_entries: 0,
            entries: Vec::new(),
        }
    }
}

/// Result of a standard `mutate` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReturnValue<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entity_id_wire_shape() {
        let value = serde_json::to_value(EntityId::campaign(42)).unwrap();
        assert_eq!(value, json!({"type": "CAMPAIGN_ID", "value": 42}));
    }

    #[test]
    fn test_operand_is_tagged() {
        let op = Operation::add(Operand::AdGroupCriterion(AdGroupCriterion {
            ad_group_id: 7,
            criterion_id: None,
            criterion: Criterion::Keyword(Keyword {
                text: "mars cruise".to_string(),
                match_type: KeywordMatchType::Broad,
            }),
            max_cpc: None,
        }));

        let value = serde_json::to_value(&op).unwrap();
        assert_eq!(value["operator"], "ADD");
        assert_eq!(value["operand"]["operandType"], "AdGroupCriterion");
        assert_eq!(value["operand"]["criterion"]["criterionType"], "Keyword");
        assert_eq!(value["operand"]["criterion"]["matchType"], "BROAD");

        let parsed: Operation<Operand> = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.operand.ad_group_id(), Some(7));
    }

    #[test]
    fn test_page_defaults_missing_fields() {
        let page: Page<AdGroup> = serde_json::from_value(json!({})).unwrap();
        assert_eq!(page.total_num_entries, 0);
        assert!(page.entries.is_empty());
    }
}
