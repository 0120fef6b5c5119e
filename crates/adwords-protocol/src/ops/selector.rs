//! Generic selector types for list-style `get` calls.
//!
//! A selector names the fields to return, the predicates filtering the
//! result, the ordering, and the page window.

use serde::{Deserialize, Serialize};

use crate::DEFAULT_PAGE_SIZE;

/// Predicate operators understood by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PredicateOperator {
    Equals,
    NotEquals,
    In,
    NotIn,
    GreaterThan,
    GreaterThanEquals,
    LessThan,
    LessThanEquals,
    StartsWith,
    StartsWithIgnoreCase,
    Contains,
    ContainsIgnoreCase,
    DoesNotContain,
    DoesNotContainIgnoreCase,
}

/// A filter condition on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Predicate {
    pub field: String,
    pub operator: PredicateOperator,
    pub values: Vec<String>,
}

impl Predicate {
    pub fn new<V: ToString>(
        field: impl Into<String>,
        operator: PredicateOperator,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            values: values.into_iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn equals(field: impl Into<String>, value: impl ToString) -> Self {
        Self::new(field, PredicateOperator::Equals, [value])
    }

    pub fn not_equals(field: impl Into<String>, value: impl ToString) -> Self {
        Self::new(field, PredicateOperator::NotEquals, [value])
    }

    pub fn is_in<V: ToString>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self::new(field, PredicateOperator::In, values)
    }

    pub fn not_in<V: ToString>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self::new(field, PredicateOperator::NotIn, values)
    }

    pub fn contains(field: impl Into<String>, value: impl ToString) -> Self {
        Self::new(field, PredicateOperator::Contains, [value])
    }

    /// Evaluate the predicate against a field value.
    ///
    /// Numeric comparison is used when both sides parse as integers,
    /// lexical comparison otherwise.
    pub fn matches(&self, actual: &str) -> bool {
        let first = self.values.first().map(String::as_str).unwrap_or("");
        match self.operator {
            PredicateOperator::Equals => actual == first,
            PredicateOperator::NotEquals => actual != first,
            PredicateOperator::In => self.values.iter().any(|v| v == actual),
            PredicateOperator::NotIn => !self.values.iter().any(|v| v == actual),
            PredicateOperator::GreaterThan => compare(actual, first).is_gt(),
            PredicateOperator::GreaterThanEquals => compare(actual, first).is_ge(),
            PredicateOperator::LessThan => compare(actual, first).is_lt(),
            PredicateOperator::LessThanEquals => compare(actual, first).is_le(),
            PredicateOperator::StartsWith => actual.starts_with(first),
            PredicateOperator::StartsWithIgnoreCase => {
                actual.to_lowercase().starts_with(&first.to_lowercase())
            }
            PredicateOperator::Contains => actual.contains(first),
            PredicateOperator::ContainsIgnoreCase => {
                actual.to_lowercase().contains(&first.to_lowercase())
            }
            PredicateOperator::DoesNotContain => !actual.contains(first),
            PredicateOperator::DoesNotContainIgnoreCase => {
                !actual.to_lowercase().contains(&first.to_lowercase())
            }
        }
    }
}

fn compare(actual: &str, expected: &str) -> std::cmp::Ordering {
    match (actual.parse::<i64>(), expected.parse::<i64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => actual.cmp(expected),
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Ordering on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBy {
    pub field: String,
    pub sort_order: SortOrder,
}

/// Page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    /// Offset of the first result.
    pub start_index: u32,
    /// Maximum number of results to return.
    pub number_results: u32,
}

impl Paging {
    pub fn new(start_index: u32, number_results: u32) -> Self {
        Self {
            start_index,
            number_results,
        }
    }

    /// Move the window forward by `count` results.
    pub fn increase_offset_by(&mut self, count: u32) {
        self.start_index = self.start_index.saturating_add(count);
    }
}

impl Default for Paging {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

/// Selector for list-style calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selector {
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub predicates: Vec<Predicate>,
    #[serde(default)]
    pub ordering: Vec<OrderBy>,
    #[serde(default)]
    pub paging: Paging,
}

impl Selector {
    pub fn builder() -> SelectorBuilder {
        SelectorBuilder::default()
    }

    /// Find the first predicate on `field`.
    pub fn predicate(&self, field: &str) -> Option<&Predicate> {
        self.predicates.iter().find(|p| p.field == field)
    }
}

/// Builder for [`Selector`].
#[derive(Debug, Clone, Default)]
pub struct SelectorBuilder {
    selector: Selector,
}

impl SelectorBuilder {
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.selector.fields.push(field.into());
        self
    }

    pub fn fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.selector.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn predicate(mut self, predicate: Predicate) -> Self {
        self.selector.predicates.push(predicate);
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, sort_order: SortOrder) -> Self {
        self.selector.ordering.push(OrderBy {
            field: field.into(),
            sort_order,
        });
        self
    }

    pub fn paging(mut self, paging: Paging) -> Self {
        self.selector.paging = paging;
        self
    }

    pub fn page_size(mut self, number_results: u32) -> Self {
        self.selector.paging.number_results = number_results;
        self
    }

    pub fn build(self) -> Selector {
        self.selector
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_parts() {
        let selector = Selector::builder()
            .fields(["Id", "Name"])
            .predicate(Predicate::equals("CampaignId", 123))
            .order_by("Name", SortOrder::Ascending)
            .page_size(50)
            .build();

        assert_eq!(selector.fields, vec!["Id", "Name"]);
        assert_eq!(selector.predicates[0].values, vec!["123"]);
        assert_eq!(selector.paging, Paging::new(0, 50));
        assert_eq!(selector.predicate("CampaignId").unwrap().operator, PredicateOperator::Equals);
    }

    #[test]
    fn test_default_paging() {
        let paging = Paging::default();
        assert_eq!(paging.start_index, 0);
        assert_eq!(paging.number_results, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_increase_offset() {
        let mut paging = Paging::new(0, 3);
        paging.increase_offset_by(3);
        paging.increase_offset_by(1);
        assert_eq!(paging.start_index, 4);
    }

    #[test]
    fn test_predicate_matching() {
        assert!(Predicate::equals("Id", 5).matches("5"));
        assert!(!Predicate::equals("Id", 5).matches("6"));
        assert!(Predicate::is_in("Id", [1, 2, 3]).matches("2"));
        assert!(Predicate::not_in("Id", [1, 2, 3]).matches("4"));
        assert!(Predicate::new("Id", PredicateOperator::GreaterThan, [9]).matches("10"));
        assert!(Predicate::new("Name", PredicateOperator::StartsWithIgnoreCase, ["MARS"]).matches("mars cruise"));
        assert!(Predicate::contains("Name", "cruise").matches("mars cruise"));
    }

    #[test]
    fn test_selector_wire_names() {
        let selector = Selector::builder()
            .field("Id")
            .order_by("Id", SortOrder::Descending)
            .build();
        let value = serde_json::to_value(&selector).unwrap();
        assert_eq!(value["paging"]["startIndex"], 0);
        assert_eq!(value["paging"]["numberResults"], 500);
        assert_eq!(value["ordering"][0]["sortOrder"], "DESCENDING");
    }
}
