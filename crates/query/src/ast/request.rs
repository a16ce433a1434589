//! Query requests: filters, sort criteria and pagination.

use super::filter::FilterExpression;
use flowdex_core::Result;
use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// One key of a lexicographic multi-key sort.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortCriterion {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortCriterion {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }
}

/// A declarative query against one cache.
///
/// Top-level `filters` are AND-combined; an empty list matches every
/// entry. The first sort criterion is the most significant. `offset`
/// defaults to 0 and `limit` to unlimited.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryRequest {
    pub filters: Vec<FilterExpression>,
    pub sorts: Vec<SortCriterion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

impl QueryRequest {
    /// Creates an empty request (match all, natural order, no paging).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a request with the given top-level filters.
    pub fn filtered(filters: Vec<FilterExpression>) -> Self {
        Self {
            filters,
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, filter: FilterExpression) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_sort(mut self, sort: SortCriterion) -> Self {
        self.sorts.push(sort);
        self
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Checks the structure of every filter tree.
    pub fn validate(&self) -> Result<()> {
        self.filters.iter().try_for_each(FilterExpression::validate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder::{equal_to, is_null};

    #[test]
    fn test_request_builder() {
        let req = QueryRequest::new()
            .with_filter(equal_to("status", "EXPECTED"))
            .with_filter(is_null("rootProcessInstanceId"))
            .with_sort(SortCriterion::desc("priority"))
            .with_offset(1)
            .with_limit(1);
        assert_eq!(req.filters.len(), 2);
        assert_eq!(req.sorts[0].direction, SortDirection::Desc);
        assert_eq!(req.offset, Some(1));
        assert_eq!(req.limit, Some(1));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_default_request() {
        let req = QueryRequest::default();
        assert!(req.filters.is_empty());
        assert!(req.sorts.is_empty());
        assert_eq!(req.offset, None);
        assert_eq!(req.limit, None);
    }
}
