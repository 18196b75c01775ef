//! Pagination helpers for list endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default page size when the request does not name one.
pub const DEFAULT_PER_PAGE: u64 = 20;

/// Pagination metadata, serialized as `{total, page, perPage, pageCount}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Total number of items
    pub total: u64,
    /// Current page, 1-based
    pub page: u64,
    /// Items per page
    pub per_page: u64,
    /// Number of pages
    pub page_count: u64,
}

/// Builds pagination metadata. A zero `per_page` yields zero pages.
#[must_use]
pub fn paginate(total: u64, page: u64, per_page: u64) -> Pagination {
    let page_count = if per_page == 0 { 0 } else { total.div_ceil(per_page) };
    Pagination {
        total,
        page,
        per_page,
        page_count,
    }
}

impl Pagination {
    /// Renders the metadata as a JSON value, ready for `RequestContext::add_meta`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Page selection read from the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    /// Requested page, at least 1
    pub page: u64,
    /// Requested page size, at least 1
    pub per_page: u64,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageQuery {
    /// Reads `page` and `perPage` (or `per_page`) from a query map.
    ///
    /// Values that are missing, non-numeric or below 1 fall back to the defaults.
    #[must_use]
    pub fn from_query(query: &Map<String, Value>) -> Self {
        let defaults = Self::default();
        Self {
            page: read_positive(query.get("page")).unwrap_or(defaults.page),
            per_page: read_positive(query.get("perPage").or_else(|| query.get("per_page")))
                .unwrap_or(defaults.per_page),
        }
    }

    /// Number of items to skip.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }

    /// Builds the metadata for a result set of `total` items.
    #[must_use]
    pub fn paginate(&self, total: u64) -> Pagination {
        paginate(total, self.page, self.per_page)
    }
}

fn read_positive(value: Option<&Value>) -> Option<u64> {
    let n = match value? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    (n >= 1).then_some(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_paginate() {
        assert_eq!(
            paginate(45, 2, 20).to_value(),
            json!({"total": 45, "page": 2, "perPage": 20, "pageCount": 3})
        );
        assert_eq!(paginate(40, 1, 20).page_count, 2);
        assert_eq!(paginate(0, 1, 20).page_count, 0);
        assert_eq!(paginate(10, 1, 0).page_count, 0);
    }

    #[test]
    fn test_page_query_defaults_and_parsing() {
        assert_eq!(PageQuery::from_query(&Map::new()), PageQuery::default());

        let Value::Object(query) = json!({"page": "3", "perPage": "10"}) else {
            unreachable!()
        };
        let q = PageQuery::from_query(&query);
        assert_eq!((q.page, q.per_page, q.offset()), (3, 10, 20));

        let Value::Object(query) = json!({"page": "0", "per_page": "abc"}) else {
            unreachable!()
        };
        assert_eq!(PageQuery::from_query(&query), PageQuery::default());
    }

    #[test]
    fn test_offset_of_hand_built_page_zero() {
        let q = PageQuery { page: 0, per_page: 25 };
        assert_eq!(q.offset(), 0);
    }
}
