//! List queries and pagination metadata.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Default page size used when a query does not set one.
pub const DEFAULT_LIMIT: u32 = 10;

/// Pagination metadata returned alongside every list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Total number of matching items across all pages.
    pub total: u64,
    /// Current page, starting at 1.
    pub page: u32,
    /// Page size.
    pub limit: u32,
    /// Number of pages.
    pub pages: u32,
}

impl Pagination {
    /// Build metadata for `total` items split into pages of `limit`.
    #[must_use]
    pub fn compute(total: u64, page: u32, limit: u32) -> Self {
        Self {
            total,
            page: page.max(1),
            limit,
            pages: page_count(total, limit),
        }
    }

    /// Metadata for a response that carried every item on one page.
    #[must_use]
    pub fn single_page(len: usize) -> Self {
        let total = len as u64;
        let limit = u32::try_from(len).unwrap_or(u32::MAX);
        Self {
            total,
            page: 1,
            limit,
            pages: u32::from(len > 0),
        }
    }

    /// Whether a page after the current one exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.pages
    }

    /// Shift `total` after a confirmed create (+1) or delete (-1), keeping
    /// `pages` consistent with the page size.
    pub fn adjust_total(&mut self, delta: i64) {
        self.total = self.total.saturating_add_signed(delta);
        self.pages = page_count(self.total, self.limit);
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::compute(0, 1, DEFAULT_LIMIT)
    }
}

fn page_count(total: u64, limit: u32) -> u32 {
    if limit == 0 {
        return u32::from(total > 0);
    }
    u32::try_from(total.div_ceil(u64::from(limit))).unwrap_or(u32::MAX)
}

/// One page of a list response.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items in server order.
    pub items: Vec<T>,
    /// Pagination metadata for this page.
    pub pagination: Pagination,
}

/// Query sent to a list endpoint: pagination, free-text search and filters.
///
/// ```
/// use bazaar_core::ListQuery;
///
/// let query = ListQuery::new().page(2).limit(25).search("shoe").filter("status", "active");
/// assert_eq!(
///     query.to_pairs(),
///     vec![
///         ("page".to_string(), "2".to_string()),
///         ("limit".to_string(), "25".to_string()),
///         ("search".to_string(), "shoe".to_string()),
///         ("status".to_string(), "active".to_string()),
///     ]
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub filters: BTreeMap<String, String>,
}

impl ListQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the search term. Blank terms are dropped.
    #[must_use]
    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search = (!term.trim().is_empty()).then_some(term);
        self
    }

    /// Add an exact-match filter. Blank values are dropped, so a cleared
    /// dropdown does not send `status=`.
    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.trim().is_empty() {
            self.filters.insert(key.into(), value);
        }
        self
    }

    /// The same query moved to another page.
    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        self.clone().page(page)
    }

    /// Query-string pairs in a stable order.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(3 + self.filters.len());
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        pairs.extend(self.filters.iter().map(|(k, v)| (k.clone(), v.clone())));
        pairs
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_pages() {
        let p = Pagination::compute(25, 1, 10);
        assert_eq!(p.pages, 3);
        assert!(p.has_next());

        let last = Pagination::compute(25, 3, 10);
        assert!(!last.has_next());

        assert_eq!(Pagination::compute(0, 1, 10).pages, 0);
        assert_eq!(Pagination::compute(20, 1, 10).pages, 2);
    }

    #[test]
    fn test_adjust_total() {
        let mut p = Pagination::compute(20, 1, 10);
        p.adjust_total(1);
        assert_eq!((p.total, p.pages), (21, 3));
        p.adjust_total(-2);
        assert_eq!((p.total, p.pages), (19, 2));

        let mut empty = Pagination::compute(0, 1, 10);
        empty.adjust_total(-1);
        assert_eq!(empty.total, 0);
    }

    #[test]
    fn test_single_page() {
        let p = Pagination::single_page(4);
        assert_eq!((p.total, p.page, p.limit, p.pages), (4, 1, 4, 1));
        assert_eq!(Pagination::single_page(0).pages, 0);
    }

    #[test]
    fn test_query_drops_blank_values() {
        let q = ListQuery::new().search("  ").filter("status", "");
        assert!(q.to_pairs().is_empty());
    }

    #[test]
    fn test_pagination_deserializes_from_backend_shape() {
        let p: Pagination =
            serde_json::from_str(r#"{"total":25,"page":1,"limit":10,"pages":3}"#).unwrap();
        assert_eq!(p, Pagination::compute(25, 1, 10));
    }
}
