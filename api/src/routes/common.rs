//! Pagination shapes shared by list endpoints.

use serde::{Deserialize, Serialize};

/// Query-string pagination parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PaginationQuery {
    /// Clamps to sane bounds: `page` >= 1 (default 1), `limit` in 1..=100
    /// (default 20).
    pub fn normalize(&self) -> (u64, u64) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(20).clamp(1, 100);
        (page, limit)
    }
}

/// Standard paginated envelope for list responses.
#[derive(Debug, Serialize)]
pub struct Paginated<T: Serialize> {
    pub items: Vec<T>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(items: Vec<T>, page: u64, limit: u64, total: u64) -> Self {
        let total_pages = total.div_ceil(limit);
        Self {
            items,
            page,
            limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1 && total_pages > 0,
        }
    }
}

impl<T: Serialize> Default for Paginated<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            limit: 20,
            total: 0,
            total_pages: 0,
            has_next: false,
            has_prev: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_applies_defaults_and_bounds() {
        let q = PaginationQuery::default();
        assert_eq!(q.normalize(), (1, 20));

        let q = PaginationQuery {
            page: Some(0),
            limit: Some(1000),
        };
        assert_eq!(q.normalize(), (1, 100));

        let q = PaginationQuery {
            page: Some(3),
            limit: Some(0),
        };
        assert_eq!(q.normalize(), (3, 1));
    }

    #[test]
    fn envelope_arithmetic() {
        let p = Paginated::new(vec![1, 2, 3], 1, 3, 7);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next);
        assert!(!p.has_prev);

        let p = Paginated::new(vec![7], 3, 3, 7);
        assert_eq!(p.total_pages, 3);
        assert!(!p.has_next);
        assert!(p.has_prev);

        let p: Paginated<i32> = Paginated::new(vec![], 1, 20, 0);
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_next);
        assert!(!p.has_prev);
    }
}
