/// Shared list pagination
///
/// Every list endpoint takes `?page=&page_size=` and answers with a
/// `{count, results}` envelope. Page size defaults to 10 and is capped to
/// keep a single response bounded.

use serde::{Deserialize, Serialize};

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Upper bound a client may request
pub const MAX_PAGE_SIZE: i64 = 100;

/// Query parameters for paginated listings
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    /// 1-based page number
    pub page: Option<i64>,

    /// Items per page (default 10, max 100)
    pub page_size: Option<i64>,
}

impl Pagination {
    /// Effective page size after clamping
    pub fn limit(&self) -> i64 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// Row offset for the requested page
    pub fn offset(&self) -> i64 {
        let page = self.page.unwrap_or(1).max(1);
        (page - 1) * self.limit()
    }
}

/// Paginated response envelope
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// Total matching rows, across all pages
    pub count: i64,

    /// Rows of the requested page
    pub results: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = Pagination {
            page: None,
            page_size: None,
        };
        assert_eq!(p.limit(), 10);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_offset_from_page() {
        let p = Pagination {
            page: Some(3),
            page_size: Some(25),
        };
        assert_eq!(p.limit(), 25);
        assert_eq!(p.offset(), 50);
    }

    #[test]
    fn test_page_size_clamped() {
        let p = Pagination {
            page: Some(1),
            page_size: Some(10_000),
        };
        assert_eq!(p.limit(), MAX_PAGE_SIZE);

        let p = Pagination {
            page: Some(0),
            page_size: Some(0),
        };
        assert_eq!(p.limit(), 1);
        assert_eq!(p.offset(), 0);
    }
}
