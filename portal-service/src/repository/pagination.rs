//! Pagination descriptors for list queries
//!
//! # Example
//!
//! ```rust
//! use portal_service::repository::Pagination;
//!
//! // Absent or non-positive values fall back to page 1, 20 rows
//! let page = Pagination::new(Some(2), None);
//! assert_eq!(page.page, 2);
//! assert_eq!(page.limit, 20);
//! assert_eq!(page.offset(), 20);
//! ```

/// Page used when none (or a non-positive one) is requested
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when none (or a non-positive one) is requested
pub const DEFAULT_LIMIT: i64 = 20;

/// Resolved `{page, limit}` pair, 1-indexed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page number, starting at 1
    pub page: i64,
    /// Maximum number of rows per page
    pub limit: i64,
}

impl Pagination {
    /// Resolve client-supplied optional values, applying defaults
    #[must_use]
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE),
            limit: limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LIMIT),
        }
    }

    /// Number of rows to skip
    #[must_use]
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Pages needed to hold `total` rows at this page size
    #[must_use]
    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            return 0;
        }
        (total - 1) / self.limit + 1
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_values_use_defaults() {
        assert_eq!(Pagination::new(None, None), Pagination::default());
    }

    #[test]
    fn test_non_positive_values_use_defaults() {
        for (page, limit) in [(Some(0), Some(0)), (Some(-3), Some(-1))] {
            let p = Pagination::new(page, limit);
            assert_eq!(p.page, 1);
            assert_eq!(p.limit, 20);
            assert_eq!(p.offset(), 0);
        }
    }

    #[test]
    fn test_offset_math() {
        assert_eq!(Pagination::new(Some(2), Some(20)).offset(), 20);
        assert_eq!(Pagination::new(Some(3), Some(15)).offset(), 30);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let p = Pagination::new(Some(1), Some(20));
        assert_eq!(p.total_pages(45), 3);
        assert_eq!(p.total_pages(40), 2);
        assert_eq!(p.total_pages(1), 1);
        assert_eq!(p.total_pages(0), 0);
    }

    #[test]
    fn test_total_pages_with_huge_limit() {
        let p = Pagination::new(Some(1), Some(i64::MAX));
        assert_eq!(p.total_pages(45), 1);
        assert_eq!(p.total_pages(i64::MAX), 1);
        assert_eq!(Pagination::new(Some(1), Some(1)).total_pages(i64::MAX), i64::MAX);
    }
}
