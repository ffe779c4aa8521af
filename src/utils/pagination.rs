use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 15;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Pagination metadata attached to every list response.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
    #[serde(rename = "hasNext")]
    pub has_next: bool,
    #[serde(rename = "hasPrev")]
    pub has_prev: bool,
}

/// Clamp raw query parameters: page >= 1, limit within [1, MAX_PAGE_SIZE].
pub fn clamp_page_params(page: Option<i64>, limit: Option<i64>) -> (i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    (page, limit)
}

/// Resolve the requested page against the total row count.
///
/// The requested page is clamped into [1, total_pages]; an empty result set
/// still reports one (empty) page so the metadata stays well-formed.
/// Returns the metadata plus the row offset for the clamped page.
pub fn paginate(total: i64, requested_page: i64, limit: i64) -> (Pagination, i64) {
    let total_pages = ((total + limit - 1) / limit).max(1);
    let page = requested_page.clamp(1, total_pages);
    let offset = (page - 1) * limit;

    let pagination = Pagination {
        total,
        page,
        limit,
        total_pages,
        has_next: page < total_pages,
        has_prev: page > 1,
    };

    (pagination, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_fall_back_to_defaults() {
        assert_eq!(clamp_page_params(None, None), (1, DEFAULT_PAGE_SIZE));
    }

    #[test]
    fn params_are_clamped_into_range() {
        assert_eq!(clamp_page_params(Some(0), Some(0)), (1, 1));
        assert_eq!(clamp_page_params(Some(-3), Some(500)), (1, MAX_PAGE_SIZE));
        assert_eq!(clamp_page_params(Some(7), Some(25)), (7, 25));
    }

    #[test]
    fn page_is_clamped_to_the_last_page() {
        // 40 rows at 15 per page -> 3 pages; page 999 lands on page 3.
        let (meta, offset) = paginate(40, 999, 15);
        assert_eq!(meta.page, 3);
        assert_eq!(meta.total_pages, 3);
        assert!(!meta.has_next);
        assert!(meta.has_prev);
        assert_eq!(offset, 30);
    }

    #[test]
    fn first_page_has_no_prev() {
        let (meta, offset) = paginate(40, 1, 15);
        assert_eq!(offset, 0);
        assert!(meta.has_next);
        assert!(!meta.has_prev);
    }

    #[test]
    fn middle_page_has_both_neighbours() {
        let (meta, _) = paginate(40, 2, 15);
        assert!(meta.has_next);
        assert!(meta.has_prev);
    }

    #[test]
    fn empty_collection_reports_a_single_empty_page() {
        let (meta, offset) = paginate(0, 5, 15);
        assert_eq!(meta.page, 1);
        assert_eq!(meta.total_pages, 1);
        assert!(!meta.has_next);
        assert!(!meta.has_prev);
        assert_eq!(offset, 0);
    }

    #[test]
    fn exact_multiple_does_not_add_a_page() {
        let (meta, _) = paginate(30, 2, 15);
        assert_eq!(meta.total_pages, 2);
        assert_eq!(meta.page, 2);
        assert!(!meta.has_next);
    }
}
