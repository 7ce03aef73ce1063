//! Pagination utilities shared by all list endpoints

/// Default page size when the caller does not supply `limit`
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Hard ceiling on caller-supplied page sizes
pub const MAX_PAGE_SIZE: i64 = 100;

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Rows per page after clamping
    pub page_size: i64,
    /// Total number of pages
    pub total_pages: i64,
    /// Offset for SQL LIMIT/OFFSET query
    pub offset: i64,
}

/// Clamp a caller-supplied page size to [1, MAX_PAGE_SIZE]
pub fn clamp_page_size(requested: Option<i64>) -> i64 {
    requested.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Calculate pagination metadata from total results and requested page.
///
/// Ensures page is within valid bounds [1, total_pages] and computes the
/// SQL offset as `(page - 1) * page_size`.
pub fn calculate_pagination(total_results: i64, requested_page: i64, page_size: i64) -> Pagination {
    let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
    let total_pages = (total_results + page_size - 1) / page_size;
    let page = requested_page.max(1).min(total_pages.max(1));
    let offset = (page - 1) * page_size;

    Pagination {
        page,
        page_size,
        total_pages,
        offset,
    }
}
