//! Offset pagination math for the admin listings.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_count: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    /// Compute page metadata from a 1-based page, a positive limit and
    /// the total matching row count.
    #[must_use]
    pub const fn new(page: u64, limit: u64, total_count: u64) -> Self {
        Self {
            current_page: page,
            total_pages: total_count.div_ceil(limit),
            total_count,
            has_next: page * limit < total_count,
            has_prev: page > 1,
        }
    }
}
