//! Shared query parameter types for API handlers.

use dailystory_core::pagination::PageRequest;
use serde::Deserialize;

/// Page-based pagination parameters (`?page=&page_size=`).
///
/// Missing values fall back to page 1 and 10 per page; out-of-range values
/// are clamped, never rejected.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageParams {
    pub fn to_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }
}
