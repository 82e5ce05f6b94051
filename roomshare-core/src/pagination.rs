//! Page arithmetic shared by the search endpoints

use serde::Serialize;

/// Largest page size a client may ask for
pub const MAX_PAGE_SIZE: u64 = 50;

/// Highest page number; keeps `skip()` inside an `i64` OFFSET at any page size
pub const MAX_PAGE: u64 = i64::MAX as u64 / MAX_PAGE_SIZE;

/// A 1-indexed page of results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    /// Clamp `page` into `1..=MAX_PAGE` and `limit` into `1..=MAX_PAGE_SIZE`
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.clamp(1, MAX_PAGE),
            limit: limit.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn skip(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// Pagination block returned alongside a page of results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub limit: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: PageRequest, total_items: u64) -> Self {
        let total_pages = total_items.div_ceil(page.limit);
        Self {
            current_page: page.page,
            total_pages,
            total_items,
            limit: page.limit,
            has_next: page.page < total_pages,
            has_prev: page.page > 1,
        }
    }
}
