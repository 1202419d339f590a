//! Common types

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_PAGE_SIZE;

/// Requested page window. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, per_page: DEFAULT_PAGE_SIZE }
    }
}

impl Pagination {
    /// Builds a window from raw caller input, falling back to defaults and
    /// clamping the page size to `1..=max_per_page`.
    pub fn new(page: Option<u32>, per_page: Option<u32>, default_per_page: u32, max_per_page: u32) -> Self {
        let max_per_page = max_per_page.max(1);
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(default_per_page).clamp(1, max_per_page),
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.per_page)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn meta(&self, total_items: i64) -> PaginationMeta {
        let total_items = total_items.max(0) as u64;
        let per_page = u64::from(self.per_page.max(1));
        PaginationMeta {
            page: self.page,
            limit: self.per_page,
            total_items,
            total_pages: total_items.div_ceil(per_page),
        }
    }
}

/// Pagination block returned alongside a paged result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub limit: u32,
    pub total_items: u64,
    pub total_pages: u64,
}
