//! Pagination utilities for service layer
//!
//! Provides a simple `Pagination` struct and the page metadata returned by list endpoints.

use serde::Serialize;

pub const DEFAULT_PER_PAGE: u32 = 5;
pub const MAX_PER_PAGE: u32 = 100;

/// Pagination parameters
#[derive(Clone, Copy, Debug)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub per_page: u32,
}

impl Pagination {
    /// Zero falls back to defaults; `per_page` is capped at `MAX_PER_PAGE`.
    pub fn normalized(self) -> Self {
        let page = if self.page == 0 { 1 } else { self.page };
        let per_page = if self.per_page == 0 { DEFAULT_PER_PAGE } else { self.per_page.min(MAX_PER_PAGE) };
        Self { page, per_page }
    }

    /// `(offset, limit)` for the store query.
    pub fn offset_limit(self) -> (u64, u64) {
        let p = self.normalized();
        ((p.page as u64 - 1) * p.per_page as u64, p.per_page as u64)
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: DEFAULT_PER_PAGE } }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub last_page: u64,
    pub from: u64,
    pub to: u64,
}

impl PageMeta {
    pub fn new(p: Pagination, total: u64, returned: usize) -> Self {
        let p = p.normalized();
        let (offset, limit) = p.offset_limit();
        let last_page = total.div_ceil(limit).max(1);
        Self { total, page: p.page, limit: p.per_page, last_page, from: offset + 1, to: offset + returned as u64 }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}
