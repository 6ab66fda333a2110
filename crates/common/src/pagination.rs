//! Pagination types shared by every service.
//!
//! - `PageRequest` is what callers ask for (zero-based page index + page size).
//! - `Slice` is what a storage adapter hands back.
//! - `Page` is the stable JSON shape exposed over HTTP; `to_page` is the only
//!   way storage results reach the wire.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_PAGE: u64 = 0;
pub const DEFAULT_PAGE_SIZE: u64 = 10;

fn default_page() -> u64 { DEFAULT_PAGE }
fn default_size() -> u64 { DEFAULT_PAGE_SIZE }

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageRequestError {
    #[error("page size must be greater than zero")]
    ZeroSize,
}

/// Page parameters as they arrive on the query string (`?page=&size=`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct PageRequest {
    /// 0-based page index
    #[serde(default = "default_page")]
    pub page: u64,
    /// items per page
    #[serde(default = "default_size")]
    pub size: u64,
}

impl PageRequest {
    pub fn new(page: u64, size: u64) -> Self { Self { page, size } }

    /// Storage adapters call this before touching the backend.
    pub fn validate(self) -> Result<Self, PageRequestError> {
        if self.size == 0 {
            return Err(PageRequestError::ZeroSize);
        }
        Ok(self)
    }
}

impl Default for PageRequest {
    fn default() -> Self { Self { page: DEFAULT_PAGE, size: DEFAULT_PAGE_SIZE } }
}

/// Raw paged result produced by a repository.
#[derive(Clone, Debug, PartialEq)]
pub struct Slice<T> {
    pub items: Vec<T>,
    pub page_size: u64,
    pub page_index: u64,
    pub num_items: u64,
    pub num_pages: u64,
}

impl<T> Slice<T> {
    /// Build a slice computing the page count from the item count.
    /// An empty collection has zero pages.
    pub fn new(items: Vec<T>, request: PageRequest, num_items: u64) -> Self {
        let num_pages = if request.size == 0 { 0 } else { num_items.div_ceil(request.size) };
        Self { items, page_size: request.size, page_index: request.page, num_items, num_pages }
    }
}

/// Wire page: `{content, size, currentPage, totalItems, totalPages}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub size: u64,
    pub current_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

/// Project a storage slice onto the wire page. Field values are copied as-is.
pub fn to_page<T>(slice: Slice<T>) -> Page<T> {
    Page {
        content: slice.items,
        size: slice.page_size,
        current_page: slice.page_index,
        total_items: slice.num_items,
        total_pages: slice.num_pages,
    }
}

impl<T> From<Slice<T>> for Page<T> {
    fn from(slice: Slice<T>) -> Self { to_page(slice) }
}
