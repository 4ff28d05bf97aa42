//! Page-based slicing of product listings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page sizes the listing offers.
pub const PAGE_SIZES: [u32; 3] = [5, 10, 20];

/// Page size used when none is requested.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Errors for out-of-range pagination input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    #[error("page must be at least 1")]
    ZeroPage,
    #[error("page size must be one of 5, 10 or 20 (got {0})")]
    UnsupportedPageSize(u32),
}

/// A requested page: 1-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a request, filling in defaults for missing values.
    ///
    /// # Errors
    ///
    /// Returns `PaginationError` if `page` is 0 or `page_size` is not one of
    /// [`PAGE_SIZES`].
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Result<Self, PaginationError> {
        let page = page.unwrap_or(1);
        if page == 0 {
            return Err(PaginationError::ZeroPage);
        }

        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if !PAGE_SIZES.contains(&page_size) {
            return Err(PaginationError::UnsupportedPageSize(page_size));
        }

        Ok(Self { page, page_size })
    }

    /// Index of the first item on this page.
    #[must_use]
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.page_size as usize)
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total_items: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

impl<T> Page<T> {
    /// Cut the requested page out of `items`.
    ///
    /// Out-of-range pages produce an empty item list.
    #[must_use]
    pub fn slice(items: Vec<T>, request: PageRequest) -> Self {
        let total_items = items.len();
        let offset = request.offset();
        let end = offset.saturating_add(request.page_size as usize);

        let items = items
            .into_iter()
            .skip(offset)
            .take(request.page_size as usize)
            .collect();

        Self {
            items,
            page: request.page,
            page_size: request.page_size,
            total_items,
            has_previous: request.page > 1,
            has_next: end < total_items,
        }
    }
}
