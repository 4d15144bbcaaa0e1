//! Paginated result envelope

use serde::{Deserialize, Serialize};

/// One page of results plus the totals needed to navigate the rest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    /// The items of the requested page
    pub items: Vec<T>,

    /// Total number of matching items (after filters, ignoring pagination)
    pub total_count: usize,

    /// Current page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub page_size: usize,

    /// Total number of pages
    pub page_count: usize,
}

impl<T> PagedResult<T> {
    /// Assemble a page.
    ///
    /// # Panics
    ///
    /// When `page_size` is 0. Page sizes are validated upstream, so reaching
    /// this with 0 is a caller bug. Debug builds also reject items on a page
    /// past the last one.
    pub fn new(items: Vec<T>, total_count: usize, page: usize, page_size: usize) -> Self {
        assert!(page_size >= 1, "page_size must be at least 1");
        let page_count = page_count(total_count, page_size);
        debug_assert!(items.len() <= page_size);
        debug_assert!(
            page <= page_count || items.is_empty(),
            "items on page {} past the last page {}",
            page,
            page_count
        );

        Self {
            items,
            total_count,
            page,
            page_size,
            page_count,
        }
    }

    /// Whether there is a next page
    pub fn has_next(&self) -> bool {
        self.page < self.page_count
    }

    /// Whether there is a previous page
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Map every item, keeping the totals
    pub fn map<U, F>(self, f: F) -> PagedResult<U>
    where
        F: FnMut(T) -> U,
    {
        PagedResult {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page: self.page,
            page_size: self.page_size,
            page_count: self.page_count,
        }
    }
}

/// `ceil(total_count / page_size)`, 0 when there is nothing to show
pub fn page_count(total_count: usize, page_size: usize) -> usize {
    assert!(page_size >= 1, "page_size must be at least 1");
    total_count.div_ceil(page_size)
}

/// Build a [`PagedResult`]; see [`PagedResult::new`]
pub fn paginate<T>(items: Vec<T>, total_count: usize, page: usize, page_size: usize) -> PagedResult<T> {
    PagedResult::new(items, total_count, page, page_size)
}
