//! Query state owned by the list view and the transitions that mutate it.

use shared::protocol::{ListRequest, SortField, SortOrder, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// A list request stamped with the sequence number it was issued under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLoad {
    pub seq: u64,
    pub request: ListRequest,
}

/// Where a successfully fetched page lands relative to the server's page count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagePlacement {
    InRange,
    PastLastPage { last_page: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    current_page: u32,
    page_size: u32,
    sort_field: SortField,
    sort_order: SortOrder,
    total_pages: Option<u32>,
    latest_seq: u64,
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl QueryState {
    pub fn new(page_size: u32) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
            sort_field: SortField::Id,
            sort_order: SortOrder::Desc,
            total_pages: None,
            latest_seq: 0,
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn sort(&self) -> (SortField, SortOrder) {
        (self.sort_field, self.sort_order)
    }

    /// Page count of the last rendered result, `None` before the first render.
    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    /// Clicking the active column flips its direction; any other column
    /// becomes active in ascending order.
    pub fn toggle_sort(&mut self, field: SortField) {
        if self.sort_field == field {
            self.sort_order = self.sort_order.flipped();
        } else {
            self.sort_field = field;
            self.sort_order = SortOrder::Asc;
        }
    }

    /// Replaces the sort pair outright, e.g. when restoring a saved view.
    pub fn set_sort(&mut self, field: SortField, order: SortOrder) {
        self.sort_field = field;
        self.sort_order = order;
    }

    /// Stamps a new request. Every earlier stamp becomes stale.
    pub fn issue(&mut self, page: u32, keyword: String, method: String) -> PendingLoad {
        self.latest_seq += 1;
        PendingLoad {
            seq: self.latest_seq,
            request: ListRequest {
                page: page.max(1),
                page_size: self.page_size,
                keyword,
                method,
                sort_field: self.sort_field,
                sort_order: self.sort_order,
            },
        }
    }

    pub fn is_latest(&self, seq: u64) -> bool {
        seq == self.latest_seq
    }

    pub fn placement(&self, page: u32, total_pages: u32) -> PagePlacement {
        if total_pages >= 1 && page > total_pages {
            PagePlacement::PastLastPage {
                last_page: total_pages,
            }
        } else {
            PagePlacement::InRange
        }
    }

    /// Records the page that was just rendered.
    pub fn commit(&mut self, page: u32, total_pages: u32) {
        self.current_page = page.max(1);
        self.total_pages = Some(total_pages);
    }

    pub fn previous_page(&self) -> Option<u32> {
        (self.current_page > 1).then(|| self.current_page - 1)
    }

    pub fn next_page(&self) -> Option<u32> {
        let total_pages = self.total_pages?;
        (self.current_page < total_pages).then(|| self.current_page + 1)
    }
}

#[cfg(test)]
#[path = "../tests/reducer_tests.rs"]
mod tests;
