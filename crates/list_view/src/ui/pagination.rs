#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationDisplay {
    pub label: String,
    pub prev_disabled: bool,
    pub next_disabled: bool,
}

/// State of `#page-info`, `#prev-page` and `#next-page` for the given page.
pub fn pagination_display(current_page: u32, total: u64, total_pages: u32) -> PaginationDisplay {
    PaginationDisplay {
        label: format!("page {current_page} / {total_pages} ({total} total)"),
        prev_disabled: current_page <= 1,
        next_disabled: current_page >= total_pages,
    }
}
