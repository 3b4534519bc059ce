//! The markup the controller mutates, modeled as a trait so that a browser
//! binding and the in-memory [`HtmlDocument`] are interchangeable.

use std::fmt::Write as _;

use shared::domain::ConfigId;

use super::{
    pagination::PaginationDisplay,
    table::{escape_html, RenderedTable},
};

pub const METHOD_FILTER_OPTIONS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE"];

/// Elements of the list page the controller reads from and writes to.
pub trait ListView: Send {
    /// Current value of `#keyword`.
    fn keyword_input(&self) -> String;
    /// Current value of `#method-filter`; empty means any method.
    fn method_filter(&self) -> String;
    /// Replaces every row of `#config-table`.
    fn replace_table(&mut self, table: RenderedTable);
    fn update_pagination(&mut self, display: PaginationDisplay);
    /// Whether a `.delete-btn` for `id` is currently in the table.
    fn has_delete_target(&self, id: ConfigId) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlDocument {
    keyword: String,
    method_filter: String,
    table: RenderedTable,
    page_info: String,
    prev_disabled: bool,
    next_disabled: bool,
    table_renders: u64,
}

impl Default for HtmlDocument {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            method_filter: String::new(),
            table: RenderedTable::default(),
            page_info: String::new(),
            prev_disabled: true,
            next_disabled: true,
            table_renders: 0,
        }
    }
}

impl HtmlDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_keyword_input(&mut self, keyword: impl Into<String>) {
        self.keyword = keyword.into();
    }

    pub fn set_method_filter(&mut self, method: impl Into<String>) {
        self.method_filter = method.into();
    }

    pub fn table(&self) -> &RenderedTable {
        &self.table
    }

    pub fn page_info(&self) -> &str {
        &self.page_info
    }

    pub fn prev_disabled(&self) -> bool {
        self.prev_disabled
    }

    pub fn next_disabled(&self) -> bool {
        self.next_disabled
    }

    /// How many times `#config-table` has been replaced.
    pub fn table_renders(&self) -> u64 {
        self.table_renders
    }

    /// Serializes the list fragment with the ids and classes the controller binds to.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        let _ = writeln!(html, r#"<div class="config-list">"#);
        let _ = writeln!(
            html,
            r#"  <input id="keyword" type="text" value="{}">"#,
            escape_html(&self.keyword)
        );
        let _ = writeln!(html, r#"  <select id="method-filter">"#);
        let _ = writeln!(
            html,
            r#"    <option value=""{}>All</option>"#,
            selected(self.method_filter.is_empty())
        );
        for method in METHOD_FILTER_OPTIONS {
            let _ = writeln!(
                html,
                r#"    <option value="{method}"{}>{method}</option>"#,
                selected(self.method_filter.eq_ignore_ascii_case(method))
            );
        }
        let _ = writeln!(html, "  </select>");
        let _ = writeln!(html, "  <table>");
        let _ = writeln!(
            html,
            r#"    <thead><tr><th data-field="id">ID</th><th data-field="name">Name</th><th>URL</th><th>Method</th><th>Actions</th></tr></thead>"#
        );
        let _ = writeln!(
            html,
            r#"    <tbody id="config-table">{}</tbody>"#,
            self.table.html
        );
        let _ = writeln!(html, "  </table>");
        let _ = writeln!(html, r#"  <div class="pagination">"#);
        let _ = writeln!(
            html,
            r#"    <button id="prev-page"{}>Previous</button>"#,
            disabled(self.prev_disabled)
        );
        let _ = writeln!(
            html,
            r#"    <span id="page-info">{}</span>"#,
            escape_html(&self.page_info)
        );
        let _ = writeln!(
            html,
            r#"    <button id="next-page"{}>Next</button>"#,
            disabled(self.next_disabled)
        );
        let _ = writeln!(html, "  </div>");
        let _ = write!(html, "</div>");
        html
    }
}

fn selected(flag: bool) -> &'static str {
    if flag {
        " selected"
    } else {
        ""
    }
}

fn disabled(flag: bool) -> &'static str {
    if flag {
        " disabled"
    } else {
        ""
    }
}

impl ListView for HtmlDocument {
    fn keyword_input(&self) -> String {
        self.keyword.clone()
    }

    fn method_filter(&self) -> String {
        self.method_filter.clone()
    }

    fn replace_table(&mut self, table: RenderedTable) {
        self.table = table;
        self.table_renders += 1;
    }

    fn update_pagination(&mut self, display: PaginationDisplay) {
        self.page_info = display.label;
        self.prev_disabled = display.prev_disabled;
        self.next_disabled = display.next_disabled;
    }

    fn has_delete_target(&self, id: ConfigId) -> bool {
        self.table.delete_ids.contains(&id)
    }
}
