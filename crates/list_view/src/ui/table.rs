//! Row markup for `#config-table`.

use std::fmt::Write as _;

use shared::domain::{ConfigId, ConfigRecord};

pub const COLUMN_COUNT: usize = 5;
pub const EMPTY_PLACEHOLDER: &str = "No configs found";

/// Table body markup plus the ids of the delete buttons it contains.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedTable {
    pub html: String,
    pub rows: usize,
    pub delete_ids: Vec<ConfigId>,
}

impl RenderedTable {
    pub fn is_placeholder(&self) -> bool {
        self.delete_ids.is_empty()
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

pub fn render_config_table(configs: &[ConfigRecord]) -> RenderedTable {
    if configs.is_empty() {
        return RenderedTable {
            html: format!(
                r#"<tr><td colspan="{COLUMN_COUNT}" class="text-center">{EMPTY_PLACEHOLDER}</td></tr>"#
            ),
            rows: 1,
            delete_ids: Vec::new(),
        };
    }

    let mut html = String::new();
    let mut delete_ids = Vec::with_capacity(configs.len());
    for config in configs {
        let id = config.id;
        let _ = write!(
            html,
            concat!(
                "<tr>",
                "<td>{id}</td>",
                r#"<td><a href="/detail?id={id}">{name}</a></td>"#,
                "<td>{url}</td>",
                r#"<td><span class="method-badge {badge}">{method}</span></td>"#,
                "<td>",
                r#"<a href="/edit?id={id}" class="btn btn-sm"><i class="fa fa-edit"></i></a>"#,
                r#"<button class="btn btn-sm btn-danger delete-btn" data-id="{id}"><i class="fa fa-trash"></i></button>"#,
                "</td>",
                "</tr>"
            ),
            id = id,
            name = escape_html(&config.name),
            url = escape_html(&config.url),
            badge = escape_html(&config.method.css_class()),
            method = escape_html(config.method.as_str()),
        );
        delete_ids.push(id);
    }

    RenderedTable {
        html,
        rows: configs.len(),
        delete_ids,
    }
}

#[cfg(test)]
mod tests {
    use shared::domain::HttpMethod;

    use super::*;

    #[test]
    fn empty_page_renders_single_placeholder_row() {
        let table = render_config_table(&[]);
        assert_eq!(table.rows, 1);
        assert!(table.is_placeholder());
        assert_eq!(table.html.matches("<tr>").count(), 1);
        assert!(table.html.contains(r#"colspan="5""#));
        assert!(table.html.contains(EMPTY_PLACEHOLDER));
        assert!(!table.html.contains("delete-btn"));
        assert!(!table.html.contains("<a "));
    }

    #[test]
    fn rows_carry_links_badge_and_delete_target() {
        let configs = vec![
            ConfigRecord::new(ConfigId(9), "login", "https://api.test/login", HttpMethod::Post),
            ConfigRecord::new(ConfigId(4), "ping", "https://api.test/ping", HttpMethod::Get),
        ];
        let table = render_config_table(&configs);

        assert_eq!(table.rows, 2);
        assert_eq!(table.delete_ids, vec![ConfigId(9), ConfigId(4)]);
        assert_eq!(table.html.matches("<tr>").count(), 2);
        assert!(table.html.contains(r#"<a href="/detail?id=9">login</a>"#));
        assert!(table.html.contains(r#"<a href="/edit?id=4" class="btn btn-sm">"#));
        assert!(table.html.contains(r#"<span class="method-badge post">POST</span>"#));
        assert!(table.html.contains(r#"data-id="4""#));
        let first = table.html.find("/detail?id=9").expect("first row");
        let second = table.html.find("/detail?id=4").expect("second row");
        assert!(first < second);
    }

    #[test]
    fn record_text_is_escaped() {
        let configs = vec![ConfigRecord::new(
            ConfigId(1),
            "<script>alert('x')</script>",
            "https://api.test/?a=1&b=\"2\"",
            HttpMethod::Other("X\"Y".into()),
        )];
        let table = render_config_table(&configs);

        assert!(!table.html.contains("<script>"));
        assert!(table.html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(table.html.contains("?a=1&amp;b=&quot;2&quot;"));
        assert!(table.html.contains(r#"class="method-badge x&quot;y""#));
    }
}
