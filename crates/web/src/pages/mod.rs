//! Server-rendered harness pages
//!
//! Every page shares one layout: a sidebar with the scenario links and a
//! main content column. Markup carries `data-testid` attributes that
//! automation scripts select on.

pub mod auth;
pub mod downloads;
pub mod extraction;
pub mod forms;
pub mod navigation;

use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse};

/// Sidebar entry.
pub struct NavItem {
    pub href: &'static str,
    pub label: &'static str,
}

pub const NAV_ITEMS: &[NavItem] = &[
    NavItem { href: "/forms", label: "Form Interaction" },
    NavItem { href: "/extraction", label: "Element Extraction" },
    NavItem { href: "/downloads", label: "File Downloads" },
    NavItem { href: "/auth/basic", label: "Basic Auth" },
    NavItem { href: "/auth/form", label: "Form Login" },
    NavItem { href: "/auth/challenge", label: "Challenge Auth" },
    NavItem { href: "/navigation", label: "Web Navigation" },
];

const STYLE: &str = r#"
body { margin: 0; font-family: system-ui, sans-serif; display: flex; min-height: 100vh; color: #111; }
nav.sidebar { width: 16rem; border-right: 1px solid #ddd; background: #fafafa; padding: 1rem; }
nav.sidebar h1 { font-size: 1.1rem; margin: 0 0 1rem; }
nav.sidebar a { display: block; padding: .5rem .75rem; border-radius: .375rem; color: inherit; text-decoration: none; }
nav.sidebar a.active { background: #111; color: #fff; }
main { flex: 1; padding: 2rem; }
.content { max-width: 56rem; margin: 0 auto; }
.field { margin-bottom: 1rem; }
.field label { display: block; font-weight: 600; margin-bottom: .25rem; }
.field input, .field select, .field textarea { width: 100%; padding: .5rem; box-sizing: border-box; }
.error { color: #b91c1c; font-size: .875rem; }
.panel { border: 1px solid #ddd; border-radius: .5rem; padding: 1rem; margin-bottom: 1rem; }
.panel.success { border-color: #16a34a; background: #f0fdf4; }
.panel.failure { border-color: #dc2626; background: #fef2f2; }
pre { background: #f4f4f5; padding: 1rem; border-radius: .375rem; overflow-x: auto; }
"#;

/// Escape text for HTML element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap page content in the shared document shell.
pub fn layout(title: &str, active_href: &str, content: &str) -> String {
    let mut nav = String::new();
    for item in NAV_ITEMS {
        let class = if item.href == active_href { " class=\"active\"" } else { "" };
        nav.push_str(&format!(
            "<a href=\"{}\"{}>{}</a>\n",
            item.href, class, item.label
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | MCPBench Test</title>
<style>{style}</style>
</head>
<body>
<nav class="sidebar" data-testid="sidebar">
<h1><a href="/">MCPBench Test</a></h1>
{nav}</nav>
<main><div class="content">
{content}
</div></main>
</body>
</html>
"#,
        title = escape_html(title),
        style = STYLE,
        nav = nav,
        content = content,
    )
}

pub async fn index_handler() -> Html<String> {
    let mut cards = String::new();
    for item in NAV_ITEMS {
        let slug = item.href.trim_start_matches('/').replace('/', "-");
        cards.push_str(&format!(
            "<li><a href=\"{}\" data-testid=\"scenario-{}\">{}</a></li>\n",
            item.href, slug, item.label
        ));
    }
    let content = format!(
        r#"<h1 data-testid="home-heading">MCPBench Test Environment</h1>
<p>Pages and endpoints for browser automation scenarios. Pick a scenario:</p>
<ul data-testid="scenario-list">
{}</ul>"#,
        cards
    );
    Html(layout("Home", "/", &content))
}

pub async fn not_found_handler(uri: Uri) -> impl IntoResponse {
    let content = format!(
        r#"<div class="panel failure" data-testid="not-found"><h1>Page not found</h1><p>No page at <code>{}</code>.</p></div>"#,
        escape_html(uri.path())
    );
    (StatusCode::NOT_FOUND, Html(layout("Not found", "", &content)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x & 'y'")</script>"#),
            "&lt;script&gt;alert(&quot;x &amp; &#39;y&#39;&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_layout_marks_active_link() {
        let page = layout("Downloads", "/downloads", "<p>body</p>");
        assert!(page.contains(r#"<a href="/downloads" class="active">File Downloads</a>"#));
        assert!(page.contains(r#"<a href="/forms">Form Interaction</a>"#));
        assert!(page.contains("<p>body</p>"));
        assert!(page.contains("<title>Downloads | MCPBench Test</title>"));
    }

    #[tokio::test]
    async fn test_index_lists_every_scenario() {
        let Html(page) = index_handler().await;
        for item in NAV_ITEMS {
            assert!(page.contains(item.href));
        }
        assert!(page.contains(r#"data-testid="scenario-auth-basic""#));
    }
}
