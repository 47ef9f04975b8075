use axum::extract::OriginalUri;
use axum::response::Html;
use chrono::Utc;

use super::{escape_html, layout};

const TITLE: &str = "HTTP Request & Response Service";

const HTTP_METHODS: &[(&str, &str)] = &[
    ("GET", "Retrieve data from server"),
    ("POST", "Send data to server"),
    ("PUT", "Update existing resource"),
    ("DELETE", "Remove resource"),
    ("PATCH", "Partial update"),
    ("HEAD", "Get headers only"),
    ("OPTIONS", "Get allowed methods"),
];

/// (label, anchor, section)
const SECTION_LINKS: &[(&str, &str, &str)] = &[
    ("HTTP Methods", "#http-methods", "methods"),
    ("Request & Response", "#request-response", "request"),
    ("Authentication", "#auth", "auth"),
    ("Status Codes", "#status-codes", "status"),
    ("Headers", "#headers", "headers"),
    ("Cookies", "#cookies", "cookies"),
    ("JSON", "#json", "json"),
    ("XML", "#xml", "xml"),
];

const STATUS_CODES: &[(&str, &str, &str)] = &[
    ("200", "OK", "Request successful"),
    ("201", "Created", "Resource created"),
    ("400", "Bad Request", "Invalid request"),
    ("401", "Unauthorized", "Authentication required"),
    ("404", "Not Found", "Resource not found"),
    ("500", "Internal Server Error", "Server error"),
];

const JSON_EXAMPLE: &str = r#"{
  "args": {},
  "headers": {
    "Accept": "application/json",
    "Host": "localhost:3000",
    "User-Agent": "Playwright/1.0"
  },
  "origin": "127.0.0.1",
  "url": "http://localhost:3000/test/extraction"
}"#;

const FORM_EXAMPLE: &str = r#"{
  "form": {
    "key1": "value1",
    "key2": "value2"
  },
  "files": {},
  "json": null
}"#;

fn render(path: &str) -> String {
    let nav: String = SECTION_LINKS
        .iter()
        .map(|(label, href, section)| {
            format!(
                r#"<a href="{href}" data-testid="nav-{section}" data-section="{section}"><span>{label}</span></a>
"#,
                href = href,
                section = section,
                label = escape_html(label),
            )
        })
        .collect();

    let methods: String = HTTP_METHODS
        .iter()
        .map(|(method, description)| {
            let lower = method.to_ascii_lowercase();
            format!(
                r#"<div class="panel" data-testid="http-method-{lower}" data-method="{method}">
<span>{method}</span>
<p>{description}</p>
<button type="button" data-testid="{lower}-button">Test {method}</button>
</div>
"#,
                lower = lower,
                method = method,
                description = description,
            )
        })
        .collect();

    let statuses: String = STATUS_CODES
        .iter()
        .map(|(code, name, description)| {
            format!(
                r#"<tr data-testid="status-{code}" data-code="{code}"><td>{code}</td><td>{name}</td><td>{description}</td></tr>
"#,
                code = code,
                name = name,
                description = description,
            )
        })
        .collect();

    let title = escape_html(TITLE);
    format!(
        r#"<header data-testid="page-header">
<h1 data-testid="main-heading">{title}</h1>
<p data-testid="main-description">A comprehensive testing service for HTTP methods, request/response handling, and web automation. Perfect for testing Playwright element extraction and web scraping capabilities.</p>
</header>
<nav class="panel" data-testid="main-navigation">
<h2>Navigation</h2>
{nav}</nav>
<section id="http-methods" data-testid="http-methods-section">
<h2>HTTP Methods</h2>
<p>Click on any HTTP method below to test different request types and see their responses.</p>
{methods}</section>
<section id="status-codes" data-testid="status-codes-section">
<h2>HTTP Status Codes</h2>
<table><thead><tr><th>Code</th><th>Name</th><th>Description</th></tr></thead>
<tbody>
{statuses}</tbody></table>
</section>
<section id="request-response" data-testid="request-examples">
<h2>Request &amp; Response Examples</h2>
<h3 data-testid="json-title">JSON Response Example</h3>
<pre data-testid="json-content">{json_example}</pre>
<h3 data-testid="form-title">Form Data Example</h3>
<pre data-testid="form-content">{form_example}</pre>
</section>
<section data-testid="links-collection">
<h2>Useful Links</h2>
<a href="/forms" data-testid="forms-link"><span>Form Testing</span></a>
<a href="/downloads" data-testid="downloads-link"><span>File Downloads</span></a>
<a href="/auth/basic" data-testid="auth-link"><span>Authentication</span></a>
</section>
<footer data-testid="page-footer">
<p>{title} &bull; Generated on {date}</p>
<span data-testid="page-url">URL: {path}</span>
<span data-testid="page-title">Title: {title}</span>
</footer>"#,
        title = title,
        nav = nav,
        methods = methods,
        statuses = statuses,
        json_example = escape_html(JSON_EXAMPLE),
        form_example = escape_html(FORM_EXAMPLE),
        date = Utc::now().format("%-m/%-d/%Y"),
        path = escape_html(path),
    )
}

pub async fn extraction_page_handler(OriginalUri(uri): OriginalUri) -> Html<String> {
    Html(layout("Element Extraction", "/extraction", &render(&uri.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_present() {
        let page = render("/extraction");
        for id in [
            "page-header",
            "main-heading",
            "main-navigation",
            "http-methods-section",
            "status-codes-section",
            "request-examples",
            "links-collection",
            "page-footer",
        ] {
            assert!(page.contains(&format!("data-testid=\"{}\"", id)), "missing {}", id);
        }
        assert_eq!(page.matches("data-testid=\"http-method-").count(), HTTP_METHODS.len());
        assert!(page.contains("data-testid=\"options-button\""));
        assert!(page.contains("data-testid=\"status-404\""));
        assert!(page.contains("HTTP Request &amp; Response Service"));
    }
}
