use axum::response::Html;

use super::{escape_html, layout};
use crate::downloads::{human_size, MockFile, CATALOG};

fn render_item(file: &MockFile) -> String {
    let action = if file.is_served() {
        format!(
            r#"<a href="/api/test/downloads/{id}" download="{name}" data-testid="download-button-{id}">Download</a>"#,
            id = file.id,
            name = escape_html(file.name),
        )
    } else {
        format!(
            r#"<button type="button" disabled data-testid="download-button-{}">Unavailable</button>"#,
            file.id
        )
    };

    format!(
        r#"<div class="panel" data-testid="download-item-{id}" data-file-name="{name}">
<strong>{name}</strong>
<p>{description}</p>
<p><span data-testid="file-type-{id}">{type_label}</span> &middot; <span data-testid="file-size-{id}">{size}</span></p>
{action}
</div>
"#,
        id = file.id,
        name = escape_html(file.name),
        description = escape_html(file.description),
        type_label = file.type_label,
        size = human_size(file.nominal_size),
        action = action,
    )
}

pub async fn downloads_page_handler() -> Html<String> {
    let total: u64 = CATALOG.iter().map(|f| f.nominal_size).sum();
    let items: String = CATALOG.iter().map(render_item).collect();

    let content = format!(
        r#"<h1 data-testid="downloads-heading">File Download Test Center</h1>
<p>Test file download capabilities with various file types and sizes.</p>
<div class="panel" data-testid="download-stats">
<span data-testid="total-files">{count} files</span> &middot; <span data-testid="total-size">{total}</span>
</div>
<div data-testid="download-list">
{items}</div>"#,
        count = CATALOG.len(),
        total = human_size(total),
        items = items,
    );
    Html(layout("File Downloads", "/downloads", &content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_every_entry_listed() {
        let Html(page) = downloads_page_handler().await;
        for file in CATALOG {
            assert!(page.contains(&format!("data-testid=\"download-item-{}\"", file.id)));
            assert!(page.contains(&format!("data-testid=\"download-button-{}\"", file.id)));
        }
        assert!(page.contains(r#"href="/api/test/downloads/sample-pdf""#));
        assert!(!page.contains(r#"href="/api/test/downloads/sample-video""#));
    }
}
