//! Multi-page navigation demo
//!
//! The current section comes from `?page=` and the visit history travels in
//! `?trail=`, so every state is a plain link.

use axum::extract::Query;
use axum::response::Html;
use chrono::SecondsFormat;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use super::{escape_html, layout};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Home,
    About,
    Services,
    Contact,
}

impl Section {
    pub const ALL: [Section; 4] = [Section::Home, Section::About, Section::Services, Section::Contact];

    pub fn key(&self) -> &'static str {
        match self {
            Section::Home => "home",
            Section::About => "about",
            Section::Services => "services",
            Section::Contact => "contact",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Section::Home => "Welcome to Navigation Test",
            Section::About => "About Our Service",
            Section::Services => "Our Testing Services",
            Section::Contact => "Contact Information",
        }
    }

    fn text(&self) -> &'static str {
        match self {
            Section::Home => "This is the homepage of our navigation test environment. Use the navigation menu to explore different pages and test multi-page navigation scenarios.",
            Section::About => "Learn about our comprehensive testing platform designed for automated browser testing. We provide various endpoints and pages to validate navigation workflows.",
            Section::Services => "We offer various testing scenarios including form interactions, file downloads, authentication flows, and element extraction capabilities.",
            Section::Contact => "Get in touch with our testing platform. This page demonstrates contact forms and information extraction scenarios.",
        }
    }

    fn data(&self) -> Value {
        match self {
            Section::Home => json!({
                "pageType": "homepage",
                "features": ["Navigation testing", "Multi-page flows", "Data extraction"],
                "lastUpdated": chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            }),
            Section::About => json!({
                "pageType": "about",
                "company": "MCPBench Testing",
                "founded": "2024",
                "mission": "Comprehensive automation testing",
            }),
            Section::Services => json!({
                "pageType": "services",
                "offerings": SERVICES,
                "pricing": "Free for testing",
            }),
            Section::Contact => json!({
                "pageType": "contact",
                "email": "test@mcpbench.local",
                "phone": "+1-555-TEST-123",
                "address": "123 Test Street, Automation City",
            }),
        }
    }
}

const SERVICES: [&str; 4] = ["Form Testing", "Download Testing", "Auth Testing", "Navigation Testing"];

const HISTORY_SHOWN: usize = 10;
const BREADCRUMBS_SHOWN: usize = 3;

#[derive(Debug, Default, Deserialize)]
pub struct NavigationQuery {
    pub page: Option<String>,
    pub trail: Option<String>,
}

/// Resolved page state: current section plus visits so far, current last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavState {
    pub current: Section,
    pub history: Vec<Section>,
}

impl NavState {
    pub fn from_query(query: &NavigationQuery) -> Self {
        let current = query
            .page
            .as_deref()
            .and_then(Section::from_key)
            .unwrap_or(Section::Home);

        let mut history: Vec<Section> = query
            .trail
            .as_deref()
            .unwrap_or("")
            .split(',')
            .filter_map(|k| Section::from_key(k.trim()))
            .collect();
        if history.last() != Some(&current) {
            history.push(current);
        }
        Self { current, history }
    }

    /// Most recent visits only, so links stay bounded.
    fn trail(&self) -> String {
        let start = self.history.len().saturating_sub(HISTORY_SHOWN);
        self.history[start..]
            .iter()
            .map(Section::key)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Link that visits `target` and records it in the history.
    pub fn link_to(&self, target: Section) -> String {
        format!("/navigation?page={}&trail={}", target.key(), self.trail())
    }
}

fn section_list(sections: &[Section]) -> String {
    sections
        .iter()
        .map(|s| format!("<span>{}</span>", s.title()))
        .collect::<Vec<_>>()
        .join(" &rarr; ")
}

fn page_json(section: Section) -> String {
    match serde_json::to_string_pretty(&section.data()) {
        Ok(json) => json,
        Err(e) => {
            warn!("Failed to serialize {} page data: {}", section.key(), e);
            "{}".to_string()
        }
    }
}

fn render(state: &NavState) -> String {
    let nav: String = Section::ALL
        .iter()
        .map(|s| {
            let class = if *s == state.current { " class=\"active\"" } else { "" };
            let label = s.title().split(' ').next().unwrap_or_default();
            format!(
                r#"<a href="{}"{} data-testid="nav-{}">{}</a>
"#,
                escape_html(&state.link_to(*s)),
                class,
                s.key(),
                label
            )
        })
        .collect();

    let start = state.history.len().saturating_sub(BREADCRUMBS_SHOWN);
    let breadcrumbs = section_list(&state.history[start..]);

    let extra = match state.current {
        Section::Home => format!(
            r#"<div class="panel">
<h3>Quick Navigation</h3>
<a href="{}" data-testid="quick-nav-services">Explore Services</a>
<a href="{}" data-testid="quick-nav-contact">Contact Us</a>
</div>"#,
            escape_html(&state.link_to(Section::Services)),
            escape_html(&state.link_to(Section::Contact)),
        ),
        Section::Services => {
            let items: String = SERVICES
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    format!(
                        r#"<div class="panel" data-testid="service-{}"><strong>{}</strong><p>Comprehensive testing scenarios</p></div>
"#,
                        i, name
                    )
                })
                .collect();
            format!("<div class=\"panel\">\n<h3>Service Details</h3>\n{}</div>", items)
        }
        Section::Contact => r#"<div class="panel">
<h3>Contact Form</h3>
<div class="field"><label>Name</label><input type="text" placeholder="Your name" data-testid="contact-name"></div>
<div class="field"><label>Email</label><input type="email" placeholder="your.email@example.com" data-testid="contact-email"></div>
<div class="field"><label>Message</label><textarea rows="4" placeholder="Your message here..." data-testid="contact-message"></textarea></div>
<button type="button" data-testid="contact-submit">Send Message</button>
</div>"#
            .to_string(),
        Section::About => String::new(),
    };

    let page_json = page_json(state.current);

    let hist_start = state.history.len().saturating_sub(HISTORY_SHOWN);
    let history: String = state.history[hist_start..]
        .iter()
        .map(|s| format!("<div>{}</div>\n", s.title()))
        .collect();

    format!(
        r#"<h1 data-testid="navigation-heading">Web Navigation Test Environment</h1>
<p>Test multi-page navigation, link following, and data extraction across different page types.</p>
<nav class="panel" data-testid="main-navigation">
<h2>Site Navigation</h2>
<p>Pages visited: <span data-testid="visit-count">{visits}</span></p>
{nav}</nav>
<div data-testid="breadcrumbs"><span>Navigation path:</span> {breadcrumbs}</div>
<div class="panel" data-testid="page-content" data-page="{key}">
<h1 data-testid="page-title">{title}</h1>
<div data-testid="page-text"><p>{text}</p></div>
<button type="button" data-testid="extract-data-btn">Extract Page Data</button>
<button type="button" data-testid="view-source-btn">View Page Source</button>
</div>
{extra}
<div class="panel">
<h3>Page Data (JSON)</h3>
<pre data-testid="page-json-data">{page_json}</pre>
</div>
<div class="panel">
<h3>External Links</h3>
<a href="/forms" data-testid="external-forms">Form Testing Page</a>
<a href="/downloads" data-testid="external-downloads">Download Testing Page</a>
<a href="/auth/basic" data-testid="external-auth">Auth Testing Page</a>
</div>
<div class="panel">
<h3>Visit History</h3>
<div data-testid="visit-history">
{history}</div>
<a href="/navigation?page={key}" data-testid="clear-history">Clear History</a>
</div>"#,
        visits = state.history.len(),
        nav = nav,
        breadcrumbs = breadcrumbs,
        key = state.current.key(),
        title = state.current.title(),
        text = state.current.text(),
        extra = extra,
        page_json = escape_html(&page_json),
        history = history,
    )
}

pub async fn navigation_page_handler(Query(query): Query<NavigationQuery>) -> Html<String> {
    let state = NavState::from_query(&query);
    Html(layout("Web Navigation", "/navigation", &render(&state)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>, trail: Option<&str>) -> NavigationQuery {
        NavigationQuery {
            page: page.map(str::to_string),
            trail: trail.map(str::to_string),
        }
    }

    #[test]
    fn test_default_is_home() {
        let state = NavState::from_query(&NavigationQuery::default());
        assert_eq!(state.current, Section::Home);
        assert_eq!(state.history, vec![Section::Home]);
    }

    #[test]
    fn test_unknown_page_falls_back_to_home() {
        let state = NavState::from_query(&query(Some("pricing"), None));
        assert_eq!(state.current, Section::Home);
    }

    #[test]
    fn test_trail_accumulates() {
        let state = NavState::from_query(&query(Some("contact"), Some("home,services,bogus")));
        assert_eq!(
            state.history,
            vec![Section::Home, Section::Services, Section::Contact]
        );
        assert_eq!(
            state.link_to(Section::About),
            "/navigation?page=about&trail=home,services,contact"
        );
    }

    #[test]
    fn test_section_specific_content() {
        let services = render(&NavState::from_query(&query(Some("services"), None)));
        assert!(services.contains("data-testid=\"service-3\""));
        assert!(services.contains("Navigation Testing"));

        let contact = render(&NavState::from_query(&query(Some("contact"), None)));
        assert!(contact.contains("data-testid=\"contact-submit\""));
        assert!(contact.contains("test@mcpbench.local"));

        let home = render(&NavState::from_query(&query(None, None)));
        assert!(home.contains("data-testid=\"quick-nav-services\""));
        assert!(home.contains("<h1 data-testid=\"page-title\">Welcome to Navigation Test</h1>"));
    }

    #[test]
    fn test_breadcrumbs_show_last_three() {
        let state = NavState::from_query(&query(Some("home"), Some("about,services,contact")));
        let page = render(&state);
        let start = page.find("data-testid=\"breadcrumbs\"").unwrap();
        let crumbs = &page[start..start + page[start..].find("</div>").unwrap()];
        assert!(!crumbs.contains("About Our Service"));
        assert!(crumbs.contains("Our Testing Services"));
        assert!(crumbs.contains("Welcome to Navigation Test"));
    }

    #[test]
    fn test_long_trail_is_truncated() {
        let trail = ["home", "about"].repeat(10).join(",");
        let state = NavState::from_query(&query(Some("services"), Some(&trail)));
        let link = state.link_to(Section::Contact);
        let kept = link.split("trail=").nth(1).unwrap();
        let keys: Vec<_> = kept.split(',').collect();
        assert_eq!(keys.len(), HISTORY_SHOWN);
        assert_eq!(keys.last(), Some(&"services"));

        let next = NavState::from_query(&query(Some("contact"), Some(kept)));
        assert_eq!(next.history.len(), HISTORY_SHOWN + 1);
    }

    #[test]
    fn test_page_json_is_rendered() {
        let json = page_json(Section::About);
        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["company"], "MCPBench Testing");
        assert!(render(&NavState::from_query(&query(Some("about"), None)))
            .contains("&quot;pageType&quot;: &quot;about&quot;"));
    }
}
