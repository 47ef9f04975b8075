//! Login demo pages
//!
//! Each page posts JSON to the mock auth API from a small inline script and
//! renders the outcome into its `*-auth-result` element.

use axum::extract::State;
use axum::response::Html;
use rand::Rng;

use super::{escape_html, layout};
use crate::config::Credentials;
use crate::mock_auth::TURNSTILE_SITEKEY;
use crate::server::SharedState;

/// Which login flow a page demonstrates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginKind {
    Basic,
    Form,
    Challenge,
    Turnstile,
}

impl LoginKind {
    /// Prefix of the page's test ids.
    fn prefix(&self) -> &'static str {
        match self {
            LoginKind::Basic => "basic",
            LoginKind::Form => "form",
            LoginKind::Challenge => "challenge",
            LoginKind::Turnstile => "turnstile",
        }
    }

    fn heading(&self) -> &'static str {
        match self {
            LoginKind::Basic => "Basic Authentication",
            LoginKind::Form => "Login Form",
            LoginKind::Challenge => "Challenge Authentication",
            LoginKind::Turnstile => "Secure Sign In",
        }
    }

    fn href(&self) -> &'static str {
        match self {
            LoginKind::Basic => "/auth/basic",
            LoginKind::Form => "/auth/form",
            LoginKind::Challenge => "/auth/challenge",
            LoginKind::Turnstile => "/auth/turnstile",
        }
    }

    fn endpoint(&self) -> &'static str {
        match self {
            LoginKind::Turnstile => "/api/test/auth-turnstile",
            _ => "/api/test/auth",
        }
    }
}

const CAPTCHA_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Six random uppercase alphanumerics.
pub fn new_captcha() -> String {
    let mut rng = rand::thread_rng();
    (0..6)
        .map(|_| CAPTCHA_CHARS[rng.gen_range(0..CAPTCHA_CHARS.len())] as char)
        .collect()
}

fn credential_fields(prefix: &str) -> String {
    format!(
        r#"<div class="field">
<label for="{p}-username">Username</label>
<input id="{p}-username" name="username" type="text" placeholder="Enter username" data-testid="{p}-username-input">
</div>
<div class="field">
<label for="{p}-password">Password</label>
<input id="{p}-password" name="password" type="password" placeholder="Enter password" data-testid="{p}-password-input">
</div>
"#,
        p = prefix
    )
}

fn script(kind: LoginKind) -> String {
    let p = kind.prefix();
    let extra_fields = match kind {
        LoginKind::Challenge => {
            r#"const shown = document.querySelector('[data-testid="captcha-display"]').textContent.trim();
      const typed = document.getElementById('captcha').value;
      if (typed.toUpperCase() !== shown) {
        show(false, 'CAPTCHA verification failed. Please try again.');
        return;
      }
      body.captcha = typed;"#
        }
        LoginKind::Turnstile => {
            r#"const token = document.querySelector('[name="cf-turnstile-response"]');
      body['cf-turnstile-response'] = token ? token.value : '';"#
        }
        _ => "",
    };

    format!(
        r#"<script>
(function () {{
  const form = document.querySelector('[data-testid="{p}-auth-form"]');
  const result = document.querySelector('[data-testid="{p}-auth-result"]');
  function show(ok, message) {{
    result.hidden = false;
    result.className = 'panel ' + (ok ? 'success' : 'failure');
    result.textContent = message;
  }}
  form.addEventListener('submit', async function (event) {{
    event.preventDefault();
    const body = {{
      username: document.getElementById('{p}-username').value,
      password: document.getElementById('{p}-password').value,
      authType: '{p}'
    }};
    {extra}
    const response = await fetch('{endpoint}', {{
      method: 'POST',
      headers: {{ 'Content-Type': 'application/json' }},
      body: JSON.stringify(body)
    }});
    const data = await response.json();
    show(data.success === true, data.message || data.error);
  }});
}})();
</script>"#,
        p = p,
        extra = extra_fields,
        endpoint = kind.endpoint(),
    )
}

/// Full page body for one login flow.
pub fn render(kind: LoginKind, captcha: &str, credentials: &Credentials) -> String {
    let p = kind.prefix();
    let challenge = match kind {
        LoginKind::Challenge => format!(
            r#"<div class="field">
<label for="captcha">CAPTCHA Verification</label>
<code data-testid="captcha-display">{}</code>
<a href="/auth/challenge" data-testid="captcha-refresh">Refresh</a>
<input id="captcha" name="captcha" type="text" placeholder="Enter CAPTCHA code" data-testid="captcha-input">
</div>
"#,
            escape_html(captcha)
        ),
        LoginKind::Turnstile => format!(
            r#"<div class="field">
<label>Security Challenge</label>
<div class="cf-turnstile" data-sitekey="{}" data-testid="turnstile-widget"></div>
</div>
"#,
            TURNSTILE_SITEKEY
        ),
        _ => String::new(),
    };

    let footer = match kind {
        LoginKind::Turnstile => concat!(
            r#"<p>Using test sitekey (interactive challenge required)</p>"#,
            "\n",
            r#"<script src="https://challenges.cloudflare.com/turnstile/v0/api.js" async defer></script>"#
        ),
        _ => "",
    };

    format!(
        r#"<h1>{heading}</h1>
<form class="panel" data-testid="{p}-auth-form">
{credentials}{challenge}<button type="submit" data-testid="{p}-auth-submit">Sign In</button>
</form>
<div class="panel" hidden data-testid="{p}-auth-result"></div>
<p data-testid="test-credentials">Test credentials: <code>{username}</code> / <code>{password}</code></p>
{footer}
{script}"#,
        heading = kind.heading(),
        p = p,
        credentials = credential_fields(p),
        challenge = challenge,
        username = escape_html(&credentials.username),
        password = escape_html(&credentials.password),
        footer = footer,
        script = script(kind),
    )
}

fn page(kind: LoginKind, captcha: &str, credentials: &Credentials) -> Html<String> {
    Html(layout(kind.heading(), kind.href(), &render(kind, captcha, credentials)))
}

pub async fn basic_page_handler(State(state): State<SharedState>) -> Html<String> {
    page(LoginKind::Basic, "", &state.credentials)
}

pub async fn form_page_handler(State(state): State<SharedState>) -> Html<String> {
    page(LoginKind::Form, "", &state.credentials)
}

pub async fn challenge_page_handler(State(state): State<SharedState>) -> Html<String> {
    page(LoginKind::Challenge, &new_captcha(), &state.credentials)
}

pub async fn turnstile_page_handler(State(state): State<SharedState>) -> Html<String> {
    page(LoginKind::Turnstile, "", &state.credentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_ids_per_kind() {
        for kind in [
            LoginKind::Basic,
            LoginKind::Form,
            LoginKind::Challenge,
            LoginKind::Turnstile,
        ] {
            let body = render(kind, "ABC123", &Credentials::default());
            let p = kind.prefix();
            for suffix in ["auth-form", "username-input", "password-input", "auth-submit", "auth-result"] {
                let id = format!("data-testid=\"{}-{}\"", p, suffix);
                assert!(body.contains(&id), "{:?} missing {}", kind, id);
            }
        }
    }

    #[test]
    fn test_challenge_shows_captcha() {
        let body = render(LoginKind::Challenge, "XY7Q2Z", &Credentials::default());
        assert!(body.contains(r#"<code data-testid="captcha-display">XY7Q2Z</code>"#));
        assert!(body.contains("data-testid=\"captcha-input\""));
    }

    #[test]
    fn test_turnstile_widget_uses_test_sitekey() {
        let body = render(LoginKind::Turnstile, "", &Credentials::default());
        assert!(body.contains(TURNSTILE_SITEKEY));
        assert!(body.contains("/api/test/auth-turnstile"));
    }

    #[test]
    fn test_captcha_shape() {
        let captcha = new_captcha();
        assert_eq!(captcha.len(), 6);
        assert!(captcha.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }
}
