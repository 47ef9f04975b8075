//! Mock authentication endpoints
//!
//! Nothing here is a real session. Credentials come from config and the
//! challenge checks are length/substring tests.

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{Duration, SecondsFormat, Utc};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::request::{iso_now, random_base36, FormPayload, RequestMeta};
use crate::server::SharedState;

/// Cloudflare's always-interactive test sitekey.
pub const TURNSTILE_SITEKEY: &str = "1x00000000000000000000AA";

const SESSION_TTL_SECS: i64 = 3600;
const MIN_CAPTCHA_LEN: usize = 6;

fn new_session_id() -> String {
    format!("sess_{}", random_base36(9))
}

fn expires_at() -> String {
    (Utc::now() + Duration::seconds(SESSION_TTL_SECS)).to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn session_cookie(session_id: &str) -> String {
    format!(
        "session={}; HttpOnly; Secure; SameSite=Strict; Max-Age={}",
        session_id, SESSION_TTL_SECS
    )
}

/// Extend a JSON object with the members of another.
fn merged(mut base: Value, extra: Value) -> Value {
    if let (Some(base), Value::Object(extra)) = (base.as_object_mut(), extra) {
        base.extend(extra);
    }
    base
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn reply_with_session(body: Value, session_id: &str) -> Response {
    (
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(session_id))],
        Json(body),
    )
        .into_response()
}

fn denied(status: StatusCode, base: Value, error: &str, message: &str) -> Response {
    reply(
        status,
        merged(
            base,
            json!({
                "success": false,
                "error": error,
                "message": message,
                "authenticated": false,
            }),
        ),
    )
}

/// Value of the `session` cookie, if any.
pub fn session_from_cookies(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().strip_prefix("session="))
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Mock challenge-token check: test tokens carry `DUMMY`, anything longer
/// than 20 characters passes too.
pub fn challenge_token_accepted(token: &str) -> bool {
    token.contains("DUMMY") || token.chars().count() > 20
}

pub async fn login_handler(
    State(state): State<SharedState>,
    meta: RequestMeta,
    payload: FormPayload,
) -> Response {
    state.latency.pause(1000, 1000).await;

    let auth_type = payload.text("authType").unwrap_or("basic").to_string();
    let username = payload.text("username");
    let password = payload.text("password");

    let base = json!({
        "timestamp": iso_now(),
        "method": "POST",
        "url": meta.url,
        "authType": auth_type,
        "username": payload.value("username"),
        "origin": meta.origin,
        "userAgent": meta.user_agent,
    });

    if auth_type == "challenge" {
        if let Some(captcha) = payload.text("captcha").filter(|c| !c.is_empty()) {
            if captcha.chars().count() < MIN_CAPTCHA_LEN {
                debug!("Rejected login for {:?}: short captcha", username);
                return denied(
                    StatusCode::UNAUTHORIZED,
                    base,
                    "CAPTCHA verification failed",
                    "Please complete the CAPTCHA challenge",
                );
            }
        }
    }

    if !state.credentials.matches(username, password) {
        debug!("Rejected login for {:?}: bad credentials", username);
        return denied(
            StatusCode::UNAUTHORIZED,
            base,
            "Authentication failed",
            "Invalid username or password",
        );
    }

    let session_id = new_session_id();
    info!("Mock login succeeded ({}), session {}", auth_type, session_id);
    let body = merged(
        base,
        json!({
            "success": true,
            "message": "Authentication successful",
            "authenticated": true,
            "session": {
                "sessionId": session_id,
                "expiresAt": expires_at(),
                "permissions": ["read", "write"],
                "role": "user",
            },
            "user": {
                "id": "user_123",
                "username": state.credentials.username,
                "email": "testuser@example.com",
                "firstName": "Test",
                "lastName": "User",
                "lastLogin": iso_now(),
            },
        }),
    );
    reply_with_session(body, &session_id)
}

pub async fn session_status_handler(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    match session_from_cookies(&headers) {
        Some(session_id) => reply(
            StatusCode::OK,
            json!({
                "authenticated": true,
                "session": {
                    "sessionId": session_id,
                    "status": "active",
                },
                "user": {
                    "username": state.credentials.username,
                    "email": "testuser@example.com",
                },
            }),
        ),
        None => reply(
            StatusCode::UNAUTHORIZED,
            json!({
                "authenticated": false,
                "message": "No active session found",
            }),
        ),
    }
}

pub async fn turnstile_login_handler(
    State(state): State<SharedState>,
    meta: RequestMeta,
    payload: FormPayload,
) -> Response {
    state.latency.pause(1500, 0).await;

    let token = payload.text("cf-turnstile-response").filter(|t| !t.is_empty());
    let verified = match token {
        Some(token) => {
            state.latency.pause(300, 0).await;
            challenge_token_accepted(token)
        }
        None => false,
    };

    let username = payload.text("username");
    let password = payload.text("password");
    let base = json!({
        "timestamp": iso_now(),
        "method": "POST",
        "url": meta.url,
        "authType": "turnstile",
        "username": payload.value("username"),
        "origin": meta.origin,
        "userAgent": meta.user_agent,
        "turnstileVerified": verified,
    });

    if token.is_none() {
        return denied(
            StatusCode::BAD_REQUEST,
            base,
            "Security challenge required",
            "Please complete the Turnstile challenge",
        );
    }
    if !verified {
        return denied(
            StatusCode::FORBIDDEN,
            base,
            "Security challenge failed",
            "Turnstile verification failed. Please try again.",
        );
    }
    if !state.credentials.matches(username, password) {
        return denied(
            StatusCode::UNAUTHORIZED,
            base,
            "Authentication failed",
            "Invalid username or password",
        );
    }

    let session_id = new_session_id();
    info!("Mock turnstile login succeeded, session {}", session_id);
    let body = merged(
        base,
        json!({
            "success": true,
            "message": "Authentication successful with security verification",
            "authenticated": true,
            "session": {
                "sessionId": session_id,
                "expiresAt": expires_at(),
                "permissions": ["read", "write"],
                "role": "user",
                "securityLevel": "turnstile-verified",
            },
            "user": {
                "id": "user_123",
                "username": state.credentials.username,
                "email": "testuser@example.com",
                "firstName": "Test",
                "lastName": "User",
                "lastLogin": iso_now(),
                "verificationMethod": "turnstile",
            },
            "turnstileDetails": {
                "verified": true,
                "timestamp": iso_now(),
                "challengeType": "non-interactive",
            },
        }),
    );
    reply_with_session(body, &session_id)
}

pub async fn turnstile_config_handler() -> Json<Value> {
    Json(json!({
        "turnstile": {
            "enabled": true,
            "sitekey": TURNSTILE_SITEKEY,
            "mode": "test",
            "widget": {
                "type": "visible",
                "theme": "auto",
                "size": "normal",
            },
        },
        "message": "Use POST method to authenticate with Turnstile verification",
    }))
}
