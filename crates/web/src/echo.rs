//! Request echo endpoints
//!
//! httpbin-style reflections of what the server received, for checking
//! what an automated browser actually sent.

use axum::extract::{Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use tracing::debug;

use crate::request::{is_truthy, iso_now, random_base36, BodyEncoding, FormPayload, RequestMeta};
use crate::server::SharedState;

/// Fields `/api/test/forms` insists on.
pub const REQUIRED_FORM_FIELDS: [&str; 5] = ["custname", "custtel", "custemail", "size", "delivery"];

pub async fn get_echo_handler(
    State(state): State<SharedState>,
    Query(args): Query<HashMap<String, String>>,
    meta: RequestMeta,
) -> Response {
    state.latency.pause(300, 0).await;

    let body = json!({
        "args": args,
        "headers": {
            "Accept": meta.header_or(header::ACCEPT, "*/*"),
            "Accept-Encoding": meta.header_or(header::ACCEPT_ENCODING, "gzip, deflate"),
            "Accept-Language": meta.header_or(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9"),
            "Host": meta.header_or(header::HOST, "localhost:3000"),
            "User-Agent": meta.user_agent,
            "X-Amzn-Trace-Id": format!("Root=1-{}", random_base36(9)),
        },
        "origin": meta.origin,
        "url": meta.url,
        "timestamp": iso_now(),
        "method": "GET",
        "json": null,
        "form": {},
        "files": {},
        "data": "",
    });

    let mut response = Json(body).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    response
}

/// Required fields that are absent or falsy, in declaration order.
pub fn missing_fields(fields: &Map<String, Value>) -> Vec<&'static str> {
    REQUIRED_FORM_FIELDS
        .iter()
        .copied()
        .filter(|name| !is_truthy(fields.get(*name)))
        .collect()
}

pub async fn form_echo_handler(
    State(state): State<SharedState>,
    meta: RequestMeta,
    payload: FormPayload,
) -> Response {
    state.latency.pause(500, 0).await;

    let missing = missing_fields(&payload.fields);
    if !missing.is_empty() {
        debug!("Form echo missing fields: {:?}", missing);
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "error": "Missing required fields",
                "missingFields": missing,
                "receivedData": payload.into_value(),
            })),
        )
            .into_response();
    }

    let content_type = meta.header_or(header::CONTENT_TYPE, "unknown");
    let as_json = match payload.encoding {
        BodyEncoding::Json => Value::Object(payload.fields.clone()),
        BodyEncoding::UrlEncoded => Value::Null,
    };

    Json(json!({
        "success": true,
        "timestamp": iso_now(),
        "method": "POST",
        "url": meta.url,
        "headers": {
            "Content-Type": content_type,
            "User-Agent": meta.header_or(header::USER_AGENT, "unknown"),
            "Accept": meta.header_or(header::ACCEPT, "unknown"),
        },
        "form": payload.into_value(),
        "args": {},
        "files": {},
        "origin": meta.origin,
        "json": as_json,
    }))
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_order_and_falsiness() {
        let fields = json!({
            "custname": "",
            "custtel": "555",
            "size": 0,
            "delivery": "evening",
        });
        assert_eq!(
            missing_fields(fields.as_object().unwrap()),
            vec!["custname", "custemail", "size"]
        );
    }

    #[test]
    fn test_nothing_missing() {
        let fields = json!({
            "custname": "A",
            "custtel": "1",
            "custemail": "a@b.co",
            "size": "small",
            "delivery": "morning",
        });
        assert!(missing_fields(fields.as_object().unwrap()).is_empty());
    }
}
