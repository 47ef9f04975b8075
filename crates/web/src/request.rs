//! Request decoding shared by the API handlers

use axum::extract::{FromRequest, FromRequestParts, OriginalUri, Request};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use chrono::{SecondsFormat, Utc};
use rand::Rng;
use serde_json::{json, Map, Value};

/// How the body of a [`FormPayload`] was encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    Json,
    UrlEncoded,
}

/// Request body decoded into a string-keyed map, from either JSON or
/// `application/x-www-form-urlencoded`.
#[derive(Debug, Clone)]
pub struct FormPayload {
    pub fields: Map<String, Value>,
    pub encoding: BodyEncoding,
}

impl FormPayload {
    /// String value of `name`, if present and a string.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Raw value of `name`, `null` when absent.
    pub fn value(&self, name: &str) -> Value {
        self.fields.get(name).cloned().unwrap_or(Value::Null)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

fn bad_request(error: &str, message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": error, "message": message })),
    )
        .into_response()
}

#[axum::async_trait]
impl<S> FromRequest<S> for FormPayload
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        if content_type.contains("application/json") {
            let Json(value) = Json::<Value>::from_request(req, state)
                .await
                .map_err(|e| bad_request("Invalid request body", e.body_text()))?;
            match value {
                Value::Object(fields) => Ok(Self {
                    fields,
                    encoding: BodyEncoding::Json,
                }),
                other => Err(bad_request(
                    "Invalid request body",
                    format!("expected a JSON object, got {}", json_kind(&other)),
                )),
            }
        } else if content_type.contains("application/x-www-form-urlencoded") {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| bad_request("Invalid request body", e.body_text()))?;
            // Repeated keys: last one wins.
            let fields = pairs
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect();
            Ok(Self {
                fields,
                encoding: BodyEncoding::UrlEncoded,
            })
        } else {
            Err((
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Unsupported content type" })),
            )
                .into_response())
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Caller details the mock APIs echo back.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub method: String,
    pub url: String,
    pub origin: String,
    pub user_agent: String,
    pub headers: HeaderMap,
}

impl RequestMeta {
    pub fn header_or(&self, name: header::HeaderName, default: &str) -> String {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(default)
            .to_string()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for RequestMeta
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let headers = parts.headers.clone();
        let host = headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("localhost");
        // Nested routers see a stripped path; report what the client asked for.
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map(|original| original.0.clone())
            .unwrap_or_else(|| parts.uri.clone());
        let url = format!("http://{}{}", host, uri);
        let origin = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("127.0.0.1")
            .to_string();
        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("Unknown")
            .to_string();

        Ok(Self {
            method: parts.method.to_string(),
            url,
            origin,
            user_agent,
            headers,
        })
    }
}

/// JavaScript-style truthiness of a decoded field.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map_or(true, |f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Random lowercase base-36 string.
pub fn random_base36(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// Current time as `2024-01-01T00:00:00.000Z`.
pub fn iso_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    async fn decode(content_type: Option<&str>, body: &'static str) -> Result<FormPayload, Response> {
        let mut builder = axum::http::Request::builder().method("POST").uri("/");
        if let Some(ct) = content_type {
            builder = builder.header(header::CONTENT_TYPE, ct);
        }
        let req = builder.body(Body::from(body)).unwrap();
        FormPayload::from_request(req, &()).await
    }

    #[tokio::test]
    async fn test_json_object() {
        let payload = decode(Some("application/json"), r#"{"custname":"Ann","size":3}"#)
            .await
            .unwrap();
        assert_eq!(payload.encoding, BodyEncoding::Json);
        assert_eq!(payload.text("custname"), Some("Ann"));
        assert_eq!(payload.text("size"), None);
        assert_eq!(payload.value("size"), json!(3));
        assert_eq!(payload.value("missing"), Value::Null);
    }

    #[tokio::test]
    async fn test_json_with_charset() {
        let payload = decode(Some("application/json; charset=utf-8"), r#"{"a":"b"}"#)
            .await
            .unwrap();
        assert_eq!(payload.text("a"), Some("b"));
    }

    #[tokio::test]
    async fn test_json_non_object_rejected() {
        let err = decode(Some("application/json"), "[1,2]").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_json_rejected() {
        let err = decode(Some("application/json"), "{nope").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_urlencoded() {
        let payload = decode(
            Some("application/x-www-form-urlencoded"),
            "custname=John+Doe&comments=&size=small&size=large",
        )
        .await
        .unwrap();
        assert_eq!(payload.encoding, BodyEncoding::UrlEncoded);
        assert_eq!(payload.text("custname"), Some("John Doe"));
        assert_eq!(payload.text("comments"), Some(""));
        assert_eq!(payload.text("size"), Some("large"));
    }

    #[tokio::test]
    async fn test_unsupported_content_type() {
        let err = decode(Some("text/plain"), "hello").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let err = decode(None, "hello").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(None));
        assert!(!is_truthy(Some(&json!(null))));
        assert!(!is_truthy(Some(&json!(""))));
        assert!(!is_truthy(Some(&json!(0))));
        assert!(!is_truthy(Some(&json!(false))));
        assert!(is_truthy(Some(&json!("x"))));
        assert!(is_truthy(Some(&json!(1))));
        assert!(is_truthy(Some(&json!([]))));
    }

    #[test]
    fn test_random_base36() {
        let token = random_base36(9);
        assert_eq!(token.len(), 9);
        assert!(token.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_iso_now_shape() {
        let now = iso_now();
        assert!(now.ends_with('Z'));
        assert_eq!(now.len(), "2024-01-01T00:00:00.000Z".len());
    }
}
