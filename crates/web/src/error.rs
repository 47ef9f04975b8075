//! HTTP mapping for the common error taxonomy

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mcpbench_common::Error;
use serde_json::json;
use tracing::{debug, warn};

/// Error returned by the submission handlers.
///
/// Storage failures are logged and replaced by `public_message`; the
/// underlying error never reaches the client.
#[derive(Debug)]
pub struct ApiError {
    inner: Error,
    public_message: &'static str,
}

impl ApiError {
    pub fn new(inner: Error, public_message: &'static str) -> Self {
        Self {
            inner,
            public_message,
        }
    }

    pub fn status(&self) -> StatusCode {
        status_for(&self.inner)
    }
}

impl From<Error> for ApiError {
    fn from(inner: Error) -> Self {
        Self::new(inner, "Internal server error")
    }
}

/// Status code for each error class.
pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::Validation(_) | Error::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        Error::NotFound { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// First letter upper-cased, the rest untouched.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self.inner {
            Error::Validation(v) => {
                debug!("Rejected submission: {}", v);
                json!({
                    "success": false,
                    "error": "Validation failed",
                    "fields": v.violations,
                })
            }
            Error::NotFound { kind, .. } => {
                debug!("{}", self.inner);
                json!({
                    "success": false,
                    "error": format!("{} not found", capitalize(kind)),
                })
            }
            Error::InvalidArgument(message) => {
                debug!("{}", self.inner);
                json!({
                    "success": false,
                    "error": "Invalid argument",
                    "message": message,
                })
            }
            other => {
                warn!("{}: {}", self.public_message, other);
                json!({
                    "success": false,
                    "error": self.public_message,
                })
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpbench_common::validate_submission;

    #[test]
    fn test_status_mapping() {
        let validation = validate_submission(&serde_json::Map::new()).unwrap_err();
        assert_eq!(status_for(&Error::from(validation)), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&Error::not_found("submission", 9)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&Error::InvalidArgument("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&Error::from(io_failure())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    fn io_failure() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::Other, "disk unplugged")
    }

    #[test]
    fn test_storage_message_is_generic() {
        let err = ApiError::new(
            Error::from(io_failure()),
            "Failed to save form submission",
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("submission"), "Submission");
        assert_eq!(capitalize(""), "");
    }
}
