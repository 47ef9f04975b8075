//! Customer submission API
//!
//! `POST /api/submissions` validates and stores a record,
//! `GET /api/submissions/:id` reads it back.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::SecondsFormat;
use mcpbench_common::{
    parse_submission_id, validate_submission, CreatedSubmission, CustomerSubmission, Result,
    SubmissionStore,
};
use serde_json::{json, Map, Value};
use tracing::info;

use crate::error::ApiError;
use crate::request::FormPayload;
use crate::server::SharedState;

pub const SAVE_FAILED: &str = "Failed to save form submission";
pub const FETCH_FAILED: &str = "Failed to fetch submission";

/// Validate raw fields and persist the result.
pub fn submit(store: &dyn SubmissionStore, fields: &Map<String, Value>) -> Result<CreatedSubmission> {
    let record = validate_submission(fields)?;
    let created = store.create(&record)?;
    info!("Stored submission {} for {}", created.id, record.custemail);
    Ok(created)
}

/// Parse a textual id and fetch the record.
pub fn lookup(store: &dyn SubmissionStore, raw_id: &str) -> Result<CustomerSubmission> {
    let id = parse_submission_id(raw_id)?;
    store.get_by_id(id)
}

pub async fn create_submission_handler(
    State(state): State<SharedState>,
    payload: FormPayload,
) -> std::result::Result<impl IntoResponse, ApiError> {
    let created = submit(state.store.as_ref(), &payload.fields)
        .map_err(|e| ApiError::new(e, SAVE_FAILED))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "submissionId": created.id,
            "timestamp": created.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        })),
    ))
}

pub async fn get_submission_handler(
    State(state): State<SharedState>,
    Path(raw_id): Path<String>,
) -> std::result::Result<Json<Value>, ApiError> {
    let submission =
        lookup(state.store.as_ref(), &raw_id).map_err(|e| ApiError::new(e, FETCH_FAILED))?;

    Ok(Json(json!({
        "success": true,
        "submission": submission,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpbench_common::{Database, Error, SqliteSubmissionStore};

    fn store() -> SqliteSubmissionStore {
        SqliteSubmissionStore::new(Database::open_memory().unwrap())
    }

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_submit_then_lookup() {
        let store = store();
        let created = submit(
            &store,
            &fields(json!({
                "custname": "Ann Lee",
                "custtel": "555-0100",
                "custemail": "ann@example.org",
                "size": "small",
                "delivery": "morning",
                "comments": "Ring twice",
            })),
        )
        .unwrap();

        let fetched = lookup(&store, &created.id.to_string()).unwrap();
        assert_eq!(fetched.custname, "Ann Lee");
        assert_eq!(fetched.comments.as_deref(), Some("Ring twice"));
    }

    #[test]
    fn test_submit_invalid_stores_nothing() {
        let store = store();
        let err = submit(&store, &fields(json!({"custname": "Ann"}))).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(matches!(lookup(&store, "1"), Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_lookup_bad_id() {
        let store = store();
        assert!(matches!(lookup(&store, "abc"), Err(Error::InvalidArgument(_))));
        assert!(matches!(lookup(&store, "0"), Err(Error::InvalidArgument(_))));
    }
}
