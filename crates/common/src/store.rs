//! Customer submission persistence
//!
//! One table, insert-and-return-id plus point lookup. Records are never
//! updated or deleted.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use crate::submission::{CustomerSubmission, DeliveryWindow, NewSubmission, Size};
use crate::{Database, Error, Result};

/// Identifier and timestamp assigned by [`SubmissionStore::create`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedSubmission {
    pub id: i64,
    pub created_at: DateTime<Utc>,
}

/// Narrow storage seam for submissions.
pub trait SubmissionStore: Send + Sync {
    /// Persist a validated record, assigning its id and creation time.
    fn create(&self, record: &NewSubmission) -> Result<CreatedSubmission>;

    /// Fetch one record. Fails with `InvalidArgument` for `id <= 0` and
    /// `NotFound` when no row has that id.
    fn get_by_id(&self, id: i64) -> Result<CustomerSubmission>;
}

/// Parse an id that arrived as text (URL segment, form value).
pub fn parse_submission_id(raw: &str) -> Result<i64> {
    let id: i64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::InvalidArgument(format!("submission id must be an integer: {:?}", raw)))?;
    ensure_positive(id)?;
    Ok(id)
}

fn ensure_positive(id: i64) -> Result<()> {
    if id <= 0 {
        return Err(Error::InvalidArgument(format!(
            "submission id must be positive (got {})",
            id
        )));
    }
    Ok(())
}

fn now_epoch_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn millis_to_datetime(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| Error::Internal(format!("stored timestamp out of range: {}", millis)))
}

/// SQLite-backed [`SubmissionStore`].
#[derive(Clone)]
pub struct SqliteSubmissionStore {
    db: Database,
}

/// Row as stored, before enum and timestamp decoding.
struct RawSubmission {
    id: i64,
    custname: String,
    custtel: String,
    custemail: String,
    size: String,
    delivery: String,
    comments: Option<String>,
    created_at: i64,
}

impl RawSubmission {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            custname: row.get(1)?,
            custtel: row.get(2)?,
            custemail: row.get(3)?,
            size: row.get(4)?,
            delivery: row.get(5)?,
            comments: row.get(6)?,
            created_at: row.get(7)?,
        })
    }

    fn parse(self) -> Result<CustomerSubmission> {
        Ok(CustomerSubmission {
            id: self.id,
            custname: self.custname,
            custtel: self.custtel,
            custemail: self.custemail,
            size: self.size.parse::<Size>().map_err(Error::Internal)?,
            delivery: self.delivery.parse::<DeliveryWindow>().map_err(Error::Internal)?,
            comments: self.comments,
            created_at: millis_to_datetime(self.created_at)?,
        })
    }
}

impl SqliteSubmissionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl SubmissionStore for SqliteSubmissionStore {
    fn create(&self, record: &NewSubmission) -> Result<CreatedSubmission> {
        let now = now_epoch_millis();

        let conn = self.db.connection();
        let conn = conn.lock();
        let (id, created_at): (i64, i64) = conn.query_row(
            "INSERT INTO customer_submissions (custname, custtel, custemail, size, delivery, comments, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, created_at",
            params![
                record.custname,
                record.custtel,
                record.custemail,
                record.size.as_str(),
                record.delivery.as_str(),
                record.comments,
                now,
            ],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        debug!("Inserted customer_submissions row {}", id);
        Ok(CreatedSubmission {
            id,
            created_at: millis_to_datetime(created_at)?,
        })
    }

    fn get_by_id(&self, id: i64) -> Result<CustomerSubmission> {
        ensure_positive(id)?;

        let conn = self.db.connection();
        let conn = conn.lock();
        let raw = conn
            .query_row(
                "SELECT id, custname, custtel, custemail, size, delivery, comments, created_at
                 FROM customer_submissions WHERE id = ?1",
                params![id],
                RawSubmission::from_row,
            )
            .optional()?;

        match raw {
            Some(raw) => raw.parse(),
            None => Err(Error::not_found("submission", id)),
        }
    }
}
