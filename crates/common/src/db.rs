//! SQLite database for MCPBench state persistence

use crate::Result;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Path value that selects a private in-memory database.
pub const MEMORY_PATH: &str = ":memory:";

/// Database wrapper for state persistence
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Expose the underlying connection for subsystems that manage their own
    /// statements against the shared database.
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }
}

impl Database {
    /// Open or create database at path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        if path.as_ref() == Path::new(MEMORY_PATH) {
            return Self::open_memory();
        }

        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path.as_ref())?;

        // Enable WAL mode for better concurrency
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.init_schema()?;

        info!("Opened database at {:?}", path.as_ref());
        Ok(db)
    }

    /// Open in-memory database (for testing)
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock();

        // AUTOINCREMENT keeps ids from being reused after the highest row is gone.
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS customer_submissions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                custname TEXT NOT NULL CHECK (length(custname) BETWEEN 1 AND 255),
                custtel TEXT NOT NULL CHECK (length(custtel) BETWEEN 1 AND 50),
                custemail TEXT NOT NULL CHECK (length(custemail) BETWEEN 1 AND 255),
                size TEXT NOT NULL CHECK (size IN ('small', 'medium', 'large')),
                delivery TEXT NOT NULL CHECK (delivery IN ('morning', 'afternoon', 'evening')),
                comments TEXT,
                created_at INTEGER NOT NULL
            );
            "#,
        )?;

        debug!("Database schema initialized");
        Ok(())
    }
}
