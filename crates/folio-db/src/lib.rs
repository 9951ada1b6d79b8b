pub mod console;
pub mod links;
pub mod migrations;
pub mod models;
pub mod queries;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, ErrorCode};
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

pub use console::{ParseError, SelectOutcome, EMPTY_TABLE_MESSAGE};

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Fresh, fully migrated database that lives only as long as the handle.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
        f(&conn)
    }

    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self.conn.lock().map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
        f(&mut conn)
    }
}

/// True when the error came from a UNIQUE / NOT NULL / FOREIGN KEY check.
pub fn is_constraint_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<rusqlite::Error>(),
        Some(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation
    )
}

/// `September 12, 2024 11:32:08 PM UTC`
pub fn display_timestamp(at: DateTime<Utc>) -> String {
    at.format("%B %-d, %Y %-I:%M:%S %p UTC").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamp_is_human_readable() {
        let at = Utc.with_ymd_and_hms(2024, 9, 12, 23, 32, 8).unwrap();
        assert_eq!(display_timestamp(at), "September 12, 2024 11:32:08 PM UTC");
    }

    #[test]
    fn unique_violation_is_detected() {
        let db = Database::open_in_memory().unwrap();
        db.subscribe("reader@example.com").unwrap();
        let err = db.subscribe("reader@example.com").unwrap_err();
        assert!(is_constraint_violation(&err));
        assert!(!is_constraint_violation(&anyhow::anyhow!("other")));
    }
}
