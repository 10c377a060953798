//! SQLite-based local state for tracked supplies.
//!
//! The database lives at `~/.resupply/resupply.db` and is the single durable
//! store: supply rows, their replacement timestamps, and the handle of each
//! outstanding alert. The store is an owned object with an explicit
//! open → migrate → ready lifecycle; callers receive it by injection rather
//! than through any process-global handle.

use std::path::PathBuf;

use chrono::Utc;
use rusqlite::{params, Connection};

pub mod types;
pub use types::*;

pub mod supplies;

pub struct SupplyDb {
    conn: Connection,
}

impl SupplyDb {
    /// Borrow the underlying connection for ad-hoc queries.
    pub fn conn_ref(&self) -> &Connection {
        &self.conn
    }

    /// Open (or create) the database at `~/.resupply/resupply.db` and apply
    /// the schema.
    pub fn open() -> Result<Self, DbError> {
        let path = Self::db_path()?;
        Self::open_at(path)
    }

    /// Open a database at an explicit path. Used for testing and for the
    /// config-file data-dir override.
    pub fn open_at(path: PathBuf) -> Result<Self, DbError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(DbError::CreateDir)?;
            }
        }

        let conn = Connection::open(&path)?;

        // Enable WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        crate::migrations::run_migrations(&conn).map_err(DbError::Migration)?;

        Ok(Self { conn })
    }

    /// Close the connection explicitly, surfacing any flush error that a
    /// plain drop would swallow.
    pub fn close(self) -> Result<(), DbError> {
        self.conn.close().map_err(|(_, e)| DbError::Sqlite(e))
    }

    /// Resolve the default database path: `~/.resupply/resupply.db`.
    fn db_path() -> Result<PathBuf, DbError> {
        let home = dirs::home_dir().ok_or(DbError::HomeDirNotFound)?;
        Ok(home.join(".resupply").join("resupply.db"))
    }
}

// =============================================================================
// Shared test utilities
// =============================================================================


// =============================================================================
// Tests
// =============================================================================
