//! Shared type definitions for the database layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors specific to database operations.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Failed to create database directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Schema migration failed: {0}")]
    Migration(String),
}

/// A row from the `supplies` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbSupply {
    pub id: i64,
    /// Unique slug, immutable after creation. Seeded defaults use fixed keys;
    /// user-created supplies get a generated one.
    pub key: String,
    pub label: String,
    pub interval_days: u32,
    /// RFC 3339 UTC instant of the last replacement.
    pub last_replaced: String,
    pub notify_hour: u32,
    pub notify_minute: u32,
    /// Opaque handle of the outstanding one-shot alert; None means no alert
    /// is pending for this supply.
    pub alert_handle: Option<String>,
}

/// Partial update for the editable supply fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplyPatch {
    pub label: Option<String>,
    pub interval_days: Option<u32>,
    pub notify_hour: Option<u32>,
    pub notify_minute: Option<u32>,
}
