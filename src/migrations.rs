//! Schema migration framework.
//!
//! Numbered SQL migrations are embedded at compile time via `include_str!`.
//! Each migration runs exactly once, tracked by the `schema_version` table.
//!
//! For databases created before the framework existed, the bootstrap function
//! detects the `supplies` table (and, if present, the later `alert_handle`
//! column) and marks those versions as applied, so the baseline SQL and the
//! additive ALTER TABLE never run against an already-migrated schema.

use rusqlite::Connection;

struct Migration {
    version: i32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        sql: include_str!("migrations/001_baseline.sql"),
    },
    Migration {
        version: 2,
        sql: include_str!("migrations/002_alert_handle.sql"),
    },
];

/// Create the `schema_version` table if it doesn't exist.
fn ensure_schema_version_table(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .map_err(|e| format!("Failed to create schema_version table: {}", e))
}

/// Return the highest applied migration version, or 0 if none.
fn current_version(conn: &Connection) -> Result<i32, String> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| format!("Failed to read schema version: {}", e))
}

fn has_table(conn: &Connection, name: &str) -> bool {
    conn.prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")
        .and_then(|mut stmt| stmt.exists([name]))
        .unwrap_or(false)
}

fn has_column(conn: &Connection, table: &str, column: &str) -> bool {
    conn.prepare("SELECT 1 FROM pragma_table_info(?1) WHERE name = ?2")
        .and_then(|mut stmt| stmt.exists([table, column]))
        .unwrap_or(false)
}

/// Detect a pre-framework database and mark already-present schema as applied.
///
/// If the `supplies` table exists but `schema_version` records nothing, this
/// database predates the migration framework. The baseline is marked applied;
/// when the `alert_handle` column is also already there (added by an older
/// build's ad-hoc ALTER TABLE), that migration is marked too. Repeated
/// add-column attempts against a migrated schema are therefore impossible.
fn bootstrap_existing_db(conn: &Connection) -> Result<bool, String> {
    let version = current_version(conn)?;
    if version > 0 {
        return Ok(false);
    }

    if !has_table(conn, "supplies") {
        return Ok(false);
    }

    let mark_through = if has_column(conn, "supplies", "alert_handle") {
        2
    } else {
        1
    };
    for version in 1..=mark_through {
        conn.execute(
            "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
            [version],
        )
        .map_err(|e| format!("Failed to bootstrap schema version: {}", e))?;
    }
    log::info!(
        "Migration bootstrap: marked v{} as applied for existing database",
        mark_through
    );
    Ok(true)
}

/// Back up the database before applying migrations.
///
/// Uses SQLite's online backup API to create a hot copy at
/// `<db_path>.pre-migration.bak`. Only called when there are pending migrations.
fn backup_before_migration(conn: &Connection) -> Result<(), String> {
    let db_path: String = conn
        .query_row("PRAGMA database_list", [], |row| row.get(2))
        .map_err(|e| format!("Failed to get database path: {}", e))?;

    if db_path.is_empty() || db_path == ":memory:" {
        // In-memory or temp database — skip backup
        return Ok(());
    }

    let backup_path = format!("{}.pre-migration.bak", db_path);
    let mut backup_conn = rusqlite::Connection::open(&backup_path)
        .map_err(|e| format!("Failed to open backup file: {}", e))?;

    let backup = rusqlite::backup::Backup::new(conn, &mut backup_conn)
        .map_err(|e| format!("Failed to initialize pre-migration backup: {}", e))?;

    backup
        .step(-1)
        .map_err(|e| format!("Pre-migration backup failed: {}", e))?;

    log::info!("Pre-migration backup created at {}", backup_path);
    Ok(())
}

/// Run all pending migrations.
///
/// Returns the number of migrations applied (0 if already up-to-date).
///
/// Forward-compat guard: if the database has a higher version than the highest
/// known migration, returns an error telling the user to update resupply.
pub fn run_migrations(conn: &Connection) -> Result<usize, String> {
    ensure_schema_version_table(conn)?;
    bootstrap_existing_db(conn)?;

    let current = current_version(conn)?;
    let max_known = MIGRATIONS.last().map(|m| m.version).unwrap_or(0);

    // Forward-compat guard
    if current > max_known {
        return Err(format!(
            "Database schema version ({}) is newer than this version of resupply supports ({}). \
             Please update resupply to the latest version.",
            current, max_known
        ));
    }

    // Collect pending migrations
    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > current).collect();

    if pending.is_empty() {
        return Ok(0);
    }

    // Backup before applying any migrations
    backup_before_migration(conn)?;

    // Apply each pending migration in order
    for migration in &pending {
        conn.execute_batch(migration.sql)
            .map_err(|e| format!("Migration v{} failed: {}", migration.version, e))?;

        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [migration.version],
        )
        .map_err(|e| format!("Failed to record migration v{}: {}", migration.version, e))?;

        log::info!("Applied migration v{}", migration.version);
    }

    Ok(pending.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn mem_db() -> Connection {
        Connection::open_in_memory().expect("in-memory db")
    }

    #[test]
    fn fresh_db_applies_all_migrations() {
        let conn = mem_db();
        let applied = run_migrations(&conn).expect("migrations should succeed");
        assert_eq!(applied, 2);

        let version = current_version(&conn).expect("version query");
        assert_eq!(version, 2);

        // Both baseline columns and the additive alert_handle column exist.
        conn.execute(
            "INSERT INTO supplies (key, label, interval_days, last_replaced, notify_hour, notify_minute, alert_handle)
             VALUES ('k', 'Filter', 7, '2025-01-01T00:00:00Z', 21, 0, 'handle-1')",
            [],
        )
        .expect("full-width insert should succeed");
    }

    #[test]
    fn second_run_is_a_no_op() {
        let conn = mem_db();
        run_migrations(&conn).expect("first run");
        let applied = run_migrations(&conn).expect("second run");
        assert_eq!(applied, 0);
    }

    #[test]
    fn bootstrap_marks_pre_framework_db_and_adds_column() {
        let conn = mem_db();
        // A database created before the migration framework: baseline schema,
        // no schema_version table, no alert_handle column.
        conn.execute_batch(
            "CREATE TABLE supplies (
                id INTEGER PRIMARY KEY,
                key TEXT UNIQUE NOT NULL,
                label TEXT NOT NULL,
                interval_days INTEGER NOT NULL DEFAULT 0,
                notify_hour INTEGER NOT NULL DEFAULT 21,
                notify_minute INTEGER NOT NULL DEFAULT 0,
                last_replaced TEXT NOT NULL
            );
             INSERT INTO supplies (key, label, interval_days, last_replaced)
             VALUES ('Mask', 'Mask', 30, '2024-06-01T00:00:00Z');",
        )
        .expect("legacy schema");

        let applied = run_migrations(&conn).expect("migrations");
        // Baseline bootstrapped, only the alert_handle migration ran.
        assert_eq!(applied, 1);
        assert!(has_column(&conn, "supplies", "alert_handle"));

        // Existing data survived.
        let count: i32 = conn
            .query_row("SELECT COUNT(*) FROM supplies", [], |row| row.get(0))
            .expect("count");
        assert_eq!(count, 1);
    }

    #[test]
    fn bootstrap_tolerates_already_present_alert_handle_column() {
        let conn = mem_db();
        // Legacy database where an older build already did the ad-hoc
        // ALTER TABLE; re-running the ALTER would fail, so it must not run.
        conn.execute_batch(
            "CREATE TABLE supplies (
                id INTEGER PRIMARY KEY,
                key TEXT UNIQUE NOT NULL,
                label TEXT NOT NULL,
                interval_days INTEGER NOT NULL DEFAULT 0,
                notify_hour INTEGER NOT NULL DEFAULT 21,
                notify_minute INTEGER NOT NULL DEFAULT 0,
                last_replaced TEXT NOT NULL,
                alert_handle TEXT
            );",
        )
        .expect("legacy schema with alert_handle");

        let applied = run_migrations(&conn).expect("migrations");
        assert_eq!(applied, 0);
        assert_eq!(current_version(&conn).expect("version"), 2);

        // And a second open is still clean.
        assert_eq!(run_migrations(&conn).expect("re-run"), 0);
    }

    #[test]
    fn newer_schema_than_binary_is_rejected() {
        let conn = mem_db();
        run_migrations(&conn).expect("migrations");
        conn.execute("INSERT INTO schema_version (version) VALUES (99)", [])
            .expect("future version");

        let err = run_migrations(&conn).expect_err("should reject newer schema");
        assert!(err.contains("newer"));
    }
}
