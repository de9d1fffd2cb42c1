pub mod migrations;
pub mod schema;

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// How long a writer waits on a locked database before giving up.
pub const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Open (or create) the vitality database at the given path with schema initialized
/// and migrations applied.
pub fn open_database(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;

    // Set before anything that may need the write lock
    conn.busy_timeout(BUSY_TIMEOUT)?;
    // WAL lets readers proceed while one writer holds the lock
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;

    schema::init_schema(&conn).context("failed to initialize schema")?;
    migrations::run_migrations(&conn).context("failed to run migrations")?;

    tracing::info!(path = %path.display(), "database initialized");
    Ok(conn)
}

/// Open a second, read-only connection to a database already prepared by
/// [`open_database`]. Under WAL it reads while the writer holds the lock.
pub fn open_read_connection(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.pragma_update(None, "query_only", "ON")?;
    Ok(conn)
}

/// Open an in-memory database with schema and migrations applied.
pub fn open_memory_database() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    schema::init_schema(&conn).context("failed to initialize schema")?;
    migrations::run_migrations(&conn).context("failed to run migrations")?;
    Ok(conn)
}

/// Result of [`check_database_health`].
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub schema_version: u32,
    pub ledger_count: u64,
    pub active_ledger_count: u64,
    pub action_count: u64,
    pub narration_count: u64,
    pub integrity_ok: bool,
    pub integrity_details: String,
    /// Ledgers whose stored affection falls outside `[0, 100]`. Always zero unless
    /// the CHECK constraint was bypassed.
    pub out_of_range_ledgers: u64,
}

/// Run `PRAGMA integrity_check` and collect row counts.
pub fn check_database_health(conn: &Connection) -> Result<HealthReport> {
    let schema_version = migrations::get_schema_version(conn)?;

    let count = |sql: &str| -> Result<u64> {
        let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
        Ok(n as u64)
    };

    let ledger_count = count("SELECT COUNT(*) FROM ledgers")?;
    let active_ledger_count = count("SELECT COUNT(*) FROM ledgers WHERE status = 'active'")?;
    let action_count = count("SELECT COUNT(*) FROM action_records")?;
    let narration_count = if migrations::has_narrations(conn)? {
        count("SELECT COUNT(*) FROM narrations")?
    } else {
        0
    };
    let out_of_range_ledgers =
        count("SELECT COUNT(*) FROM ledgers WHERE affection < 0.0 OR affection > 100.0")?;

    let integrity_details: String =
        conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
    let integrity_ok = integrity_details == "ok";

    Ok(HealthReport {
        schema_version,
        ledger_count,
        active_ledger_count,
        action_count,
        narration_count,
        integrity_ok,
        integrity_details,
        out_of_range_ledgers,
    })
}
