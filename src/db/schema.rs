//! SQL DDL for all vitality tables.
//!
//! Defines the `ledgers`, `action_records`, and `schema_meta` tables plus the
//! triggers that keep action records immutable and ledgers undeletable. All DDL
//! uses `IF NOT EXISTS` for idempotent initialization.

use rusqlite::Connection;

/// All schema DDL statements for the core tables.
const SCHEMA_SQL: &str = r#"
-- One row per companion: identity plus the mutable vitality aggregate
CREATE TABLE IF NOT EXISTS ledgers (
    companion_id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    name TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'active' CHECK(status IN ('active','retired')),
    affection REAL NOT NULL CHECK(affection >= 0.0 AND affection <= 100.0),
    mood TEXT NOT NULL,
    last_updated_at TEXT NOT NULL,
    app_streak_days INTEGER NOT NULL DEFAULT 0 CHECK(app_streak_days >= 0),
    last_app_checkin_on TEXT,
    meal_streak_count INTEGER NOT NULL DEFAULT 0 CHECK(meal_streak_count >= 0),
    last_meal_type TEXT CHECK(last_meal_type IS NULL OR last_meal_type IN ('breakfast','lunch','dinner')),
    last_meal_on TEXT,
    last_action TEXT,
    utc_offset_minutes INTEGER NOT NULL DEFAULT 0 CHECK(utc_offset_minutes BETWEEN -1080 AND 1080),
    adopted_at TEXT NOT NULL,
    retired_at TEXT,
    version INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_ledgers_owner ON ledgers(owner_id, status);

-- Append-only action log
CREATE TABLE IF NOT EXISTS action_records (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    companion_id TEXT NOT NULL REFERENCES ledgers(companion_id),
    action_type TEXT NOT NULL CHECK(action_type IN ('app_checkin','meal_checkin','meditation','journal')),
    meal_type TEXT CHECK(meal_type IS NULL OR meal_type IN ('breakfast','lunch','dinner')),
    occurred_at TEXT NOT NULL,
    calendar_day TEXT NOT NULL,
    duration_minutes INTEGER,
    rating INTEGER CHECK(rating IS NULL OR (rating >= 1 AND rating <= 5)),
    title TEXT,
    notes TEXT,
    affection_delta REAL NOT NULL DEFAULT 0.0,
    recorded_at TEXT NOT NULL,
    CHECK((action_type = 'meal_checkin') = (meal_type IS NOT NULL))
);

CREATE INDEX IF NOT EXISTS idx_actions_owner_day ON action_records(owner_id, calendar_day);
CREATE INDEX IF NOT EXISTS idx_actions_companion ON action_records(companion_id, recorded_at);

-- At most one app check-in per owner per day, one meal check-in per owner, meal and day
CREATE UNIQUE INDEX IF NOT EXISTS idx_actions_daily_unique
    ON action_records(owner_id, action_type, COALESCE(meal_type, ''), calendar_day)
    WHERE action_type IN ('app_checkin','meal_checkin');

CREATE TRIGGER IF NOT EXISTS action_records_immutable
BEFORE UPDATE ON action_records
BEGIN
    SELECT RAISE(ABORT, 'action records are immutable');
END;

CREATE TRIGGER IF NOT EXISTS action_records_append_only
BEFORE DELETE ON action_records
BEGIN
    SELECT RAISE(ABORT, 'action records are append-only');
END;

CREATE TRIGGER IF NOT EXISTS ledgers_never_deleted
BEFORE DELETE ON ledgers
BEGIN
    SELECT RAISE(ABORT, 'ledgers are retired, never deleted');
END;

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set initial schema version if not already present
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}
