//! Narration log: display text produced by a narrator for a companion.
//!
//! Entries are metadata only. The numeric model never reads this table.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use super::error::{parse_column, parse_optional_column, Result};
use super::ledger::load_ledger;
use super::types::{ActionType, Narration};

/// A stored narration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrationEntry {
    pub id: i64,
    pub companion_id: String,
    pub mood: String,
    pub dialogue: String,
    /// Action that prompted the narration, if any.
    pub trigger: Option<ActionType>,
    /// Ledger affection when the narration was stored.
    pub affection: f64,
    pub created_at: DateTime<Utc>,
}

const NARRATION_COLUMNS: &str = "id, companion_id, mood, dialogue, trigger, affection, created_at";

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<NarrationEntry> {
    Ok(NarrationEntry {
        id: row.get(0)?,
        companion_id: row.get(1)?,
        mood: row.get(2)?,
        dialogue: row.get(3)?,
        trigger: parse_optional_column(row, 4)?,
        affection: row.get(5)?,
        created_at: parse_column(row, 6)?,
    })
}

/// Store narrator output for a companion, trimmed to display limits.
pub fn record_narration(
    conn: &Connection,
    owner_id: &str,
    companion_id: &str,
    narration: Narration,
    trigger: Option<ActionType>,
    affection: f64,
    now: DateTime<Utc>,
) -> Result<NarrationEntry> {
    // Owner check only; the affection comes from the caller's snapshot.
    load_ledger(conn, owner_id, companion_id)?;
    let narration = narration.bounded();

    conn.execute(
        "INSERT INTO narrations (companion_id, mood, dialogue, trigger, affection, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            companion_id,
            narration.mood,
            narration.dialogue,
            trigger.map(|t| t.as_str()),
            affection,
            now.to_rfc3339(),
        ],
    )?;

    Ok(NarrationEntry {
        id: conn.last_insert_rowid(),
        companion_id: companion_id.to_string(),
        mood: narration.mood,
        dialogue: narration.dialogue,
        trigger,
        affection,
        created_at: now,
    })
}

/// The newest narration for a companion.
pub fn latest_narration(conn: &Connection, companion_id: &str) -> Result<Option<NarrationEntry>> {
    let entry = conn
        .query_row(
            &format!(
                "SELECT {NARRATION_COLUMNS} FROM narrations WHERE companion_id = ?1 \
                 ORDER BY id DESC LIMIT 1"
            ),
            params![companion_id],
            entry_from_row,
        )
        .optional()?;
    Ok(entry)
}

/// Up to `limit` narrations, newest first.
pub fn recent_narrations(
    conn: &Connection,
    companion_id: &str,
    limit: usize,
) -> Result<Vec<NarrationEntry>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {NARRATION_COLUMNS} FROM narrations WHERE companion_id = ?1 \
         ORDER BY id DESC LIMIT ?2"
    ))?;
    let entries = stmt
        .query_map(params![companion_id, limit as i64], entry_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(entries)
}
