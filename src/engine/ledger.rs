//! Vitality ledger persistence.
//!
//! One row per companion in the `ledgers` table. Writes go through
//! [`save_ledger`], which enforces the affection range and performs a
//! compare-and-swap on the `version` column so a stale read can never
//! overwrite a newer ledger.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::decay::{AFFECTION_MAX, AFFECTION_MIN};
use super::error::{parse_column, parse_optional_column, Result, VitalityError};
use super::types::{CompanionStatus, VitalityLedger};

const LEDGER_COLUMNS: &str = "companion_id, owner_id, name, status, affection, mood, last_updated_at, \
     app_streak_days, last_app_checkin_on, meal_streak_count, last_meal_type, last_meal_on, \
     last_action, utc_offset_minutes, adopted_at, retired_at, version";

fn ledger_from_row(row: &Row<'_>) -> rusqlite::Result<VitalityLedger> {
    Ok(VitalityLedger {
        companion_id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        status: parse_column(row, 3)?,
        affection: row.get(4)?,
        mood: parse_column(row, 5)?,
        last_updated_at: parse_column(row, 6)?,
        app_streak_days: row.get(7)?,
        last_app_checkin_on: parse_optional_column(row, 8)?,
        meal_streak_count: row.get(9)?,
        last_meal_type: parse_optional_column(row, 10)?,
        last_meal_on: parse_optional_column(row, 11)?,
        last_action: parse_optional_column(row, 12)?,
        utc_offset_minutes: row.get(13)?,
        adopted_at: parse_column(row, 14)?,
        retired_at: parse_optional_column(row, 15)?,
        version: row.get(16)?,
    })
}

fn check_range(ledger: &VitalityLedger) -> Result<()> {
    if !(AFFECTION_MIN..=AFFECTION_MAX).contains(&ledger.affection) {
        return Err(VitalityError::InvalidInput(format!(
            "affection {} for companion {} is outside [{AFFECTION_MIN}, {AFFECTION_MAX}]",
            ledger.affection, ledger.companion_id
        )));
    }
    Ok(())
}

fn ts(value: DateTime<Utc>) -> String {
    value.to_rfc3339()
}

/// Insert a brand-new ledger (companion adoption).
pub fn create_ledger(conn: &Connection, ledger: &VitalityLedger) -> Result<()> {
    check_range(ledger)?;
    conn.execute(
        &format!(
            "INSERT INTO ledgers ({LEDGER_COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)"
        ),
        params![
            ledger.companion_id,
            ledger.owner_id,
            ledger.name,
            ledger.status.as_str(),
            ledger.affection,
            ledger.mood.as_str(),
            ts(ledger.last_updated_at),
            ledger.app_streak_days,
            ledger.last_app_checkin_on.map(|d| d.to_string()),
            ledger.meal_streak_count,
            ledger.last_meal_type.map(|m| m.as_str()),
            ledger.last_meal_on.map(|d| d.to_string()),
            ledger.last_action.map(|a| a.as_str()),
            ledger.utc_offset_minutes,
            ts(ledger.adopted_at),
            ledger.retired_at.map(ts),
            ledger.version,
        ],
    )?;
    Ok(())
}

/// Look up a ledger by companion, scoped to its owner. `None` if absent or owned by someone else.
pub fn find_ledger(
    conn: &Connection,
    owner_id: &str,
    companion_id: &str,
) -> Result<Option<VitalityLedger>> {
    let ledger = conn
        .query_row(
            &format!("SELECT {LEDGER_COLUMNS} FROM ledgers WHERE companion_id = ?1 AND owner_id = ?2"),
            params![companion_id, owner_id],
            ledger_from_row,
        )
        .optional()?;
    Ok(ledger)
}

/// Load a ledger or fail with [`VitalityError::NotFound`].
pub fn load_ledger(conn: &Connection, owner_id: &str, companion_id: &str) -> Result<VitalityLedger> {
    find_ledger(conn, owner_id, companion_id)?
        .ok_or_else(|| VitalityError::not_found(owner_id, companion_id))
}

/// Write back a modified ledger. Succeeds only if the stored version still equals
/// `ledger.version`; returns the new version.
pub fn save_ledger(conn: &Connection, ledger: &VitalityLedger) -> Result<i64> {
    check_range(ledger)?;
    let rows = conn.execute(
        "UPDATE ledgers SET \
            name = ?1, status = ?2, affection = ?3, mood = ?4, last_updated_at = ?5, \
            app_streak_days = ?6, last_app_checkin_on = ?7, meal_streak_count = ?8, \
            last_meal_type = ?9, last_meal_on = ?10, last_action = ?11, \
            utc_offset_minutes = ?12, retired_at = ?13, version = version + 1 \
         WHERE companion_id = ?14 AND owner_id = ?15 AND version = ?16",
        params![
            ledger.name,
            ledger.status.as_str(),
            ledger.affection,
            ledger.mood.as_str(),
            ts(ledger.last_updated_at),
            ledger.app_streak_days,
            ledger.last_app_checkin_on.map(|d| d.to_string()),
            ledger.meal_streak_count,
            ledger.last_meal_type.map(|m| m.as_str()),
            ledger.last_meal_on.map(|d| d.to_string()),
            ledger.last_action.map(|a| a.as_str()),
            ledger.utc_offset_minutes,
            ledger.retired_at.map(ts),
            ledger.companion_id,
            ledger.owner_id,
            ledger.version,
        ],
    )?;

    if rows == 0 {
        return Err(VitalityError::Conflict(ledger.companion_id.clone()));
    }
    Ok(ledger.version + 1)
}

/// All ledgers belonging to an owner, newest adoption first.
pub fn list_ledgers(
    conn: &Connection,
    owner_id: &str,
    status: Option<CompanionStatus>,
) -> Result<Vec<VitalityLedger>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {LEDGER_COLUMNS} FROM ledgers \
         WHERE owner_id = ?1 AND (?2 IS NULL OR status = ?2) \
         ORDER BY adopted_at DESC, companion_id DESC"
    ))?;
    let ledgers = stmt
        .query_map(params![owner_id, status.map(|s| s.as_str())], ledger_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(ledgers)
}

/// The most recently adopted active companion of an owner, if any.
pub fn latest_active_companion(conn: &Connection, owner_id: &str) -> Result<Option<String>> {
    let id = conn
        .query_row(
            "SELECT companion_id FROM ledgers WHERE owner_id = ?1 AND status = 'active' \
             ORDER BY adopted_at DESC, companion_id DESC LIMIT 1",
            params![owner_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}
