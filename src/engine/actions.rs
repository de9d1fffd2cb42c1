//! Action log store.
//!
//! `action_records` is append-only: rows are inserted once and protected from
//! UPDATE and DELETE by triggers. The partial unique index on
//! `(owner_id, action_type, meal_type, calendar_day)` backs the at-most-once-per-day
//! rule for app and meal check-ins.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::error::{parse_column, parse_optional_column, Result, VitalityError};
use super::types::{ActionRecord, ActionType, MealType};

const RECORD_COLUMNS: &str = "id, owner_id, companion_id, action_type, meal_type, occurred_at, \
     calendar_day, duration_minutes, rating, title, notes, affection_delta, recorded_at, \
     journal_mood, tags";

/// Tags are stored as a JSON array of strings.
fn tags_from_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<ActionRecord> {
    Ok(ActionRecord {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        companion_id: row.get(2)?,
        action_type: parse_column(row, 3)?,
        meal_type: parse_optional_column(row, 4)?,
        occurred_at: parse_column(row, 5)?,
        calendar_day: parse_column(row, 6)?,
        duration_minutes: row.get(7)?,
        rating: row.get(8)?,
        title: row.get(9)?,
        notes: row.get(10)?,
        affection_delta: row.get(11)?,
        recorded_at: parse_column(row, 12)?,
        journal_mood: parse_optional_column(row, 13)?,
        tags: tags_from_column(row, 14)?,
    })
}

/// Append a record. Fails with a unique-constraint violation if the day was already credited.
pub fn append_action_record(conn: &Connection, record: &ActionRecord) -> Result<()> {
    let tags = serde_json::to_string(&record.tags)
        .map_err(|e| VitalityError::InvalidInput(format!("unencodable tags: {e}")))?;
    conn.execute(
        &format!(
            "INSERT INTO action_records ({RECORD_COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
        ),
        params![
            record.id,
            record.owner_id,
            record.companion_id,
            record.action_type.as_str(),
            record.meal_type.map(|m| m.as_str()),
            record.occurred_at.to_rfc3339(),
            record.calendar_day.to_string(),
            record.duration_minutes,
            record.rating,
            record.title,
            record.notes,
            record.affection_delta,
            record.recorded_at.to_rfc3339(),
            record.journal_mood.map(|m| m.as_str()),
            tags,
        ],
    )?;
    Ok(())
}

/// Find the record that already credits `(owner, action_type, meal_type, day)`, if any.
///
/// Meaningful for daily-unique action types; for the others it returns the earliest
/// record of that type on the day.
pub fn find_action_record(
    conn: &Connection,
    owner_id: &str,
    action_type: ActionType,
    meal_type: Option<MealType>,
    day: NaiveDate,
) -> Result<Option<ActionRecord>> {
    let record = conn
        .query_row(
            &format!(
                "SELECT {RECORD_COLUMNS} FROM action_records \
                 WHERE owner_id = ?1 AND action_type = ?2 \
                   AND COALESCE(meal_type, '') = COALESCE(?3, '') AND calendar_day = ?4 \
                 ORDER BY recorded_at ASC LIMIT 1"
            ),
            params![
                owner_id,
                action_type.as_str(),
                meal_type.map(|m| m.as_str()),
                day.to_string()
            ],
            record_from_row,
        )
        .optional()?;
    Ok(record)
}

/// Most recent records for one companion, newest first.
pub fn recent_actions(
    conn: &Connection,
    owner_id: &str,
    companion_id: &str,
    limit: usize,
) -> Result<Vec<ActionRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_COLUMNS} FROM action_records \
         WHERE owner_id = ?1 AND companion_id = ?2 \
         ORDER BY recorded_at DESC, id DESC LIMIT ?3"
    ))?;
    let records = stmt
        .query_map(params![owner_id, companion_id, limit as i64], record_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(records)
}

/// Every record of an owner whose calendar day falls in `[start, end]`, oldest first.
pub fn actions_between_days(
    conn: &Connection,
    owner_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<ActionRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_COLUMNS} FROM action_records \
         WHERE owner_id = ?1 AND calendar_day BETWEEN ?2 AND ?3 \
         ORDER BY calendar_day ASC, occurred_at ASC"
    ))?;
    let records = stmt
        .query_map(
            params![owner_id, start.to_string(), end.to_string()],
            record_from_row,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(records)
}
