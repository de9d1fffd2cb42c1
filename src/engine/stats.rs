use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::Serialize;

use super::error::Result;
use super::ledger::load_ledger;
use super::types::ActionType;
use crate::db::migrations::has_narrations;

/// Aggregate history of one companion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanionStats {
    pub companion_id: String,
    pub name: String,
    pub days_since_adoption: i64,
    pub total_actions: u64,
    pub by_action_type: BTreeMap<String, u64>,
    pub meditation_minutes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_meal_rating: Option<f64>,
    pub journal_entries: u64,
    pub app_streak_days: u32,
    pub meal_streak_count: u32,
    pub narrations: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_action_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_action_at: Option<String>,
}

/// Compute statistics for a companion. Days are counted in the owner's calendar.
pub fn companion_stats(
    conn: &Connection,
    owner_id: &str,
    companion_id: &str,
    now: DateTime<Utc>,
) -> Result<CompanionStats> {
    let ledger = load_ledger(conn, owner_id, companion_id)?;
    let by_action_type = count_by_type(conn, companion_id)?;
    let total_actions = by_action_type.values().sum();

    let (meditation_minutes, average_meal_rating, first, last): (i64, Option<f64>, Option<String>, Option<String>) =
        conn.query_row(
            "SELECT \
                COALESCE(SUM(CASE WHEN action_type = 'meditation' THEN duration_minutes END), 0), \
                AVG(CASE WHEN action_type = 'meal_checkin' THEN rating END), \
                MIN(occurred_at), MAX(occurred_at) \
             FROM action_records WHERE companion_id = ?1",
            params![companion_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;

    Ok(CompanionStats {
        companion_id: ledger.companion_id.clone(),
        name: ledger.name.clone(),
        days_since_adoption: (ledger.day_of(now) - ledger.day_of(ledger.adopted_at))
            .num_days()
            .max(0),
        total_actions,
        journal_entries: by_action_type.get(ActionType::Journal.as_str()).copied().unwrap_or(0),
        by_action_type,
        meditation_minutes: meditation_minutes.max(0) as u64,
        average_meal_rating: average_meal_rating.map(|avg| (avg * 100.0).round() / 100.0),
        app_streak_days: ledger.app_streak_days,
        meal_streak_count: ledger.meal_streak_count,
        narrations: narration_count(conn, companion_id)?,
        first_action_at: first,
        last_action_at: last,
    })
}

fn narration_count(conn: &Connection, companion_id: &str) -> Result<u64> {
    if !has_narrations(conn)? {
        return Ok(0);
    }
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM narrations WHERE companion_id = ?1",
        params![companion_id],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}

fn count_by_type(conn: &Connection, companion_id: &str) -> Result<BTreeMap<String, u64>> {
    let mut map: BTreeMap<String, u64> = ActionType::ALL
        .iter()
        .map(|t| (t.as_str().to_string(), 0))
        .collect();

    let mut stmt = conn.prepare(
        "SELECT action_type, COUNT(*) FROM action_records WHERE companion_id = ?1 GROUP BY action_type",
    )?;
    let rows = stmt
        .query_map(params![companion_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    for (action_type, count) in rows {
        map.insert(action_type, count as u64);
    }
    Ok(map)
}
