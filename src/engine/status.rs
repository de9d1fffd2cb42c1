//! Check-in status per calendar day and over a range of days.
//!
//! Read-only views over the action log keyed by the owner-local `calendar_day`
//! stored on each record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::actions::actions_between_days;
use super::calendar::{self, days_between};
use super::error::{Result, VitalityError};
use super::ledger::{latest_active_companion, load_ledger};
use super::types::{ActionRecord, ActionType, MealType};

/// Longest range [`range_status`] will expand, in days.
pub const MAX_RANGE_DAYS: i64 = 366;

const TOTAL_MEALS: u32 = MealType::ALL.len() as u32;

/// One meal slot of a day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealStatus {
    pub meal_type: MealType,
    pub completed: bool,
    pub rating: Option<u8>,
    pub notes: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayStatus {
    pub day: NaiveDate,
    pub app_checkin: bool,
    /// Breakfast, lunch and dinner, in that order.
    pub meals: Vec<MealStatus>,
    pub meditation_minutes: u64,
    pub journal_entries: u32,
    pub completed_count: u32,
    pub total_meals: u32,
    pub is_fully_completed: bool,
    pub completion_percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeStatus {
    pub days: Vec<DayStatus>,
    pub total_days: u32,
    pub fully_completed_days: u32,
    pub overall_completion_percentage: u32,
}

fn percentage(done: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (f64::from(done) / f64::from(total) * 100.0).round() as u32
}

fn summarize_day(day: NaiveDate, records: &[&ActionRecord]) -> DayStatus {
    let meals: Vec<MealStatus> = MealType::ALL
        .iter()
        .map(|&meal_type| {
            let hit = records
                .iter()
                .find(|r| r.action_type == ActionType::MealCheckin && r.meal_type == Some(meal_type));
            MealStatus {
                meal_type,
                completed: hit.is_some(),
                rating: hit.and_then(|r| r.rating),
                notes: hit.and_then(|r| r.notes.clone()),
                occurred_at: hit.map(|r| r.occurred_at),
            }
        })
        .collect();

    let completed_count = meals.iter().filter(|m| m.completed).count() as u32;
    let meditation_minutes = records
        .iter()
        .filter(|r| r.action_type == ActionType::Meditation)
        .filter_map(|r| r.duration_minutes)
        .map(u64::from)
        .sum();
    let journal_entries = records
        .iter()
        .filter(|r| r.action_type == ActionType::Journal)
        .count() as u32;

    DayStatus {
        day,
        app_checkin: records.iter().any(|r| r.action_type == ActionType::AppCheckin),
        meals,
        meditation_minutes,
        journal_entries,
        completed_count,
        total_meals: TOTAL_MEALS,
        is_fully_completed: completed_count == TOTAL_MEALS,
        completion_percentage: percentage(completed_count, TOTAL_MEALS),
    }
}

/// Today's date for an owner: the zone of their latest active companion, or
/// `default_offset_minutes` when they have none.
pub fn today_for_owner(
    conn: &rusqlite::Connection,
    owner_id: &str,
    now: DateTime<Utc>,
    default_offset_minutes: i32,
) -> Result<NaiveDate> {
    let offset = match latest_active_companion(conn, owner_id)? {
        Some(companion_id) => load_ledger(conn, owner_id, &companion_id)?.offset(),
        None => calendar::offset_from_minutes(default_offset_minutes).unwrap_or(calendar::utc()),
    };
    Ok(calendar::calendar_day(now, offset))
}

/// Check-in status of one owner-local day.
pub fn day_status(conn: &rusqlite::Connection, owner_id: &str, day: NaiveDate) -> Result<DayStatus> {
    let records = actions_between_days(conn, owner_id, day, day)?;
    let refs: Vec<&ActionRecord> = records.iter().collect();
    Ok(summarize_day(day, &refs))
}

/// Status of every day in `[start, end]`.
pub fn range_status(
    conn: &rusqlite::Connection,
    owner_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<RangeStatus> {
    let span = days_between(start, end);
    if span < 0 {
        return Err(VitalityError::InvalidInput(format!(
            "range end {end} is before start {start}"
        )));
    }
    if span >= MAX_RANGE_DAYS {
        return Err(VitalityError::InvalidInput(format!(
            "range of {} days exceeds the {MAX_RANGE_DAYS}-day limit",
            span + 1
        )));
    }

    let records = actions_between_days(conn, owner_id, start, end)?;
    let days: Vec<DayStatus> = start
        .iter_days()
        .take((span + 1) as usize)
        .map(|day| {
            let on_day: Vec<&ActionRecord> =
                records.iter().filter(|r| r.calendar_day == day).collect();
            summarize_day(day, &on_day)
        })
        .collect();

    let total_days = days.len() as u32;
    let fully_completed_days = days.iter().filter(|d| d.is_fully_completed).count() as u32;
    let completed_meals: u32 = days.iter().map(|d| d.completed_count).sum();

    Ok(RangeStatus {
        total_days,
        fully_completed_days,
        overall_completion_percentage: percentage(completed_meals, total_days * TOTAL_MEALS),
        days,
    })
}
