use anyhow::{bail, Result};
use chrono::NaiveDate;

use super::{print_snapshot, Session};
use vitality::config::VitalityConfig;
use vitality::engine::status::{self, DayStatus};

/// Show a companion's current (decayed) state. Writes nothing.
pub fn show(config: &VitalityConfig, owner_id: &str, companion_id: Option<&str>) -> Result<()> {
    let session = Session::open(config)?;
    let companion = session.resolve_companion(owner_id, companion_id)?;
    let snapshot = session.engine.get_snapshot(&session.conn, owner_id, &companion)?;
    print_snapshot(&snapshot);
    Ok(())
}

/// Check-in status for one day, or each day of a range.
pub fn day(
    config: &VitalityConfig,
    owner_id: &str,
    date: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<()> {
    let session = Session::open(config)?;
    let start = match date {
        Some(d) => d,
        None => status::today_for_owner(
            &session.conn,
            owner_id,
            session.engine.now(),
            config.scoring.default_utc_offset_minutes,
        )?,
    };

    match to {
        None => print_day(&status::day_status(&session.conn, owner_id, start)?),
        Some(end) if end < start => bail!("--to {end} is before {start}"),
        Some(end) => {
            let range = status::range_status(&session.conn, owner_id, start, end)?;
            for day in &range.days {
                print_day(day);
                println!();
            }
            println!(
                "{} day(s), {} fully completed, {}% of meals logged",
                range.total_days, range.fully_completed_days, range.overall_completion_percentage
            );
        }
    }
    Ok(())
}

fn print_day(day: &DayStatus) {
    println!(
        "{}  [{}/{} meals, {}%]{}",
        day.day,
        day.completed_count,
        day.total_meals,
        day.completion_percentage,
        if day.app_checkin { "  checked in" } else { "" }
    );
    for meal in &day.meals {
        let mark = if meal.completed { "x" } else { " " };
        let rating = meal
            .rating
            .map(|r| format!(" rated {r}/5"))
            .unwrap_or_default();
        let notes = meal
            .notes
            .as_deref()
            .map(|n| format!(" - {n}"))
            .unwrap_or_default();
        println!("  [{mark}] {:<10}{rating}{notes}", meal.meal_type.as_str());
    }
    if day.meditation_minutes > 0 {
        println!("  meditation: {} min", day.meditation_minutes);
    }
    if day.journal_entries > 0 {
        println!("  journal entries: {}", day.journal_entries);
    }
}
