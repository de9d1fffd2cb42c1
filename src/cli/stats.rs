use anyhow::Result;

use super::Session;
use vitality::config::VitalityConfig;
use vitality::engine::{actions, stats};

/// Display companion statistics and recent history in the terminal.
pub fn stats(config: &VitalityConfig, owner_id: &str, companion_id: Option<&str>, history: usize) -> Result<()> {
    let session = Session::open(config)?;
    let companion = session.resolve_companion(owner_id, companion_id)?;
    let s = stats::companion_stats(&session.conn, owner_id, &companion, session.engine.now())?;

    println!("Companion Statistics: {}", s.name);
    println!("{}", "=".repeat(40));
    println!("  Days together:       {}", s.days_since_adoption);
    println!("  Total actions:       {}", s.total_actions);
    println!();

    println!("By Action:");
    for (action, count) in &s.by_action_type {
        println!("  {:<14} {}", action, count);
    }
    println!();

    println!("Meditation minutes:    {}", s.meditation_minutes);
    match s.average_meal_rating {
        Some(avg) => println!("Average meal rating:   {avg:.2}"),
        None => println!("Average meal rating:   (no meals yet)"),
    }
    println!("App streak:            {} day(s)", s.app_streak_days);
    println!("Meal streak:           {}", s.meal_streak_count);
    println!("Narrations:            {}", s.narrations);

    if history > 0 {
        let recent = actions::recent_actions(&session.conn, owner_id, &companion, history)?;
        if !recent.is_empty() {
            println!();
            println!("Recent Actions:");
            for r in recent {
                let detail = match (r.meal_type, r.duration_minutes, r.journal_mood) {
                    (Some(meal), _, _) => format!(" {meal}"),
                    (None, Some(minutes), _) => format!(" {minutes} min"),
                    (None, None, Some(mood)) => format!(" feeling {mood}"),
                    _ => String::new(),
                };
                println!(
                    "  {}  {}{}  ({:+.0})",
                    r.occurred_at.format("%Y-%m-%d %H:%M"),
                    r.action_type,
                    detail,
                    r.affection_delta
                );
            }
        }
    }

    Ok(())
}
