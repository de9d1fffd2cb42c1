pub mod actions;
pub mod doctor;
pub mod narrate;
pub mod stats;
pub mod status;

use anyhow::{Context, Result};
use rusqlite::Connection;

use vitality::config::VitalityConfig;
use vitality::engine::{ledger, Engine, VitalitySnapshot};

/// An open database plus an engine on the system clock, for one CLI command.
pub struct Session {
    pub conn: Connection,
    pub engine: Engine,
}

impl Session {
    pub fn open(config: &VitalityConfig) -> Result<Self> {
        let db_path = config.resolved_db_path();
        let conn = vitality::db::open_database(&db_path)
            .with_context(|| format!("failed to open {}", db_path.display()))?;
        Ok(Self {
            conn,
            engine: Engine::with_system_clock(config.scoring.clone()),
        })
    }

    /// The explicit companion id, else the owner's most recently adopted active one.
    pub fn resolve_companion(&self, owner_id: &str, companion_id: Option<&str>) -> Result<String> {
        if let Some(id) = companion_id {
            return Ok(id.to_string());
        }
        ledger::latest_active_companion(&self.conn, owner_id)?.with_context(|| {
            format!("owner {owner_id} has no active companion; run `vitality adopt <name>` first")
        })
    }
}

/// Render a snapshot as an aligned block.
pub fn print_snapshot(snapshot: &VitalitySnapshot) {
    println!("{} ({})", snapshot.name, snapshot.companion_id);
    println!("{}", "=".repeat(40));
    println!("  Status:            {}", snapshot.status);
    println!("  Affection:         {:.0} / 100", snapshot.affection);
    println!("  Mood:              {}", snapshot.mood);
    println!("  App streak:        {} day(s)", snapshot.app_streak_days);
    println!("  Meal streak:       {}", snapshot.meal_streak_count);
    match snapshot.last_meal_type {
        Some(last) => println!(
            "  Last meal:         {last} (next: {})",
            snapshot.next_expected_meal
        ),
        None => println!("  Next meal:         {}", snapshot.next_expected_meal),
    }
    if let Some(action) = snapshot.last_action {
        println!("  Last action:       {action}");
    }
    println!("  Last updated:      {}", snapshot.last_updated_at.to_rfc3339());
}
