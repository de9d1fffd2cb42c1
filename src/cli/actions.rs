//! CLI commands that change a ledger: adopt, record actions, retire.

use anyhow::Result;

use super::{print_snapshot, Session};
use vitality::config::VitalityConfig;
use vitality::engine::{ActionInput, ActionOutcome};

pub fn adopt(config: &VitalityConfig, owner_id: &str, name: &str, utc_offset: Option<i32>) -> Result<()> {
    let session = Session::open(config)?;
    let snapshot = session
        .engine
        .adopt_companion(&session.conn, owner_id, name, utc_offset)?;
    println!("Adopted {}!", snapshot.name);
    println!();
    print_snapshot(&snapshot);
    Ok(())
}

/// Record one action and report what it did.
pub fn record(
    config: &VitalityConfig,
    owner_id: &str,
    companion_id: Option<&str>,
    input: ActionInput,
) -> Result<()> {
    let mut session = Session::open(config)?;
    let companion = session.resolve_companion(owner_id, companion_id)?;
    let action = input.action_type();
    let result = session
        .engine
        .record_action(&mut session.conn, owner_id, &companion, input)?;

    match &result.outcome {
        ActionOutcome::Recorded {
            decay,
            reward,
            backdated,
            ..
        } => {
            println!("Recorded {action}.");
            if *decay > 0.0 {
                println!("  Decay since last visit:  -{decay:.0}");
            }
            println!("  Reward:                  +{reward:.0}");
            if *backdated {
                println!("  (backdated: streaks unchanged)");
            }
        }
        ActionOutcome::Duplicate => {
            println!("Already counted {action} for today; nothing changed.");
        }
    }
    println!();
    print_snapshot(&result.snapshot);
    Ok(())
}

pub fn retire(config: &VitalityConfig, owner_id: &str, companion_id: &str) -> Result<()> {
    let mut session = Session::open(config)?;
    let snapshot = session
        .engine
        .retire_companion(&mut session.conn, owner_id, companion_id)?;
    println!("{} is retired. Their ledger is kept for history.", snapshot.name);
    Ok(())
}

pub fn list(config: &VitalityConfig, owner_id: &str) -> Result<()> {
    let session = Session::open(config)?;
    let companions = session.engine.list_companions(&session.conn, owner_id)?;
    if companions.is_empty() {
        println!("No companions for {owner_id}. Run `vitality adopt <name>`.");
        return Ok(());
    }

    println!("{:<38} {:<14} {:<8} {:>9}  {}", "ID", "Name", "Status", "Affection", "Mood");
    for c in companions {
        println!(
            "{:<38} {:<14} {:<8} {:>9.0}  {}",
            c.companion_id, c.name, c.status, c.affection, c.mood
        );
    }
    Ok(())
}
