//! CLI `narrate` command. Blocks on the narrator, so run it off the async runtime.

use anyhow::Result;

use super::Session;
use vitality::config::VitalityConfig;
use vitality::engine::narration;
use vitality::narrator::create_narrator;

pub fn narrate(
    config: &VitalityConfig,
    owner_id: &str,
    companion_id: Option<&str>,
    store: bool,
) -> Result<()> {
    let session = Session::open(config)?;
    let companion = session.resolve_companion(owner_id, companion_id)?;
    let snapshot = session.engine.get_snapshot(&session.conn, owner_id, &companion)?;

    let narrator = create_narrator(&config.narrator)?;
    let text = narrator.narrate(&snapshot)?;

    println!("{} is {}.", snapshot.name, text.mood);
    println!("  \"{}\"", text.dialogue);

    if store {
        narration::record_narration(
            &session.conn,
            owner_id,
            &companion,
            text,
            snapshot.last_action,
            snapshot.affection,
            session.engine.now(),
        )?;
    }
    Ok(())
}
