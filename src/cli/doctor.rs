//! CLI `doctor` command: run database diagnostics and print a health report.

use anyhow::{Context, Result};

use vitality::config::VitalityConfig;
use vitality::db;

/// Run database diagnostics and print a health report.
pub fn doctor(config: &VitalityConfig) -> Result<()> {
    let db_path = config.resolved_db_path();

    if !db_path.exists() {
        println!("Database: not found at {}", db_path.display());
        println!("Run `vitality adopt <name>` to create it.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    let conn = db::open_database(&db_path).context("failed to open database (may be corrupt)")?;
    let report = db::check_database_health(&conn).context("failed to run health check")?;

    println!("Vitality Health Report");
    println!("======================");
    println!();
    println!("Database:          {}", db_path.display());
    println!("File size:         {}", format_bytes(file_size));
    println!("Schema version:    {}", report.schema_version);
    println!("Narrator:          {}", config.narrator.provider);
    println!();
    println!("Row counts:");
    println!(
        "  Companions:      {} ({} active)",
        report.ledger_count, report.active_ledger_count
    );
    println!("  Action records:  {}", report.action_count);
    println!("  Narrations:      {}", report.narration_count);
    println!();
    if report.out_of_range_ledgers > 0 {
        println!(
            "WARNING: {} ledger(s) hold affection outside [0, 100].",
            report.out_of_range_ledgers
        );
    }
    if report.integrity_ok {
        println!("Integrity check:   PASSED");
    } else {
        println!("Integrity check:   FAILED ({})", report.integrity_details);
        println!();
        println!("Recovery steps:");
        println!("  1. Stop any running `vitality serve` process.");
        println!("  2. Restore from a backup: cp backup.db {}", db_path.display());
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_are_humanized() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
