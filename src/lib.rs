//! Companion vitality and engagement engine.
//!
//! Vitality models a virtual companion whose affection score rises with self-care
//! check-ins and slowly decays when they stop. Every user action (app check-in,
//! meal, meditation, journal entry) flows through one orchestrator that applies
//! catch-up decay, evaluates streaks, rewards the action and persists the result
//! atomically in SQLite.
//!
//! | Action | Reward | Streak |
//! |--------|--------|--------|
//! | **App check-in** | 2 | consecutive days, bonus `min(streak, 3)` |
//! | **Meal check-in** | 2 | breakfast → lunch → dinner cycle, bonus `min(streak, 10)` |
//! | **Meditation** | 10 | none |
//! | **Journal** | 10 | none |
//!
//! Affection starts at 20, stays within `[0, 100]` and loses 3 points per
//! calendar day without a recorded action. Days are counted in the owner's time
//! zone.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`db`]: SQLite database initialization, schema, migrations, and health checks
//! - [`engine`]: Ledger, action log, decay and streak calculators, orchestrator
//! - [`narrator`]: Mood and dialogue text for a snapshot (display only)

pub mod config;
pub mod db;
pub mod engine;
pub mod narrator;
