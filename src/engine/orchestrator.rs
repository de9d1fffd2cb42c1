//! Engagement orchestrator: the only code that mutates a ledger.
//!
//! [`Engine::record_action`] runs the whole update inside one `BEGIN IMMEDIATE`
//! transaction:
//!
//! 1. load the ledger (`NotFound` / `Retired` abort here)
//! 2. check the action log for an already-credited day (soft no-op on a hit)
//! 3. catch-up decay from `last_updated_at` to now
//! 4. streak evaluation for app and meal check-ins
//! 5. reward, clamp, classify mood
//! 6. append the action record and compare-and-swap the ledger
//!
//! Either both writes commit or neither does. Reads ([`Engine::get_snapshot`]) apply
//! decay on the fly and never persist it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;

use super::actions::{append_action_record, find_action_record};
use super::calendar;
use super::clock::{Clock, SystemClock};
use super::decay::{apply_decay, apply_reward, days_elapsed, retain_after_absence};
use super::error::{Result, VitalityError};
use super::ledger::{create_ledger, list_ledgers, load_ledger, save_ledger};
use super::mood::classify;
use super::streak::{evaluate_app_checkin, evaluate_meal, next_expected_meal, AppStreakOutcome};
use super::types::{
    ActionInput, ActionKind, ActionOutcome, ActionRecord, ActionType, CompanionStatus,
    Mood, RecordResult, VitalityLedger, VitalitySnapshot,
};
use crate::config::ScoringConfig;

/// One line per companion in [`Engine::list_companions`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanionSummary {
    pub companion_id: String,
    pub name: String,
    pub status: CompanionStatus,
    pub affection: f64,
    pub mood: Mood,
    pub app_streak_days: u32,
    pub adopted_at: DateTime<Utc>,
}

/// The vitality engine: scoring constants plus a time source.
#[derive(Clone)]
pub struct Engine {
    scoring: ScoringConfig,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("scoring", &self.scoring)
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub fn new(scoring: ScoringConfig, clock: Arc<dyn Clock>) -> Self {
        Self { scoring, clock }
    }

    pub fn with_system_clock(scoring: ScoringConfig) -> Self {
        Self::new(scoring, Arc::new(SystemClock))
    }

    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Create a companion at baseline affection with no streak history.
    pub fn adopt_companion(
        &self,
        conn: &Connection,
        owner_id: &str,
        name: &str,
        utc_offset_minutes: Option<i32>,
    ) -> Result<VitalitySnapshot> {
        let name = name.trim();
        if name.is_empty() {
            return Err(VitalityError::InvalidInput(
                "companion name must not be empty".into(),
            ));
        }
        if owner_id.trim().is_empty() {
            return Err(VitalityError::InvalidInput("owner id must not be empty".into()));
        }
        let offset = utc_offset_minutes.unwrap_or(self.scoring.default_utc_offset_minutes);
        if calendar::offset_from_minutes(offset).is_none() {
            return Err(VitalityError::InvalidInput(format!(
                "utc offset {offset} minutes is out of range"
            )));
        }

        let now = self.now();
        let affection = self.scoring.baseline_affection;
        let ledger = VitalityLedger {
            companion_id: uuid::Uuid::now_v7().to_string(),
            owner_id: owner_id.to_string(),
            name: name.to_string(),
            status: CompanionStatus::Active,
            affection,
            mood: classify(affection, None),
            last_updated_at: now,
            app_streak_days: 0,
            last_app_checkin_on: None,
            meal_streak_count: 0,
            last_meal_type: None,
            last_meal_on: None,
            last_action: None,
            utc_offset_minutes: offset,
            adopted_at: now,
            retired_at: None,
            version: 0,
        };
        create_ledger(conn, &ledger)?;

        tracing::info!(
            owner_id = %ledger.owner_id,
            companion_id = %ledger.companion_id,
            name = %ledger.name,
            "companion adopted"
        );
        Ok(self.snapshot_at(&ledger, now))
    }

    /// Score one user action and persist the result atomically.
    ///
    /// Duplicate check-ins resolve to [`ActionOutcome::Duplicate`] with the current
    /// snapshot and write nothing. Only storage failures, unknown or retired
    /// companions, and malformed input are errors.
    pub fn record_action(
        &self,
        conn: &mut Connection,
        owner_id: &str,
        companion_id: &str,
        input: ActionInput,
    ) -> Result<RecordResult> {
        input.validate().map_err(VitalityError::InvalidInput)?;

        let now = self.now();
        let action_type = input.action_type();

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let before = load_ledger(&tx, owner_id, companion_id)?;
        if before.status == CompanionStatus::Retired {
            return Err(VitalityError::Retired(companion_id.to_string()));
        }

        let occurred_at = match action_type {
            ActionType::AppCheckin => now,
            _ => input.occurred_at.map_or(now, |ts| ts.min(now)),
        };
        let day = before.day_of(occurred_at);

        if action_type.is_daily_unique()
            && find_action_record(&tx, owner_id, action_type, input.kind.meal_type(), day)?
                .is_some()
        {
            tracing::debug!(
                owner_id,
                companion_id,
                action = %action_type,
                %day,
                "duplicate check-in ignored"
            );
            return Ok(self.duplicate(&before, now));
        }

        if now < before.last_updated_at {
            tracing::warn!(
                owner_id,
                companion_id,
                now = %now,
                last_updated_at = %before.last_updated_at,
                "clock skew: now precedes last update, decay skipped"
            );
        }

        let decayed = apply_decay(&before, now, &self.scoring);
        if decayed < before.affection {
            tracing::debug!(
                companion_id,
                days = days_elapsed(&before, now),
                from = before.affection,
                to = decayed,
                "decay applied"
            );
        }

        let backdated =
            action_type != ActionType::AppCheckin && day < before.day_of(before.last_updated_at);

        let mut ledger = before.clone();
        let mut base = decayed;
        let mut bonus = 0;

        match &input.kind {
            ActionKind::AppCheckin => {
                let update = evaluate_app_checkin(
                    ledger.last_app_checkin_on,
                    ledger.app_streak_days,
                    day,
                    &self.scoring,
                );
                if !update.outcome.is_credited() {
                    tracing::debug!(
                        owner_id,
                        companion_id,
                        outcome = ?update.outcome,
                        "app check-in not credited"
                    );
                    return Ok(self.duplicate(&before, now));
                }
                if let AppStreakOutcome::Reset { gap_days } = update.outcome {
                    base = retain_after_absence(decayed, before.affection, &self.scoring);
                    tracing::info!(
                        owner_id,
                        companion_id,
                        gap_days,
                        previous_streak = before.app_streak_days,
                        "app streak reset"
                    );
                }
                ledger.app_streak_days = update.streak;
                ledger.last_app_checkin_on = Some(day);
                bonus = update.bonus;
            }
            ActionKind::Meal { meal_type, .. } if !backdated => {
                let update = evaluate_meal(
                    ledger.last_meal_type,
                    ledger.last_meal_on,
                    ledger.meal_streak_count,
                    *meal_type,
                    day,
                    &self.scoring,
                );
                tracing::debug!(
                    companion_id,
                    meal = %meal_type,
                    outcome = ?update.outcome,
                    streak = update.streak,
                    "meal streak evaluated"
                );
                ledger.meal_streak_count = update.streak;
                ledger.last_meal_type = Some(*meal_type);
                ledger.last_meal_on = Some(day);
                bonus = update.bonus;
            }
            ActionKind::Meal { .. } | ActionKind::Meditation { .. } | ActionKind::Journal { .. } => {}
        }

        let affection = apply_reward(base, action_type, bonus, &self.scoring);
        ledger.affection = affection;
        if !backdated {
            ledger.last_action = Some(action_type);
        }
        ledger.mood = classify(affection, ledger.last_action);
        ledger.last_updated_at = before.last_updated_at.max(now);

        let record = build_record(&ledger, &input, occurred_at, day, affection - before.affection, now);

        match append_action_record(&tx, &record) {
            Ok(()) => {}
            Err(err) if err.is_unique_violation() => {
                drop(tx);
                tracing::debug!(owner_id, companion_id, action = %action_type, "duplicate caught by unique index");
                return Ok(self.duplicate(&before, now));
            }
            Err(err) => {
                tracing::error!(owner_id, companion_id, error = %err, "failed to append action record");
                return Err(err);
            }
        }
        ledger.version = save_ledger(&tx, &ledger)?;
        tx.commit()?;

        tracing::info!(
            owner_id,
            companion_id,
            action = %action_type,
            affection = ledger.affection,
            mood = %ledger.mood,
            backdated,
            "action recorded"
        );

        Ok(RecordResult {
            snapshot: self.snapshot_at(&ledger, now),
            outcome: ActionOutcome::Recorded {
                record_id: record.id,
                decay: before.affection - decayed,
                reward: affection - base,
                backdated,
            },
        })
    }

    /// Current state of a companion with decay applied on read. Never writes.
    pub fn get_snapshot(
        &self,
        conn: &Connection,
        owner_id: &str,
        companion_id: &str,
    ) -> Result<VitalitySnapshot> {
        let ledger = load_ledger(conn, owner_id, companion_id)?;
        Ok(self.snapshot_at(&ledger, self.now()))
    }

    /// Freeze a companion's ledger. Decay up to now is committed first; retiring an
    /// already-retired companion returns its frozen snapshot.
    pub fn retire_companion(
        &self,
        conn: &mut Connection,
        owner_id: &str,
        companion_id: &str,
    ) -> Result<VitalitySnapshot> {
        let now = self.now();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut ledger = load_ledger(&tx, owner_id, companion_id)?;
        if ledger.status == CompanionStatus::Retired {
            return Ok(self.snapshot_at(&ledger, now));
        }

        ledger.affection = apply_decay(&ledger, now, &self.scoring);
        ledger.mood = classify(ledger.affection, ledger.last_action);
        ledger.last_updated_at = ledger.last_updated_at.max(now);
        ledger.status = CompanionStatus::Retired;
        ledger.retired_at = Some(now);
        ledger.version = save_ledger(&tx, &ledger)?;
        tx.commit()?;

        tracing::info!(owner_id, companion_id, affection = ledger.affection, "companion retired");
        Ok(self.snapshot_at(&ledger, now))
    }

    /// Every companion of an owner with decay-on-read affection.
    pub fn list_companions(&self, conn: &Connection, owner_id: &str) -> Result<Vec<CompanionSummary>> {
        let now = self.now();
        let summaries = list_ledgers(conn, owner_id, None)?
            .into_iter()
            .map(|ledger| {
                let snapshot = self.snapshot_at(&ledger, now);
                CompanionSummary {
                    companion_id: ledger.companion_id,
                    name: ledger.name,
                    status: ledger.status,
                    affection: snapshot.affection,
                    mood: snapshot.mood,
                    app_streak_days: snapshot.app_streak_days,
                    adopted_at: ledger.adopted_at,
                }
            })
            .collect();
        Ok(summaries)
    }

    /// Pure read model of `ledger` as of `now`. Retired ledgers do not decay.
    pub fn snapshot_at(&self, ledger: &VitalityLedger, now: DateTime<Utc>) -> VitalitySnapshot {
        let affection = match ledger.status {
            CompanionStatus::Active => apply_decay(ledger, now, &self.scoring),
            CompanionStatus::Retired => ledger.affection,
        };
        VitalitySnapshot {
            companion_id: ledger.companion_id.clone(),
            owner_id: ledger.owner_id.clone(),
            name: ledger.name.clone(),
            status: ledger.status,
            affection,
            mood: classify(affection, ledger.last_action),
            app_streak_days: ledger.app_streak_days,
            meal_streak_count: ledger.meal_streak_count,
            last_meal_type: ledger.last_meal_type,
            next_expected_meal: next_expected_meal(ledger.last_meal_type),
            last_action: ledger.last_action,
            last_updated_at: ledger.last_updated_at,
        }
    }

    fn duplicate(&self, ledger: &VitalityLedger, now: DateTime<Utc>) -> RecordResult {
        RecordResult {
            snapshot: self.snapshot_at(ledger, now),
            outcome: ActionOutcome::Duplicate,
        }
    }
}

fn build_record(
    ledger: &VitalityLedger,
    input: &ActionInput,
    occurred_at: DateTime<Utc>,
    day: chrono::NaiveDate,
    affection_delta: f64,
    now: DateTime<Utc>,
) -> ActionRecord {
    let mut record = ActionRecord {
        id: uuid::Uuid::now_v7().to_string(),
        owner_id: ledger.owner_id.clone(),
        companion_id: ledger.companion_id.clone(),
        action_type: input.action_type(),
        meal_type: input.kind.meal_type(),
        occurred_at,
        calendar_day: day,
        duration_minutes: None,
        rating: None,
        title: None,
        notes: None,
        journal_mood: None,
        tags: Vec::new(),
        affection_delta,
        recorded_at: now,
    };
    match &input.kind {
        ActionKind::AppCheckin => {}
        ActionKind::Meal { rating, notes, .. } => {
            record.rating = Some(*rating);
            record.notes = notes.clone();
        }
        ActionKind::Meditation { duration_minutes } => {
            record.duration_minutes = Some(*duration_minutes);
        }
        ActionKind::Journal {
            title,
            content,
            mood,
            tags,
        } => {
            record.title = title.clone();
            record.notes = Some(content.clone());
            record.journal_mood = *mood;
            record.tags = tags.iter().map(|t| t.trim().to_string()).collect();
        }
    }
    record
}
