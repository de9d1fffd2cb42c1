//! Decay/reward calculator.
//!
//! Pure functions over a ledger and an instant. Decay is linear per calendar day,
//! floored at [`AFFECTION_MIN`]; rewards are a fixed amount per action type plus a
//! capped streak bonus, clamped into `[AFFECTION_MIN, AFFECTION_MAX]`.

use chrono::{DateTime, Utc};

use super::calendar;
use super::types::{ActionType, VitalityLedger};
use crate::config::ScoringConfig;

pub const AFFECTION_MIN: f64 = 0.0;
pub const AFFECTION_MAX: f64 = 100.0;

/// Clamp a score into the affection range. NaN collapses to the floor.
pub fn clamp_affection(value: f64) -> f64 {
    if value.is_nan() {
        return AFFECTION_MIN;
    }
    value.clamp(AFFECTION_MIN, AFFECTION_MAX)
}

/// Whole calendar days between the ledger's last update and `now`, never negative.
pub fn days_elapsed(ledger: &VitalityLedger, now: DateTime<Utc>) -> i64 {
    calendar::elapsed_days(ledger.last_updated_at, now, ledger.offset()).max(0)
}

/// Affection after catch-up decay from `ledger.last_updated_at` to `now`.
///
/// `floor(days × decay_per_day)` is subtracted and the result floored at zero.
/// Zero or negative elapsed days (same day, clock skew) leave the score unchanged.
pub fn apply_decay(ledger: &VitalityLedger, now: DateTime<Utc>, scoring: &ScoringConfig) -> f64 {
    let days = days_elapsed(ledger, now);
    if days <= 0 {
        return ledger.affection;
    }
    let amount = (days as f64 * scoring.decay_per_day).floor();
    (ledger.affection - amount).max(AFFECTION_MIN)
}

/// Soften the decay of a long absence: never drop below the retained floor unless
/// the ledger was already beneath it before decaying.
pub fn retain_after_absence(decayed: f64, before_decay: f64, scoring: &ScoringConfig) -> f64 {
    let floor = scoring.absence_retained_floor.min(before_decay);
    decayed.max(floor)
}

/// Fixed per-action reward, before any streak bonus.
pub fn base_reward(action_type: ActionType, scoring: &ScoringConfig) -> f64 {
    match action_type {
        ActionType::AppCheckin => scoring.app_checkin_reward,
        ActionType::MealCheckin => scoring.meal_checkin_base,
        ActionType::Meditation => scoring.meditation_reward,
        ActionType::Journal => scoring.journal_reward,
    }
}

/// Add the action's reward plus a streak bonus (capped at `streak_bonus_cap`) and clamp.
pub fn apply_reward(
    affection: f64,
    action_type: ActionType,
    streak_bonus: u32,
    scoring: &ScoringConfig,
) -> f64 {
    let bonus = streak_bonus.min(scoring.streak_bonus_cap) as f64;
    clamp_affection(affection + base_reward(action_type, scoring) + bonus)
}
