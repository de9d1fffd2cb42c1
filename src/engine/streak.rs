//! Streak evaluators.
//!
//! Two state machines, both driven by owner-local calendar days:
//!
//! - **App check-in streak**: consecutive days with a credited check-in.
//!   `NoHistory → Day(1)`, then `Day(n) → Day(n + 1)` on the next day,
//!   `Day(n) → Day(1)` after a gap, and same-day repeats are no-ops.
//! - **Meal sequence streak**: consecutive meals logged in the cyclical order
//!   breakfast → lunch → dinner → breakfast. A wrong meal resets the count to 1.
//!
//! Both are pure: they read the counters off a ledger and return the new ones.

use chrono::NaiveDate;
use serde::Serialize;

use super::calendar::days_between;
use super::types::MealType;
use crate::config::ScoringConfig;

/// How an app check-in relates to the previous credited one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AppStreakOutcome {
    /// First check-in ever.
    Started,
    /// Exactly one day after the previous check-in.
    Extended,
    /// More than one day since the previous check-in.
    Reset { gap_days: i64 },
    /// Same calendar day as the previous check-in; already credited.
    SameDay,
    /// Earlier day than the previous check-in (clock skew); ignored.
    Stale,
}

impl AppStreakOutcome {
    /// Whether this check-in earns anything.
    pub fn is_credited(&self) -> bool {
        !matches!(self, Self::SameDay | Self::Stale)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AppStreakUpdate {
    pub outcome: AppStreakOutcome,
    /// Streak length after this check-in.
    pub streak: u32,
    /// Bonus on top of the base reward.
    pub bonus: u32,
}

/// Evaluate an app check-in on `day` against the last credited check-in day.
pub fn evaluate_app_checkin(
    last_checkin_on: Option<NaiveDate>,
    current_streak: u32,
    day: NaiveDate,
    scoring: &ScoringConfig,
) -> AppStreakUpdate {
    let Some(previous) = last_checkin_on else {
        return AppStreakUpdate {
            outcome: AppStreakOutcome::Started,
            streak: 1,
            bonus: 0,
        };
    };

    match days_between(previous, day) {
        0 => AppStreakUpdate {
            outcome: AppStreakOutcome::SameDay,
            streak: current_streak,
            bonus: 0,
        },
        1 => {
            let streak = current_streak.saturating_add(1);
            AppStreakUpdate {
                outcome: AppStreakOutcome::Extended,
                streak,
                bonus: streak.min(scoring.app_streak_bonus_cap),
            }
        }
        gap if gap > 1 => AppStreakUpdate {
            outcome: AppStreakOutcome::Reset { gap_days: gap },
            streak: 1,
            bonus: 0,
        },
        _ => AppStreakUpdate {
            outcome: AppStreakOutcome::Stale,
            streak: current_streak,
            bonus: 0,
        },
    }
}

/// The meal expected after `last`. Breakfast when nothing has been logged yet.
pub fn next_expected_meal(last: Option<MealType>) -> MealType {
    last.map(|meal| meal.next()).unwrap_or(MealType::Breakfast)
}

/// How a meal check-in relates to the sequence so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MealStreakOutcome {
    /// First meal ever logged.
    Started,
    /// The expected meal, on the same day or later.
    Extended,
    /// Out of sequence (repeat, skipped meal, or earlier day). Not an error.
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MealStreakUpdate {
    pub outcome: MealStreakOutcome,
    pub streak: u32,
    pub bonus: u32,
}

/// Evaluate a meal of type `meal` on `day` against the last logged meal.
pub fn evaluate_meal(
    last_meal: Option<MealType>,
    last_meal_on: Option<NaiveDate>,
    current_streak: u32,
    meal: MealType,
    day: NaiveDate,
    scoring: &ScoringConfig,
) -> MealStreakUpdate {
    let (outcome, streak) = match last_meal {
        None => (MealStreakOutcome::Started, 1),
        Some(previous) => {
            let in_order = meal == next_expected_meal(Some(previous));
            let not_earlier = last_meal_on.map_or(true, |last_day| day >= last_day);
            if in_order && not_earlier {
                (MealStreakOutcome::Extended, current_streak.saturating_add(1))
            } else {
                (MealStreakOutcome::Reset, 1)
            }
        }
    };

    MealStreakUpdate {
        outcome,
        streak,
        bonus: streak.min(scoring.meal_streak_bonus_cap),
    }
}
