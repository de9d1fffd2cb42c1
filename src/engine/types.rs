//! Core type definitions for the vitality engine.
//!
//! Defines the action vocabulary ([`ActionType`], [`MealType`], [`ActionKind`]),
//! the persisted aggregates ([`VitalityLedger`], [`ActionRecord`]) and the
//! read model handed to callers ([`VitalitySnapshot`]).

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::calendar;

/// Kind of user action the engine scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Opening the app; at most one credited per owner per calendar day.
    AppCheckin,
    /// Logging a meal; at most one per owner, meal type and calendar day.
    MealCheckin,
    Meditation,
    Journal,
}

impl ActionType {
    pub const ALL: [ActionType; 4] = [
        Self::AppCheckin,
        Self::MealCheckin,
        Self::Meditation,
        Self::Journal,
    ];

    /// SQL-compatible string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AppCheckin => "app_checkin",
            Self::MealCheckin => "meal_checkin",
            Self::Meditation => "meditation",
            Self::Journal => "journal",
        }
    }

    /// Whether at most one action of this type may be credited per calendar day.
    pub fn is_daily_unique(&self) -> bool {
        matches!(self, Self::AppCheckin | Self::MealCheckin)
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for ActionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "app_checkin" => Ok(Self::AppCheckin),
            "meal_checkin" => Ok(Self::MealCheckin),
            "meditation" => Ok(Self::Meditation),
            "journal" => Ok(Self::Journal),
            _ => Err(format!("unknown action type: {s}")),
        }
    }
}

/// Meals, in their cyclical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealType {
    pub const ALL: [MealType; 3] = [Self::Breakfast, Self::Lunch, Self::Dinner];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
        }
    }

    /// The meal that follows this one, wrapping dinner back to breakfast.
    pub fn next(&self) -> MealType {
        match self {
            Self::Breakfast => Self::Lunch,
            Self::Lunch => Self::Dinner,
            Self::Dinner => Self::Breakfast,
        }
    }
}

impl std::fmt::Display for MealType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "breakfast" => Ok(Self::Breakfast),
            "lunch" => Ok(Self::Lunch),
            "dinner" => Ok(Self::Dinner),
            _ => Err(format!("unknown meal type: {s}")),
        }
    }
}

/// Mood classification of a companion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Anxious,
    Stressed,
    Neutral,
    Content,
    Happy,
    Excited,
    Grateful,
    Calm,
    Energetic,
    Tired,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anxious => "anxious",
            Self::Stressed => "stressed",
            Self::Neutral => "neutral",
            Self::Content => "content",
            Self::Happy => "happy",
            Self::Excited => "excited",
            Self::Grateful => "grateful",
            Self::Calm => "calm",
            Self::Energetic => "energetic",
            Self::Tired => "tired",
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "anxious" => Ok(Self::Anxious),
            "stressed" => Ok(Self::Stressed),
            "neutral" => Ok(Self::Neutral),
            "content" => Ok(Self::Content),
            "happy" => Ok(Self::Happy),
            "excited" => Ok(Self::Excited),
            "grateful" => Ok(Self::Grateful),
            "calm" => Ok(Self::Calm),
            "energetic" => Ok(Self::Energetic),
            "tired" => Ok(Self::Tired),
            _ => Err(format!("unknown mood: {s}")),
        }
    }
}

/// Lifecycle state of a companion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanionStatus {
    Active,
    /// Soft-retired: the ledger is kept for history and never changes again.
    Retired,
}

impl CompanionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Retired => "retired",
        }
    }
}

impl std::fmt::Display for CompanionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for CompanionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "retired" => Ok(Self::Retired),
            _ => Err(format!("unknown companion status: {s}")),
        }
    }
}

/// Payload of a single user action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    AppCheckin,
    Meal {
        meal_type: MealType,
        /// 1–5; retained for history and narration, never scored.
        rating: u8,
        notes: Option<String>,
    },
    Meditation {
        duration_minutes: u32,
    },
    Journal {
        title: Option<String>,
        content: String,
        /// How the user says they feel. Display only.
        #[serde(default)]
        mood: Option<Mood>,
        #[serde(default)]
        tags: Vec<String>,
    },
}

impl ActionKind {
    pub fn action_type(&self) -> ActionType {
        match self {
            Self::AppCheckin => ActionType::AppCheckin,
            Self::Meal { .. } => ActionType::MealCheckin,
            Self::Meditation { .. } => ActionType::Meditation,
            Self::Journal { .. } => ActionType::Journal,
        }
    }

    pub fn meal_type(&self) -> Option<MealType> {
        match self {
            Self::Meal { meal_type, .. } => Some(*meal_type),
            _ => None,
        }
    }
}

/// Longest meditation session accepted, in minutes.
pub const MAX_MEDITATION_MINUTES: u32 = 24 * 60;

/// Most tags a journal entry may carry.
pub const MAX_JOURNAL_TAGS: usize = 16;

/// A user action as submitted to [`crate::engine::orchestrator::Engine::record_action`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionInput {
    pub kind: ActionKind,
    /// When the action happened. Defaults to the engine clock. Ignored for app check-ins.
    pub occurred_at: Option<DateTime<Utc>>,
}

impl ActionInput {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            occurred_at: None,
        }
    }

    pub fn app_checkin() -> Self {
        Self::new(ActionKind::AppCheckin)
    }

    pub fn meal(meal_type: MealType, rating: u8) -> Self {
        Self::new(ActionKind::Meal {
            meal_type,
            rating,
            notes: None,
        })
    }

    pub fn meditation(duration_minutes: u32) -> Self {
        Self::new(ActionKind::Meditation { duration_minutes })
    }

    pub fn journal(content: impl Into<String>) -> Self {
        Self::new(ActionKind::Journal {
            title: None,
            content: content.into(),
            mood: None,
            tags: Vec::new(),
        })
    }

    /// Attach notes to a meal check-in. No effect on other kinds.
    pub fn with_notes(mut self, text: impl Into<String>) -> Self {
        if let ActionKind::Meal { notes, .. } = &mut self.kind {
            *notes = Some(text.into());
        }
        self
    }

    /// Tag a journal entry with the user's mood and labels. No effect on other kinds.
    pub fn with_journal_mood(mut self, user_mood: Mood, labels: &[&str]) -> Self {
        if let ActionKind::Journal { mood, tags, .. } = &mut self.kind {
            *mood = Some(user_mood);
            *tags = labels.iter().map(|t| t.to_string()).collect();
        }
        self
    }

    pub fn at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }

    pub fn action_type(&self) -> ActionType {
        self.kind.action_type()
    }

    /// Check field ranges. Sequence problems are not validation errors.
    pub fn validate(&self) -> Result<(), String> {
        match &self.kind {
            ActionKind::Meal { rating, .. } if !(1..=5).contains(rating) => {
                Err(format!("meal rating must be between 1 and 5, got {rating}"))
            }
            ActionKind::Meditation { duration_minutes: 0 } => {
                Err("meditation duration must be at least one minute".into())
            }
            ActionKind::Meditation { duration_minutes } if *duration_minutes > MAX_MEDITATION_MINUTES => {
                Err(format!(
                    "meditation duration must be at most {MAX_MEDITATION_MINUTES} minutes, got {duration_minutes}"
                ))
            }
            ActionKind::Journal { content, .. } if content.trim().is_empty() => {
                Err("journal content must not be empty".into())
            }
            ActionKind::Journal { tags, .. } if tags.len() > MAX_JOURNAL_TAGS => Err(format!(
                "journal entries take at most {MAX_JOURNAL_TAGS} tags, got {}",
                tags.len()
            )),
            ActionKind::Journal { tags, .. } if tags.iter().any(|t| t.trim().is_empty()) => {
                Err("journal tags must not be empty".into())
            }
            _ => Ok(()),
        }
    }
}

/// Per-companion aggregate of affection and streak state, matching the `ledgers` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalityLedger {
    pub companion_id: String,
    pub owner_id: String,
    pub name: String,
    pub status: CompanionStatus,
    /// Always within `[0, 100]`.
    pub affection: f64,
    /// Mood last written by the orchestrator.
    pub mood: Mood,
    /// Instant decay was last applied. Never moves backwards.
    pub last_updated_at: DateTime<Utc>,
    pub app_streak_days: u32,
    /// Calendar day of the last credited app check-in.
    pub last_app_checkin_on: Option<NaiveDate>,
    pub meal_streak_count: u32,
    pub last_meal_type: Option<MealType>,
    pub last_meal_on: Option<NaiveDate>,
    pub last_action: Option<ActionType>,
    /// Owner's UTC offset; defines where calendar days begin for this ledger.
    pub utc_offset_minutes: i32,
    pub adopted_at: DateTime<Utc>,
    pub retired_at: Option<DateTime<Utc>>,
    /// Optimistic-concurrency counter, bumped on every save.
    pub version: i64,
}

impl VitalityLedger {
    /// The owner's time zone as a fixed offset. Falls back to UTC for offsets that
    /// were never valid (the schema check keeps them within ±24h).
    pub fn offset(&self) -> FixedOffset {
        calendar::offset_from_minutes(self.utc_offset_minutes).unwrap_or(calendar::utc())
    }

    /// Calendar day of an instant in the owner's time zone.
    pub fn day_of(&self, ts: DateTime<Utc>) -> NaiveDate {
        calendar::calendar_day(ts, self.offset())
    }
}

/// An immutable log entry for one qualifying action, matching the `action_records` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// UUID v7 primary key.
    pub id: String,
    pub owner_id: String,
    pub companion_id: String,
    pub action_type: ActionType,
    pub meal_type: Option<MealType>,
    pub occurred_at: DateTime<Utc>,
    /// Owner-local day of `occurred_at`; the uniqueness key.
    pub calendar_day: NaiveDate,
    pub duration_minutes: Option<u32>,
    pub rating: Option<u8>,
    pub title: Option<String>,
    /// Meal notes or journal body.
    pub notes: Option<String>,
    /// Mood the user picked for a journal entry.
    pub journal_mood: Option<Mood>,
    pub tags: Vec<String>,
    /// Net affection change caused by this action, decay included.
    pub affection_delta: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Read model of a ledger at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalitySnapshot {
    pub companion_id: String,
    pub owner_id: String,
    pub name: String,
    pub status: CompanionStatus,
    pub affection: f64,
    pub mood: Mood,
    pub app_streak_days: u32,
    pub meal_streak_count: u32,
    pub last_meal_type: Option<MealType>,
    pub next_expected_meal: MealType,
    pub last_action: Option<ActionType>,
    pub last_updated_at: DateTime<Utc>,
}

/// What [`crate::engine::orchestrator::Engine::record_action`] did with an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActionOutcome {
    /// The action was scored and logged.
    Recorded {
        record_id: String,
        /// Affection removed by catch-up decay before the reward.
        decay: f64,
        /// Affection added by the action, after clamping.
        reward: f64,
        /// Whether the action was logged for an earlier day without touching streaks.
        backdated: bool,
    },
    /// Already credited for this day; nothing was written.
    Duplicate,
}

/// Result of recording an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordResult {
    pub snapshot: VitalitySnapshot,
    #[serde(flatten)]
    pub outcome: ActionOutcome,
}

impl RecordResult {
    pub fn is_duplicate(&self) -> bool {
        matches!(self.outcome, ActionOutcome::Duplicate)
    }
}

/// Text produced by a narrator for a snapshot. Display metadata only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narration {
    pub mood: String,
    pub dialogue: String,
}

impl Narration {
    pub const MAX_MOOD_CHARS: usize = 80;
    pub const MAX_DIALOGUE_CHARS: usize = 70;

    /// Trim both fields to their display limits on a char boundary.
    pub fn bounded(self) -> Self {
        Self {
            mood: truncate_chars(self.mood.trim(), Self::MAX_MOOD_CHARS),
            dialogue: truncate_chars(self.dialogue.trim(), Self::MAX_DIALOGUE_CHARS),
        }
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
