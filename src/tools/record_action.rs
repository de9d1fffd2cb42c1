//! MCP `record_action` tool parameter definition.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use vitality::engine::{ActionInput, ActionKind, ActionType, MealType, Mood};

/// Parameters for the `record_action` MCP tool.
///
/// Which optional fields apply depends on `action`: meals need `meal_type` and
/// `rating`, meditation needs `duration_minutes`, journals need `content`.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RecordActionParams {
    #[schemars(description = "Action type: 'app_checkin', 'meal_checkin', 'meditation' or 'journal'")]
    pub action: String,

    #[schemars(description = "Companion id. Defaults to the owner's most recently adopted active companion.")]
    pub companion_id: Option<String>,

    #[schemars(description = "Owner id. Defaults to the configured default owner.")]
    pub owner_id: Option<String>,

    #[schemars(description = "Meal checked in: 'breakfast', 'lunch' or 'dinner'. Required for meal_checkin.")]
    pub meal_type: Option<String>,

    #[schemars(description = "Meal rating 1-5. Required for meal_checkin.")]
    pub rating: Option<u8>,

    #[schemars(description = "Optional meal notes")]
    pub notes: Option<String>,

    #[schemars(description = "Meditation length in minutes. Required for meditation.")]
    pub duration_minutes: Option<u32>,

    #[schemars(description = "Optional journal title")]
    pub title: Option<String>,

    #[schemars(description = "Journal body. Required for journal.")]
    pub content: Option<String>,

    #[schemars(
        description = "How the user feels, for journal: anxious, stressed, neutral, content, happy, excited, grateful, calm, energetic or tired. Display only."
    )]
    pub mood: Option<String>,

    #[schemars(description = "Labels for a journal entry")]
    pub tags: Option<Vec<String>>,

    /// RFC 3339. Past values backdate meals, meditation and journals; app check-ins
    /// always use the current time.
    #[schemars(
        description = "When the action happened, RFC 3339. Defaults to now. Ignored for app_checkin; future times are clamped to now."
    )]
    pub occurred_at: Option<String>,
}

impl RecordActionParams {
    /// Build the engine input, reporting missing or malformed fields as a message.
    pub fn to_input(&self) -> Result<ActionInput, String> {
        let action_type: ActionType = self.action.parse()?;

        let kind = match action_type {
            ActionType::AppCheckin => ActionKind::AppCheckin,
            ActionType::MealCheckin => {
                let meal_type: MealType = self
                    .meal_type
                    .as_deref()
                    .ok_or("meal_type is required for meal_checkin")?
                    .parse()?;
                let rating = self.rating.ok_or("rating is required for meal_checkin")?;
                ActionKind::Meal {
                    meal_type,
                    rating,
                    notes: self.notes.clone(),
                }
            }
            ActionType::Meditation => ActionKind::Meditation {
                duration_minutes: self
                    .duration_minutes
                    .ok_or("duration_minutes is required for meditation")?,
            },
            ActionType::Journal => ActionKind::Journal {
                title: self.title.clone(),
                content: self
                    .content
                    .clone()
                    .ok_or("content is required for journal")?,
                mood: self.mood.as_deref().map(str::parse::<Mood>).transpose()?,
                tags: self.tags.clone().unwrap_or_default(),
            },
        };

        let mut input = ActionInput::new(kind);
        if let Some(raw) = &self.occurred_at {
            let at = DateTime::parse_from_rfc3339(raw)
                .map_err(|e| format!("occurred_at is not RFC 3339 ({raw}): {e}"))?;
            input = input.at(at.with_timezone(&Utc));
        }
        input.validate()?;
        Ok(input)
    }
}
