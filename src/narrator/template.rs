//! Local narrator with fixed phrases per mood.

use anyhow::Result;

use super::Narrator;
use crate::engine::{ActionType, Mood, Narration, VitalitySnapshot};

/// Deterministic narrator: picks a phrase by mood and decorates it with streaks.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateNarrator;

fn mood_line(mood: Mood) -> &'static str {
    match mood {
        Mood::Anxious => "restless and pacing, glancing at the door",
        Mood::Stressed => "tense, tail flicking at every small sound",
        Mood::Neutral => "curious, watching you from across the room",
        Mood::Content => "settled and comfortable beside you",
        Mood::Happy => "bright-eyed and bouncing with affection",
        Mood::Excited => "overjoyed, spinning in circles at your feet",
        Mood::Grateful => "soft and thankful after your quiet reflection",
        Mood::Calm => "peaceful, breathing slowly along with you",
        Mood::Energetic => "full of energy after a good meal",
        Mood::Tired => "drowsy and a little lonely, waiting for you",
    }
}

fn dialogue_line(snapshot: &VitalitySnapshot) -> String {
    match (snapshot.mood, snapshot.last_action) {
        (Mood::Anxious | Mood::Tired, _) => "I missed you. Can we check in together today?".into(),
        (Mood::Stressed, _) => "Let's take a slow breath together.".into(),
        (_, Some(ActionType::MealCheckin)) if snapshot.meal_streak_count > 1 => format!(
            "{} meals in a row! {} next?",
            snapshot.meal_streak_count,
            capitalize(snapshot.next_expected_meal.as_str())
        ),
        (_, Some(ActionType::AppCheckin)) if snapshot.app_streak_days > 1 => {
            format!("Day {} together in a row. Love it!", snapshot.app_streak_days)
        }
        (Mood::Calm, _) => "That was nice. I feel so calm now.".into(),
        (Mood::Grateful, _) => "Thanks for sharing your thoughts with me.".into(),
        (Mood::Excited | Mood::Happy, _) => "You're the best! What should we do next?".into(),
        _ => "Hi! How is your day going?".into(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl Narrator for TemplateNarrator {
    fn narrate(&self, snapshot: &VitalitySnapshot) -> Result<Narration> {
        Ok(Narration {
            mood: mood_line(snapshot.mood).to_string(),
            dialogue: dialogue_line(snapshot),
        }
        .bounded())
    }

    fn name(&self) -> &'static str {
        "template"
    }
}
