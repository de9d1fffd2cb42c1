//! Mood classification from affection and the most recent action.

use super::types::{ActionType, Mood};

/// Classify a companion's mood.
///
/// | Affection | Mood |
/// |-----------|------|
/// | ≥ 90 | Excited |
/// | ≥ 70 | Happy |
/// | ≥ 45 | Content |
/// | ≥ 20 | Neutral |
/// | ≥ 10 | Tired |
/// | < 10 | Anxious |
///
/// In the Content and Happy bands the latest action colours the mood: meditation
/// reads as Calm, journaling as Grateful, a meal as Energetic.
pub fn classify(affection: f64, recent: Option<ActionType>) -> Mood {
    let band = if affection >= 90.0 {
        Mood::Excited
    } else if affection >= 70.0 {
        Mood::Happy
    } else if affection >= 45.0 {
        Mood::Content
    } else if affection >= 20.0 {
        Mood::Neutral
    } else if affection >= 10.0 {
        Mood::Tired
    } else {
        Mood::Anxious
    };

    match (band, recent) {
        (Mood::Content | Mood::Happy, Some(ActionType::Meditation)) => Mood::Calm,
        (Mood::Content | Mood::Happy, Some(ActionType::Journal)) => Mood::Grateful,
        (Mood::Content | Mood::Happy, Some(ActionType::MealCheckin)) => Mood::Energetic,
        (band, _) => band,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_follow_thresholds() {
        assert_eq!(classify(100.0, None), Mood::Excited);
        assert_eq!(classify(90.0, None), Mood::Excited);
        assert_eq!(classify(89.9, None), Mood::Happy);
        assert_eq!(classify(45.0, None), Mood::Content);
        assert_eq!(classify(20.0, None), Mood::Neutral);
        assert_eq!(classify(13.0, None), Mood::Tired);
        assert_eq!(classify(0.0, None), Mood::Anxious);
    }

    #[test]
    fn recent_action_colours_the_middle_bands() {
        assert_eq!(classify(50.0, Some(ActionType::Meditation)), Mood::Calm);
        assert_eq!(classify(75.0, Some(ActionType::Journal)), Mood::Grateful);
        assert_eq!(classify(60.0, Some(ActionType::MealCheckin)), Mood::Energetic);
        assert_eq!(classify(60.0, Some(ActionType::AppCheckin)), Mood::Content);
    }

    #[test]
    fn extremes_ignore_recent_action() {
        assert_eq!(classify(95.0, Some(ActionType::Meditation)), Mood::Excited);
        assert_eq!(classify(5.0, Some(ActionType::Journal)), Mood::Anxious);
        assert_eq!(classify(22.0, Some(ActionType::Meditation)), Mood::Neutral);
    }
}
