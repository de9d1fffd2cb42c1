//! Narrator backed by an external text-generation service.
//!
//! POSTs the snapshot as JSON to the configured endpoint and expects a
//! `{"mood": "...", "dialogue": "..."}` body back.

use std::time::Duration;

use anyhow::{Context, Result};

use super::Narrator;
use crate::engine::{Narration, VitalitySnapshot};

/// Builds a blocking client per call; invoke from a blocking thread.
#[derive(Debug, Clone)]
pub struct HttpNarrator {
    endpoint: String,
    timeout: Duration,
}

impl HttpNarrator {
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self> {
        let endpoint = endpoint.trim();
        anyhow::ensure!(
            endpoint.starts_with("http://") || endpoint.starts_with("https://"),
            "narrator endpoint must be an http(s) URL, got {endpoint:?}"
        );
        Ok(Self {
            endpoint: endpoint.to_string(),
            timeout: Duration::from_secs(timeout_secs.max(1)),
        })
    }
}

impl Narrator for HttpNarrator {
    fn narrate(&self, snapshot: &VitalitySnapshot) -> Result<Narration> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .context("failed to build narrator HTTP client")?;
        let response = client
            .post(&self.endpoint)
            .json(snapshot)
            .send()
            .with_context(|| format!("narrator request to {} failed", self.endpoint))?;

        anyhow::ensure!(
            response.status().is_success(),
            "narrator returned HTTP {}",
            response.status()
        );

        let narration: Narration = response
            .json()
            .context("narrator response is not {mood, dialogue} JSON")?;
        tracing::debug!(endpoint = %self.endpoint, mood = %narration.mood, "narration received");
        Ok(narration.bounded())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_must_be_http() {
        assert!(HttpNarrator::new("ftp://example.com", 5).is_err());
        assert!(HttpNarrator::new("localhost:9000", 5).is_err());
        let narrator = HttpNarrator::new(" http://127.0.0.1:9000/narrate ", 0).unwrap();
        assert_eq!(narrator.endpoint, "http://127.0.0.1:9000/narrate");
        assert_eq!(narrator.timeout, Duration::from_secs(1));
    }

    #[test]
    fn unreachable_endpoint_is_an_error() {
        use crate::engine::{CompanionStatus, MealType, Mood};

        let narrator = HttpNarrator::new("http://127.0.0.1:9/narrate", 1).unwrap();
        let snapshot = VitalitySnapshot {
            companion_id: "c1".into(),
            owner_id: "o1".into(),
            name: "Bean".into(),
            status: CompanionStatus::Active,
            affection: 20.0,
            mood: Mood::Neutral,
            app_streak_days: 0,
            meal_streak_count: 0,
            last_meal_type: None,
            next_expected_meal: MealType::Breakfast,
            last_action: None,
            last_updated_at: chrono::Utc::now(),
        };
        assert!(narrator.narrate(&snapshot).is_err());
    }
}
