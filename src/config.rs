use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct VitalityConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub scoring: ScoringConfig,
    pub narrator: NarratorConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub transport: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
    pub default_owner: String,
}

/// Numeric constants of the affection model.
///
/// Every value here feeds the pure calculators in [`crate::engine::decay`] and
/// [`crate::engine::streak`]; nothing in the engine hardcodes a score.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    pub baseline_affection: f64,
    pub decay_per_day: f64,
    /// Lowest value a long absence can decay affection to before an app check-in
    /// resets the streak. Ledgers already below it are left where they are.
    pub absence_retained_floor: f64,
    pub app_checkin_reward: f64,
    pub meal_checkin_base: f64,
    pub meditation_reward: f64,
    pub journal_reward: f64,
    pub app_streak_bonus_cap: u32,
    pub meal_streak_bonus_cap: u32,
    pub streak_bonus_cap: u32,
    /// Offset applied to new companions when the caller does not provide one.
    pub default_utc_offset_minutes: i32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NarratorConfig {
    /// `template` (local, deterministic) or `http`.
    pub provider: String,
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: "stdio".into(),
            host: "127.0.0.1".into(),
            port: 8931,
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_vitality_dir()
            .join("vitality.db")
            .to_string_lossy()
            .into_owned();
        Self {
            db_path,
            default_owner: "local".into(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            baseline_affection: 20.0,
            decay_per_day: 3.0,
            absence_retained_floor: 10.0,
            app_checkin_reward: 2.0,
            meal_checkin_base: 2.0,
            meditation_reward: 10.0,
            journal_reward: 10.0,
            app_streak_bonus_cap: 3,
            meal_streak_bonus_cap: 10,
            streak_bonus_cap: 10,
            default_utc_offset_minutes: 0,
        }
    }
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self {
            provider: "template".into(),
            endpoint: None,
            timeout_secs: 10,
        }
    }
}

/// Returns `~/.vitality/`
pub fn default_vitality_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".vitality")
}

/// Returns the default config file path: `~/.vitality/config.toml`
pub fn default_config_path() -> PathBuf {
    default_vitality_dir().join("config.toml")
}

impl VitalityConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            VitalityConfig::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides (VITALITY_DB, VITALITY_LOG_LEVEL,
    /// VITALITY_UTC_OFFSET_MINUTES, VITALITY_NARRATOR_URL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("VITALITY_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("VITALITY_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("VITALITY_UTC_OFFSET_MINUTES") {
            match val.parse() {
                Ok(minutes) => self.scoring.default_utc_offset_minutes = minutes,
                Err(_) => tracing::warn!(value = %val, "ignoring non-numeric VITALITY_UTC_OFFSET_MINUTES"),
            }
        }
        if let Ok(val) = std::env::var("VITALITY_NARRATOR_URL") {
            self.narrator.provider = "http".into();
            self.narrator.endpoint = Some(val);
        }
    }

    /// Reject scoring tables that would break the affection clamp.
    pub fn validate(&self) -> Result<()> {
        use crate::engine::decay::{AFFECTION_MAX, AFFECTION_MIN};

        let s = &self.scoring;
        anyhow::ensure!(
            (AFFECTION_MIN..=AFFECTION_MAX).contains(&s.baseline_affection),
            "scoring.baseline_affection ({}) is outside [{AFFECTION_MIN}, {AFFECTION_MAX}]",
            s.baseline_affection,
        );
        anyhow::ensure!(
            (AFFECTION_MIN..=AFFECTION_MAX).contains(&s.absence_retained_floor),
            "scoring.absence_retained_floor ({}) is outside [{AFFECTION_MIN}, {AFFECTION_MAX}]",
            s.absence_retained_floor,
        );
        anyhow::ensure!(s.decay_per_day >= 0.0, "scoring.decay_per_day must not be negative");
        for (name, reward) in [
            ("app_checkin_reward", s.app_checkin_reward),
            ("meal_checkin_base", s.meal_checkin_base),
            ("meditation_reward", s.meditation_reward),
            ("journal_reward", s.journal_reward),
        ] {
            anyhow::ensure!(reward >= 0.0, "scoring.{name} must not be negative");
        }
        anyhow::ensure!(
            crate::engine::calendar::offset_from_minutes(s.default_utc_offset_minutes).is_some(),
            "scoring.default_utc_offset_minutes ({}) is not a valid UTC offset",
            s.default_utc_offset_minutes
        );
        Ok(())
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = VitalityConfig::default();
        assert_eq!(config.server.transport, "stdio");
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.storage.default_owner, "local");
        assert_eq!(config.scoring.baseline_affection, 20.0);
        assert_eq!(config.scoring.decay_per_day, 3.0);
        assert_eq!(config.narrator.provider, "template");
        assert!(config.storage.db_path.ends_with("vitality.db"));
        config.validate().unwrap();
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
log_level = "debug"

[storage]
db_path = "/tmp/test.db"

[scoring]
decay_per_day = 5.0
meditation_reward = 12.0
"#;
        let config: VitalityConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.storage.db_path, "/tmp/test.db");
        assert_eq!(config.scoring.decay_per_day, 5.0);
        assert_eq!(config.scoring.meditation_reward, 12.0);
        // defaults still apply for unset fields
        assert_eq!(config.scoring.journal_reward, 10.0);
        assert_eq!(config.storage.default_owner, "local");
    }

    #[test]
    fn validate_rejects_negative_decay() {
        let mut config = VitalityConfig::default();
        config.scoring.decay_per_day = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_offset() {
        let mut config = VitalityConfig::default();
        config.scoring.default_utc_offset_minutes = 24 * 60;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_baseline_outside_bounds() {
        let mut config = VitalityConfig::default();
        config.scoring.baseline_affection = 140.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = VitalityConfig::default();
        std::env::set_var("VITALITY_DB", "/tmp/override.db");
        std::env::set_var("VITALITY_LOG_LEVEL", "trace");
        std::env::set_var("VITALITY_UTC_OFFSET_MINUTES", "-300");
        std::env::set_var("VITALITY_NARRATOR_URL", "http://localhost:9000/narrate");

        config.apply_env_overrides();

        assert_eq!(config.storage.db_path, "/tmp/override.db");
        assert_eq!(config.server.log_level, "trace");
        assert_eq!(config.scoring.default_utc_offset_minutes, -300);
        assert_eq!(config.narrator.provider, "http");
        assert_eq!(
            config.narrator.endpoint.as_deref(),
            Some("http://localhost:9000/narrate")
        );

        // Clean up
        std::env::remove_var("VITALITY_DB");
        std::env::remove_var("VITALITY_LOG_LEVEL");
        std::env::remove_var("VITALITY_UTC_OFFSET_MINUTES");
        std::env::remove_var("VITALITY_NARRATOR_URL");
    }
}
