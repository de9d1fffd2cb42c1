//! Narrator boundary: turns a [`VitalitySnapshot`] into mood and dialogue text.
//!
//! Narration is display metadata. Nothing a narrator returns is fed back into
//! the affection model. Providers are created via [`create_narrator`] from
//! configuration.

pub mod http;
pub mod template;

use anyhow::Result;

use crate::engine::{Narration, VitalitySnapshot};

/// Something that can describe a companion's current state.
///
/// Methods are synchronous; callers in async contexts should use
/// `tokio::task::spawn_blocking`.
pub trait Narrator: Send + Sync {
    fn narrate(&self, snapshot: &VitalitySnapshot) -> Result<Narration>;

    /// Short provider name for logs and reports.
    fn name(&self) -> &'static str;
}

/// Create a narrator from config.
///
/// `"template"` is local and deterministic; `"http"` posts the snapshot to
/// `narrator.endpoint`.
pub fn create_narrator(config: &crate::config::NarratorConfig) -> Result<Box<dyn Narrator>> {
    match config.provider.as_str() {
        "template" => Ok(Box::new(template::TemplateNarrator)),
        "http" => {
            let endpoint = config
                .endpoint
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("narrator.endpoint is required for the http provider"))?;
            let narrator = http::HttpNarrator::new(endpoint, config.timeout_secs)?;
            Ok(Box::new(narrator))
        }
        other => anyhow::bail!("unknown narrator provider: {other}. Supported: template, http"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NarratorConfig;

    #[test]
    fn default_config_builds_template_narrator() {
        let narrator = create_narrator(&NarratorConfig::default()).unwrap();
        assert_eq!(narrator.name(), "template");
    }

    #[test]
    fn http_without_endpoint_is_rejected() {
        let config = NarratorConfig {
            provider: "http".into(),
            endpoint: None,
            ..NarratorConfig::default()
        };
        assert!(create_narrator(&config).is_err());
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let config = NarratorConfig {
            provider: "oracle".into(),
            ..NarratorConfig::default()
        };
        let err = create_narrator(&config).err().unwrap();
        assert!(err.to_string().contains("oracle"));
    }
}
