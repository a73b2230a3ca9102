//! Runtime settings loaded from an optional YAML file.
//!
//! Every field has a default, so a settings file only needs the values it
//! changes:
//!
//! ```yaml
//! listing_timeout_secs: 15
//! enrich:
//!   batch_size: 5
//! sources:
//!   latest:
//!     url: https://sinhala.newsfirst.lk/latest-news
//!     kind: html
//! ```

use crate::error::{Result, ScrapeError};
use crate::sources::{DEFAULT_SOURCE, SourceConfig, default_sources};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Top-level settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    pub listing_timeout_secs: u64,
    pub article_timeout_secs: u64,
    pub extraction: ExtractionSettings,
    pub enrich: EnrichSettings,
    pub cache: CacheSettings,
    pub sources: BTreeMap<String, SourceConfig>,
}

/// Thresholds and caps used by the extractors.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// Candidates kept by the container pass.
    pub primary_cap: usize,
    /// Candidates kept by the aggressive pass.
    pub aggressive_cap: usize,
    /// A title candidate is accepted once it is longer than this.
    pub title_accept_len: usize,
    /// A record is emitted only when its topic is longer than this.
    pub min_topic_len: usize,
    pub max_topic_len: usize,
    /// Aggressive pass window, both bounds exclusive.
    pub aggressive_min_len: usize,
    pub aggressive_max_len: usize,
    /// Cleaned descriptions at or under this length are discarded.
    pub min_description_len: usize,
    pub listing_description_cap: usize,
    pub json_description_cap: usize,
    /// Path fragment identifying article images on the source's media host.
    pub upload_path: String,
    /// Path fragments that never point at article content.
    pub excluded_image_paths: Vec<String>,
}

/// Article-page enrichment tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EnrichSettings {
    pub batch_size: usize,
    pub batch_delay_ms: u64,
    pub stagger_ms: u64,
    /// Records enriched per run when enrichment is not forced.
    pub auto_limit: usize,
    /// Descriptions shorter than this are enrichment targets.
    pub short_len: usize,
    pub description_cap: usize,
}

/// `Cache-Control` max-age values.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheSettings {
    pub max_age_secs: u32,
    pub enriched_max_age_secs: u32,
}

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            accept_language: "en-US,en;q=0.5".to_string(),
            listing_timeout_secs: 10,
            article_timeout_secs: 5,
            extraction: ExtractionSettings::default(),
            enrich: EnrichSettings::default(),
            cache: CacheSettings::default(),
            sources: default_sources(),
        }
    }
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            primary_cap: 20,
            aggressive_cap: 10,
            title_accept_len: 10,
            min_topic_len: 5,
            max_topic_len: 200,
            aggressive_min_len: 15,
            aggressive_max_len: 200,
            min_description_len: 20,
            listing_description_cap: 300,
            json_description_cap: 1000,
            upload_path: "/uploads/".to_string(),
            excluded_image_paths: vec![
                "/assets/".to_string(),
                "/ads/".to_string(),
                "/statics/".to_string(),
            ],
        }
    }
}

impl Default for EnrichSettings {
    fn default() -> Self {
        Self {
            batch_size: 3,
            batch_delay_ms: 1000,
            stagger_ms: 500,
            auto_limit: 5,
            short_len: 50,
            description_cap: 400,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_age_secs: 300,
            enriched_max_age_secs: 600,
        }
    }
}

impl Settings {
    /// Load settings from `path`, or the defaults when no path is given.
    #[instrument(level = "info")]
    pub fn load(path: Option<&str>) -> Result<Self> {
        let settings = match path {
            Some(p) => {
                let raw = std::fs::read_to_string(Path::new(p))?;
                let settings = Self::from_yaml(&raw)?;
                info!(path = p, sources = settings.sources.len(), "Loaded settings file");
                settings
            }
            None => {
                info!("No settings file given; using defaults");
                Self::default()
            }
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from YAML text.
    pub fn from_yaml(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw).map_err(|e| ScrapeError::Config(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        if self.enrich.batch_size == 0 {
            return Err(ScrapeError::Config("enrich.batch_size must be at least 1".into()));
        }
        if self.extraction.primary_cap == 0 || self.extraction.aggressive_cap == 0 {
            return Err(ScrapeError::Config("candidate caps must be at least 1".into()));
        }
        if !self.sources.contains_key(DEFAULT_SOURCE) {
            return Err(ScrapeError::Config(format!(
                "sources must define `{DEFAULT_SOURCE}`"
            )));
        }
        Ok(())
    }

    /// Resolve a `type` value to a source name and its endpoint, falling back to `latest`.
    pub fn source(&self, name: Option<&str>) -> (&str, &SourceConfig) {
        if let Some(n) = name {
            if let Some((key, src)) = self.sources.get_key_value(n) {
                return (key.as_str(), src);
            }
            warn!(requested = n, "Unknown source type; using default");
        }
        let (key, src) = self
            .sources
            .get_key_value(DEFAULT_SOURCE)
            .or_else(|| self.sources.iter().next())
            .expect("validated settings always contain a source");
        (key.as_str(), src)
    }

    pub fn listing_timeout(&self) -> Duration {
        Duration::from_secs(self.listing_timeout_secs)
    }

    pub fn article_timeout(&self) -> Duration {
        Duration::from_secs(self.article_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::SourceKind;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let settings =
            Settings::from_yaml("listing_timeout_secs: 15\nenrich:\n  batch_size: 5\n").unwrap();
        assert_eq!(settings.listing_timeout_secs, 15);
        assert_eq!(settings.enrich.batch_size, 5);
        assert_eq!(settings.enrich.auto_limit, 5);
        assert_eq!(settings.extraction.primary_cap, 20);
        assert_eq!(settings.sources.len(), 7);
    }

    #[test]
    fn test_source_fallback_to_latest() {
        let settings = Settings::default();
        let (name, src) = settings.source(Some("gossip"));
        assert_eq!(name, "latest");
        assert_eq!(src.kind, SourceKind::Html);

        let (name, _) = settings.source(None);
        assert_eq!(name, "latest");

        let (name, src) = settings.source(Some("world"));
        assert_eq!(name, "world");
        assert_eq!(src.kind, SourceKind::Json);
    }

    #[test]
    fn test_validate_rejects_zero_batch() {
        let mut settings = Settings::default();
        settings.enrich.batch_size = 0;
        assert!(matches!(settings.validate(), Err(ScrapeError::Config(_))));
    }

    #[test]
    fn test_validate_requires_latest() {
        let settings = Settings::from_yaml(
            "sources:\n  world:\n    url: https://x.test/w\n    kind: json\n",
        )
        .unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let err = Settings::from_yaml("listing_timeout_secs: [").unwrap_err();
        assert!(matches!(err, ScrapeError::Config(_)));
    }
}
