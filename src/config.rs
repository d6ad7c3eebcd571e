//! YAML configuration: credentials, production flag and source definitions.
//!
//! ```yaml
//! production: false
//! google_maps_api_key: "..."
//! geoparser_keys: ["key-a", "key-b"]
//! sources:
//!   - kind: Reuters
//!     name: Reuters
//!     lang: en
//!     feed_url: "https://feeds.reuters.com/reuters/{category}"
//!     copyright: "© {year} Thomson Reuters. All rights reserved."
//!     categories:
//!       - { key: worldNews, code: world }
//!       - { key: sportsNews, code: sports }
//! ```

use crate::error::{Error, Result};
use crate::scrapers::SourceKind;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument};

/// Article language, also selecting the geocoder response language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "ja")]
    Japanese,
    #[serde(rename = "en")]
    English,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "it")]
    Italian,
    #[serde(rename = "nl")]
    Dutch,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Japanese => "ja",
            Language::English => "en",
            Language::German => "de",
            Language::French => "fr",
            Language::Spanish => "es",
            Language::Italian => "it",
            Language::Dutch => "nl",
        }
    }

    /// Numeric language code used by the console.
    pub fn code(&self) -> u8 {
        match self {
            Language::Japanese => 0,
            Language::English => 1,
            Language::German => 2,
            Language::French => 3,
            Language::Spanish => 4,
            Language::Italian => 5,
            Language::Dutch => 6,
        }
    }
}

/// One feed partition of a source: the feed key used in the URL and the
/// code used in output keys.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    pub key: String,
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub name: String,
    pub lang: Language,
    /// Must contain a `{category}` placeholder.
    pub feed_url: String,
    /// `{year}` is substituted downstream.
    pub copyright: String,
    pub categories: Vec<Category>,
}

impl SourceConfig {
    pub fn feed_url_for(&self, category: &Category) -> String {
        self.feed_url.replace("{category}", &category.key)
    }
}

fn default_user_agent() -> String {
    format!("news_channel/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub production: bool,
    #[serde(default)]
    pub google_maps_api_key: Option<String>,
    #[serde(default)]
    pub geoparser_keys: Vec<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    pub sources: Vec<SourceConfig>,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config =
            serde_yaml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let yaml = tokio::fs::read_to_string(path.as_ref()).await?;
        let config = Self::from_yaml(&yaml)?;
        info!(sources = config.sources.len(), "Loaded configuration");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for source in &self.sources {
            if source.categories.is_empty() {
                return Err(Error::Config(format!("source {} has no categories", source.name)));
            }
            if !source.feed_url.contains("{category}") {
                return Err(Error::Config(format!(
                    "feed_url of {} lacks a {{category}} placeholder",
                    source.name
                )));
            }
        }
        Ok(())
    }
}
