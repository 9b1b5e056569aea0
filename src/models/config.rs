//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where the published JSON lives and how it is fetched
    #[serde(default)]
    pub source: SourceConfig,

    /// Interactive listing behavior
    #[serde(default)]
    pub listing: ListingConfig,

    /// Materials index generation
    #[serde(default)]
    pub publish: PublishConfig,

    /// Log verbosity
    #[serde(default)]
    pub logging: LoggingConfig,

    /// User-facing message templates
    #[serde(default)]
    pub messages: Messages,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        self.source.page_url()?;
        if self.source.user_agent.trim().is_empty() {
            return Err(AppError::validation("source.user_agent is empty"));
        }
        if self.source.timeout_secs == 0 {
            return Err(AppError::validation("source.timeout_secs must be > 0"));
        }
        if self.source.materials_path.trim().is_empty() {
            return Err(AppError::validation("source.materials_path is empty"));
        }
        if self.source.announcements_path.trim().is_empty() {
            return Err(AppError::validation("source.announcements_path is empty"));
        }
        if self.listing.debounce_ms == 0 {
            return Err(AppError::validation("listing.debounce_ms must be > 0"));
        }
        if self.publish.allowed_extensions.is_empty() {
            return Err(AppError::validation("publish.allowed_extensions is empty"));
        }
        Ok(())
    }
}

/// Data source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// URL of the page the lists belong to; data paths resolve against its directory
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    #[serde(default = "defaults::materials_path")]
    pub materials_path: String,

    #[serde(default = "defaults::announcements_path")]
    pub announcements_path: String,

    /// Fetch timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Append `?v=<millis>` to every data request
    #[serde(default = "defaults::cache_bust")]
    pub cache_bust: bool,
}

impl SourceConfig {
    /// Parse `base_url`.
    pub fn page_url(&self) -> Result<Url> {
        Url::parse(self.base_url.trim())
            .map_err(|e| AppError::config(format!("invalid source.base_url '{}': {e}", self.base_url)))
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            materials_path: defaults::materials_path(),
            announcements_path: defaults::announcements_path(),
            timeout_secs: defaults::timeout(),
            user_agent: defaults::user_agent(),
            cache_bust: defaults::cache_bust(),
        }
    }
}

/// Listing behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Quiet period before a query change re-filters
    #[serde(default = "defaults::debounce")]
    pub debounce_ms: u64,

    /// Number of type chips offered as quick filters
    #[serde(default = "defaults::chip_limit")]
    pub chip_limit: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            debounce_ms: defaults::debounce(),
            chip_limit: defaults::chip_limit(),
        }
    }
}

/// Materials index generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Directory scanned for lecture files, relative to the site root
    #[serde(default = "defaults::lectures_dir")]
    pub lectures_dir: String,

    /// Output file, relative to the site root
    #[serde(default = "defaults::output")]
    pub output: String,

    /// Lowercase extensions (without dot) that are indexed
    #[serde(default = "defaults::allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            lectures_dir: defaults::lectures_dir(),
            output: defaults::output(),
            allowed_extensions: defaults::allowed_extensions(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

/// Message templates.
///
/// Supported placeholders: `{count}` and `{generated}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Messages {
    #[serde(default = "defaults::materials_loading")]
    pub materials_loading: String,
    #[serde(default = "defaults::materials_loaded")]
    pub materials_loaded: String,
    #[serde(default = "defaults::materials_failed")]
    pub materials_failed: String,
    #[serde(default = "defaults::materials_empty")]
    pub materials_empty: String,
    #[serde(default = "defaults::materials_hints")]
    pub materials_hints: Vec<String>,
    #[serde(default = "defaults::announcements_loading")]
    pub announcements_loading: String,
    #[serde(default = "defaults::announcements_loaded")]
    pub announcements_loaded: String,
    #[serde(default = "defaults::announcements_failed")]
    pub announcements_failed: String,
    #[serde(default = "defaults::announcements_empty")]
    pub announcements_empty: String,
    #[serde(default = "defaults::announcements_hints")]
    pub announcements_hints: Vec<String>,
    #[serde(default = "defaults::no_matches")]
    pub no_matches: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            materials_loading: defaults::materials_loading(),
            materials_loaded: defaults::materials_loaded(),
            materials_failed: defaults::materials_failed(),
            materials_empty: defaults::materials_empty(),
            materials_hints: defaults::materials_hints(),
            announcements_loading: defaults::announcements_loading(),
            announcements_loaded: defaults::announcements_loaded(),
            announcements_failed: defaults::announcements_failed(),
            announcements_empty: defaults::announcements_empty(),
            announcements_hints: defaults::announcements_hints(),
            no_matches: defaults::no_matches(),
        }
    }
}

mod defaults {
    // Source defaults
    pub fn base_url() -> String {
        "http://localhost:8000/index.html".into()
    }
    pub fn materials_path() -> String {
        "data/materials.json".into()
    }
    pub fn announcements_path() -> String {
        "data/announcements.json".into()
    }
    pub fn timeout() -> u64 {
        10
    }
    pub fn user_agent() -> String {
        concat!("lecture-board/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn cache_bust() -> bool {
        true
    }

    // Listing defaults
    pub fn debounce() -> u64 {
        160
    }
    pub fn chip_limit() -> usize {
        12
    }

    // Publish defaults
    pub fn lectures_dir() -> String {
        "wyklady".into()
    }
    pub fn output() -> String {
        "data/materials.json".into()
    }
    pub fn allowed_extensions() -> Vec<String> {
        [
            "pdf", "pptx", "ppt", "docx", "doc", "xlsx", "xls", "png", "jpg", "jpeg", "mp4", "zip",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    pub fn log_level() -> String {
        "info".into()
    }

    // Message defaults
    pub fn materials_loading() -> String {
        "Loading materials…".into()
    }
    pub fn materials_loaded() -> String {
        "Materials: {count}{generated}".into()
    }
    pub fn materials_failed() -> String {
        "Could not load materials".into()
    }
    pub fn materials_empty() -> String {
        "No materials yet. Add a file to the lectures directory and push; the index is regenerated on publish.".into()
    }
    pub fn materials_hints() -> Vec<String> {
        vec![
            "If a file was just added, check that the publishing workflow regenerated data/materials.json.".into(),
            "When testing locally, serve the site over HTTP; file:// pages may block fetches.".into(),
        ]
    }
    pub fn announcements_loading() -> String {
        "Loading announcements…".into()
    }
    pub fn announcements_loaded() -> String {
        "Announcements: {count}{generated}".into()
    }
    pub fn announcements_failed() -> String {
        "Could not load announcements".into()
    }
    pub fn announcements_empty() -> String {
        "No announcements. They are published in data/announcements.json.".into()
    }
    pub fn announcements_hints() -> Vec<String> {
        vec!["Check that data/announcements.json exists and contains valid JSON.".into()]
    }
    pub fn no_matches() -> String {
        "No results. Change the filters or the search phrase.".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.source.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_base_url() {
        let mut config = Config::default();
        config.source.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_debounce() {
        let mut config = Config::default();
        config.listing.debounce_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [source]
            base_url = "https://example.edu/course/index.html"
            timeout_secs = 12

            [listing]
            debounce_ms = 200
            "#,
        )
        .unwrap();

        assert_eq!(config.source.timeout_secs, 12);
        assert_eq!(config.source.materials_path, "data/materials.json");
        assert_eq!(config.listing.debounce_ms, 200);
        assert_eq!(config.listing.chip_limit, 12);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }
}
