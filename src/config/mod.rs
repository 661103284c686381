//! Configuration management for Newsflow.
//!
//! Configuration is read from `~/.config/newsflow/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.
//! API keys can be supplied through the environment instead of the file.

pub mod api;
pub mod screens;

pub use api::{NewsApiConfig, SummaryApiConfig};
pub use screens::ScreenConfig;

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const NEWS_API_KEY_ENV: &str = "NEWSFLOW_NEWS_API_KEY";
pub const GEMINI_API_KEY_ENV: &str = "NEWSFLOW_GEMINI_API_KEY";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub news: NewsApiConfig,
    pub summary: SummaryApiConfig,
    pub screens: ScreenConfig,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default().with_env_overrides());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config.with_env_overrides())
    }

    /// Get the default config file path: `~/.config/newsflow/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("newsflow").join("config.toml"))
    }

    fn with_env_overrides(self) -> Self {
        self.with_keys(
            std::env::var(NEWS_API_KEY_ENV).ok(),
            std::env::var(GEMINI_API_KEY_ENV).ok(),
        )
    }

    fn with_keys(mut self, news_key: Option<String>, gemini_key: Option<String>) -> Self {
        if let Some(key) = news_key.filter(|k| !k.trim().is_empty()) {
            self.news.api_key = key;
        }
        if let Some(key) = gemini_key.filter(|k| !k.trim().is_empty()) {
            self.summary.api_key = key;
        }
        self
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# Newsflow Configuration
#
# API keys may be left empty here and supplied through the
# NEWSFLOW_NEWS_API_KEY and NEWSFLOW_GEMINI_API_KEY environment variables.

[news]
api_key = ""
base_url = "https://newsapi.org/v2"
# Country used for top headlines
country = "us"
# Request timeout in seconds
timeout_secs = 10

[summary]
api_key = ""
base_url = "https://generativelanguage.googleapis.com/v1beta"
model = "gemini-2.5-flash"

[screens]
# Quiet period before a typed search query is sent (milliseconds)
debounce_ms = 1000
# Shortest time a loading indicator stays visible (milliseconds)
min_loading_ms = 500
# How long screen state keeps updating with nobody watching (milliseconds)
stop_timeout_ms = 5000
# Pending one-shot effects kept per screen
effect_capacity = 64
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
