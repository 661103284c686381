use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Headline/search API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsApiConfig {
    /// API key sent in the `X-Api-Key` header
    pub api_key: String,

    /// Base URL of the API (default: https://newsapi.org/v2)
    pub base_url: String,

    /// Country used for top headlines (default: us)
    pub country: String,

    /// Request timeout in seconds (default: 10)
    pub timeout_secs: u64,

    /// User agent string to use
    pub user_agent: String,
}

impl Default for NewsApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://newsapi.org/v2".to_string(),
            country: "us".to_string(),
            timeout_secs: 10,
            user_agent: concat!("newsflow/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl NewsApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Summarization API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryApiConfig {
    /// API key passed as the `key` query parameter
    pub api_key: String,

    /// Base URL of the generative API
    pub base_url: String,

    /// Model used for summaries (default: gemini-2.5-flash)
    pub model: String,
}

impl Default for SummaryApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
        }
    }
}
