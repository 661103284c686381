pub mod gemini;
pub mod model;
pub mod news;
pub mod sse;

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

use crate::app::error::AiError;
use crate::app::NewsflowError;
use crate::domain::{Category, SearchFilters};

pub use gemini::HttpSummaryGateway;
pub use model::NewsResponse;
pub use news::HttpNewsGateway;

/// Raw failure as observed at the wire, before classification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    Decode(String),

    /// Error payload reported by the summarization service
    #[error("API error ({code:?}): {message}")]
    Api { code: Option<i64>, message: String },

    #[error("Content was filtered due to safety settings")]
    ContentFiltered,

    #[error("URL retrieval failed: {0}")]
    UrlRetrieval(String),

    #[error("{}", .0.as_deref().unwrap_or("Unknown error"))]
    Unknown(Option<String>),
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Text fragments of a summary as they are generated.
pub type FragmentStream = BoxStream<'static, GatewayResult<String>>;

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            GatewayError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            GatewayError::Status {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            }
        } else {
            GatewayError::Transport(e.to_string())
        }
    }
}

impl From<GatewayError> for NewsflowError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Status { status, message } => match status {
                401 => NewsflowError::unauthorized(),
                429 => NewsflowError::rate_limit_exceeded(),
                400 => NewsflowError::bad_request(format!("Bad request: {}", message)),
                500..=599 => NewsflowError::server_error(format!("Server error: {}", message)),
                _ => NewsflowError::network_failure(format!(
                    "Network error: HTTP {}: {}",
                    status, message
                )),
            },
            GatewayError::Transport(message) | GatewayError::Decode(message) => {
                NewsflowError::network_failure(format!("Network error: {}", message))
            }
            GatewayError::Api { code, message } => match code {
                Some(401) | Some(403) => NewsflowError::invalid_api_key(message),
                Some(429) => NewsflowError::quota_exceeded(message),
                _ => NewsflowError::generation_failed(message),
            },
            GatewayError::ContentFiltered => {
                AiError::ContentFiltered("Content was filtered due to safety settings".into())
                    .into()
            }
            GatewayError::UrlRetrieval(message) => NewsflowError::url_access_failed(message),
            GatewayError::Unknown(message) => NewsflowError::unknown(message.as_deref()),
        }
    }
}

/// Request/response client for headlines and full-text search.
#[async_trait]
pub trait NewsGateway: Send + Sync {
    async fn fetch_top_headlines(&self, category: Category) -> GatewayResult<NewsResponse>;

    async fn search(&self, query: &str, filters: &SearchFilters) -> GatewayResult<NewsResponse>;
}

/// Streaming summarization client.
///
/// The returned stream ends after the last fragment on success, or after a
/// single `Err` item on failure.
pub trait SummaryGateway: Send + Sync {
    fn summarize(&self, url: &str) -> FragmentStream;
}
