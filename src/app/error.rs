use thiserror::Error;

use crate::config::ConfigError;

/// Failures of the headline/search API and of the transport underneath it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    RateLimitExceeded(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    ServerError(String),

    #[error("{0}")]
    NetworkFailure(String),
}

/// Failures raised inside the client, without any remote involvement.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InternalError {
    #[error("{0}")]
    ArticleNotFound(String),

    #[error("{0}")]
    InvalidParameter(String),
}

/// Summarization failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AiError {
    #[error("{0}")]
    InvalidApiKey(String),

    #[error("{0}")]
    QuotaExceeded(String),

    #[error("{0}")]
    ContentFiltered(String),

    #[error("{0}")]
    GenerationFailed(String),

    #[error("{0}")]
    UrlAccessFailed(String),
}

/// The closed set of failures every layer above the gateways deals in.
///
/// Values are carried in screen state and effects, so the type is `Clone`
/// and comparable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NewsflowError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Internal(#[from] InternalError),

    #[error(transparent)]
    Ai(#[from] AiError),
}

pub type Result<T> = std::result::Result<T, NewsflowError>;

/// Failures while assembling the application, before any screen runs.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl NewsflowError {
    pub fn unauthorized() -> Self {
        NetworkError::Unauthorized("Invalid API key".into()).into()
    }

    pub fn rate_limit_exceeded() -> Self {
        NetworkError::RateLimitExceeded("Rate limit exceeded".into()).into()
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        NetworkError::BadRequest(message.into()).into()
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        NetworkError::ServerError(message.into()).into()
    }

    pub fn network_failure(message: impl Into<String>) -> Self {
        NetworkError::NetworkFailure(message.into()).into()
    }

    pub fn article_not_found(id: &str) -> Self {
        InternalError::ArticleNotFound(format!("Article with id {} not found", id)).into()
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        InternalError::InvalidParameter(message.into()).into()
    }

    pub fn invalid_api_key(message: impl Into<String>) -> Self {
        AiError::InvalidApiKey(message.into()).into()
    }

    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        AiError::QuotaExceeded(message.into()).into()
    }

    pub fn content_filtered() -> Self {
        AiError::ContentFiltered("Content was filtered".into()).into()
    }

    pub fn generation_failed(message: impl Into<String>) -> Self {
        AiError::GenerationFailed(message.into()).into()
    }

    pub fn url_access_failed(message: impl Into<String>) -> Self {
        AiError::UrlAccessFailed(message.into()).into()
    }

    /// Fallback for failures nothing else recognizes, so the UI always has
    /// something to render.
    pub fn unknown(message: Option<&str>) -> Self {
        Self::network_failure(message.unwrap_or("Unknown error"))
    }

    /// Human-readable message carried by the failure.
    pub fn message(&self) -> &str {
        match self {
            NewsflowError::Network(
                NetworkError::Unauthorized(m)
                | NetworkError::RateLimitExceeded(m)
                | NetworkError::BadRequest(m)
                | NetworkError::ServerError(m)
                | NetworkError::NetworkFailure(m),
            ) => m,
            NewsflowError::Internal(
                InternalError::ArticleNotFound(m) | InternalError::InvalidParameter(m),
            ) => m,
            NewsflowError::Ai(
                AiError::InvalidApiKey(m)
                | AiError::QuotaExceeded(m)
                | AiError::ContentFiltered(m)
                | AiError::GenerationFailed(m)
                | AiError::UrlAccessFailed(m),
            ) => m,
        }
    }
}
