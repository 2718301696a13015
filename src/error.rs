//! Error types for pagewhy

use std::time::Duration;
use thiserror::Error;

/// Result type alias for pagewhy operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A request completed but did not produce a successful report.
    #[error("Request failed with HTTP {status}: {message}")]
    Request { status: u16, message: String },
}

/// Upstream (PageSpeed Insights) errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Timeout, with the configured limit when the caller knows it
    #[error(
        "Request timed out{}",
        .0.map(|d| format!(" after {:?}", d)).unwrap_or_default()
    )]
    Timeout(Option<Duration>),

    #[error("Failed to connect to PageSpeed Insights")]
    Connect,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(None)
        } else if err.is_connect() {
            ApiError::Connect
        } else if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Inbound request validation errors.
///
/// These never reach the cache, the rate limiter or the upstream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing query parameter url")]
    MissingUrl,

    #[error("Invalid URL")]
    InvalidUrl,

    #[error("URL must start with http:// or https://")]
    UnsupportedScheme,

    #[error("Invalid hostname")]
    InvalidHostname,

    #[error("strategy must be one of mobile, desktop, both (got '{0}')")]
    InvalidStrategy(String),
}
