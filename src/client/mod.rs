//! PageSpeed Insights API client

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[cfg(test)]
pub mod fixtures;
#[cfg(test)]
pub mod mock;
pub mod pagespeed;
pub mod safe_fetch;

#[cfg(test)]
pub use mock::MockPageSpeedClient;
pub use pagespeed::PageSpeedClient;
pub use safe_fetch::{FetchOptions, safe_json_fetch};

/// Raw provider payload, kept untyped so missing or oddly-typed fields
/// degrade to omission instead of failing deserialization.
pub type RawPayload = Value;

/// Device strategy used by the provider for a single audit run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Mobile,
    Desktop,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::Mobile, Strategy::Desktop];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Mobile => "mobile",
            Strategy::Desktop => "desktop",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mobile" => Ok(Strategy::Mobile),
            "desktop" => Ok(Strategy::Desktop),
            other => Err(other.to_string()),
        }
    }
}

/// Outcome of one upstream call.
///
/// Exactly one of success or failure; never retried by this crate.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult<T> {
    Ok(FetchSuccess<T>),
    Err(FetchFailure),
}

/// Successful upstream response
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSuccess<T> {
    pub value: T,
    pub status: u16,
    pub fetched_at: DateTime<Utc>,
}

/// Failed upstream call (transport, timeout, non-2xx or unparsable body)
#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure {
    /// Human-readable error, e.g. `HTTP 429: Quota exceeded`
    pub error: String,
    /// HTTP status when a response was received
    pub status: Option<u16>,
    /// Trimmed body snippet (at most 2000 chars)
    pub detail: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl<T> FetchResult<T> {
    pub fn ok(value: T, status: u16) -> Self {
        FetchResult::Ok(FetchSuccess {
            value,
            status,
            fetched_at: Utc::now(),
        })
    }

    pub fn err(error: impl Into<String>, status: Option<u16>, detail: Option<String>) -> Self {
        FetchResult::Err(FetchFailure {
            error: error.into(),
            status,
            detail,
            fetched_at: Utc::now(),
        })
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, FetchResult::Ok(_))
    }

    /// HTTP status, if the upstream answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchResult::Ok(ok) => Some(ok.status),
            FetchResult::Err(err) => err.status,
        }
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        match self {
            FetchResult::Ok(ok) => ok.fetched_at,
            FetchResult::Err(err) => err.fetched_at,
        }
    }
}

/// PageSpeed Insights API client trait
#[async_trait]
pub trait PageSpeedApi: Send + Sync {
    /// Run one audit for `target` with the given strategy.
    ///
    /// Failures are normalized into [`FetchResult::Err`]; this never panics
    /// and never returns a transport error directly.
    async fn run_pagespeed(
        &self,
        target: &str,
        strategy: Strategy,
        locale: Option<&str>,
    ) -> FetchResult<RawPayload>;

    /// Whether a provider API key is configured
    fn api_key_configured(&self) -> bool;
}
