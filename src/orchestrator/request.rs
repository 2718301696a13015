//! Inbound request parsing and validation

use std::fmt;
use std::str::FromStr;

use reqwest::Url;

use crate::client::Strategy;
use crate::error::ValidationError;

/// Longest hostname accepted, per DNS limits
pub const MAX_HOSTNAME_LEN: usize = 253;

/// Which strategies a request asks for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StrategySelection {
    #[default]
    Mobile,
    Desktop,
    Both,
}

impl StrategySelection {
    /// Requested strategies in response order
    pub fn strategies(&self) -> &'static [Strategy] {
        match self {
            StrategySelection::Mobile => &[Strategy::Mobile],
            StrategySelection::Desktop => &[Strategy::Desktop],
            StrategySelection::Both => &Strategy::ALL,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategySelection::Mobile => "mobile",
            StrategySelection::Desktop => "desktop",
            StrategySelection::Both => "both",
        }
    }
}

impl fmt::Display for StrategySelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategySelection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "mobile" => Ok(StrategySelection::Mobile),
            "desktop" => Ok(StrategySelection::Desktop),
            "both" => Ok(StrategySelection::Both),
            _ => Err(ValidationError::InvalidStrategy(s.to_string())),
        }
    }
}

/// An unvalidated audit request, as received
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageloadQuery {
    pub url: Option<String>,
    pub strategy: Option<String>,
    pub locale: Option<String>,
    /// Include the raw provider payload (bypasses the cache)
    pub raw: bool,
    /// Include upstream failure detail text
    pub detail: bool,
}

impl PageloadQuery {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<PageloadRequest, ValidationError> {
        let raw_url = self
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(ValidationError::MissingUrl)?;
        let url = validate_target(raw_url)?;

        let selection = match self.strategy.as_deref() {
            Some(s) => s.parse()?,
            None => StrategySelection::default(),
        };

        let locale = self
            .locale
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string);

        Ok(PageloadRequest {
            url,
            selection,
            locale,
            raw: self.raw,
            detail: self.detail,
        })
    }
}

/// A validated audit request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageloadRequest {
    /// Normalized target URL
    pub url: String,
    pub selection: StrategySelection,
    pub locale: Option<String>,
    pub raw: bool,
    pub detail: bool,
}

/// Check that `input` is an absolute http(s) URL with a sane hostname and
/// return its normalized form.
pub fn validate_target(input: &str) -> Result<String, ValidationError> {
    let url = Url::parse(input).map_err(|_| ValidationError::InvalidUrl)?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError::UnsupportedScheme);
    }

    match url.host_str() {
        Some(host) if !host.is_empty() && host.len() <= MAX_HOSTNAME_LEN => {}
        _ => return Err(ValidationError::InvalidHostname),
    }

    Ok(url.to_string())
}
