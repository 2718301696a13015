//! PageSpeed Insights API client implementation

use std::time::Duration;

use async_trait::async_trait;
use log::warn;
use reqwest::{Client as HttpClient, Url};

use super::{FetchOptions, FetchResult, PageSpeedApi, RawPayload, Strategy, safe_json_fetch};
use crate::error::{ApiError, ConfigError, Result};

/// PageSpeed Insights API base URL
pub const API_BASE_URL: &str = "https://www.googleapis.com";

/// Path of the v5 audit endpoint, relative to the base URL
const RUN_PAGESPEED_PATH: &str = "/pagespeedonline/v5/runPagespeed";

/// Audits are slow; give the provider more room than the generic default
pub const PAGESPEED_TIMEOUT: Duration = Duration::from_secs(12);

/// Lighthouse categories requested for every audit
const CATEGORIES: [&str; 3] = ["performance", "best-practices", "seo"];

/// PageSpeed Insights API client
pub struct PageSpeedClient {
    http: HttpClient,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl PageSpeedClient {
    /// Create a new client against the public API
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_base_url(api_key, API_BASE_URL, PAGESPEED_TIMEOUT)
    }

    /// Create a client against a custom host (mock servers, proxies)
    pub fn with_base_url(
        api_key: Option<String>,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self> {
        Url::parse(base_url)
            .map_err(|e| ConfigError::Invalid(format!("invalid API base URL '{}': {}", base_url, e)))?;

        let http = HttpClient::builder()
            .user_agent(concat!("pagewhy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            timeout,
        })
    }

    /// Build the audit URL for one (target, strategy, locale) triple
    pub fn audit_url(
        &self,
        target: &str,
        strategy: Strategy,
        locale: Option<&str>,
    ) -> Result<Url> {
        let mut params: Vec<(&str, &str)> = vec![("url", target), ("strategy", strategy.as_str())];
        params.extend(CATEGORIES.iter().map(|c| ("category", *c)));
        if let Some(locale) = locale {
            params.push(("locale", locale));
        }
        if let Some(ref key) = self.api_key {
            params.push(("key", key.as_str()));
        }

        let endpoint = format!("{}{}", self.base_url, RUN_PAGESPEED_PATH);
        Url::parse_with_params(&endpoint, &params).map_err(|e| {
            ConfigError::Invalid(format!("invalid API base URL '{}': {}", self.base_url, e)).into()
        })
    }
}

#[async_trait]
impl PageSpeedApi for PageSpeedClient {
    async fn run_pagespeed(
        &self,
        target: &str,
        strategy: Strategy,
        locale: Option<&str>,
    ) -> FetchResult<RawPayload> {
        let url = match self.audit_url(target, strategy, locale) {
            Ok(url) => url,
            Err(e) => {
                warn!("Could not build PageSpeed URL from base {}: {}", self.base_url, e);
                return FetchResult::err(e.to_string(), None, None);
            }
        };

        let result = safe_json_fetch(&self.http, url, &FetchOptions::with_timeout(self.timeout)).await;
        if let FetchResult::Err(ref failure) = result {
            warn!("PageSpeed {} audit of {} failed: {}", strategy, target, failure.error);
        }
        result
    }

    fn api_key_configured(&self) -> bool {
        self.api_key.is_some()
    }
}
