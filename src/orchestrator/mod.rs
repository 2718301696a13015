//! Request orchestration around the PageSpeed upstream
//!
//! One call to [`Orchestrator::handle`] validates the query, serves what it
//! can from the response cache, charges the client's rate-limit window only
//! when some strategy must go upstream, fetches the missing strategies
//! concurrently and folds everything into a [`PageloadResponse`].

pub mod batch;
pub mod request;
pub mod response;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::join_all;
use log::{debug, warn};
use reqwest::header::HeaderMap;

use crate::cache::{CacheConfig, ResponseCache, cache_key};
use crate::client::{FetchResult, PageSpeedApi, RawPayload, Strategy};
use crate::rate_limit::{RateDecision, RateLimitConfig, RateLimiter, client_key};

pub use batch::DEFAULT_BATCH_CONCURRENCY;
pub use request::{PageloadQuery, PageloadRequest, StrategySelection, validate_target};
pub use response::{
    PageloadReport, PageloadResponse, ResponseBody, StrategyError, StrategyResult,
    StrategySummary,
};

/// Orchestrator settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorOptions {
    pub cache: CacheConfig,
    pub rate_limit: RateLimitConfig,
    /// Process-wide cache switch; off forces every lookup upstream
    pub cache_enabled: bool,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            rate_limit: RateLimitConfig::default(),
            cache_enabled: true,
        }
    }
}

/// Where a strategy's result came from
struct Lookup {
    strategy: Strategy,
    key: String,
    cached: Option<FetchResult<RawPayload>>,
}

/// Owns the cache and limiter state and drives one request end to end.
pub struct Orchestrator<C: PageSpeedApi> {
    client: Arc<C>,
    cache: Mutex<ResponseCache>,
    limiter: Mutex<RateLimiter>,
    cache_enabled: bool,
}

impl<C: PageSpeedApi> Orchestrator<C> {
    pub fn new(client: Arc<C>, options: OrchestratorOptions) -> Self {
        Self {
            client,
            cache: Mutex::new(ResponseCache::new(options.cache)),
            limiter: Mutex::new(RateLimiter::new(options.rate_limit)),
            cache_enabled: options.cache_enabled,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Number of responses currently cached
    pub fn cached_entries(&self) -> usize {
        self.lock_cache().map(|cache| cache.len()).unwrap_or(0)
    }

    /// Handle one audit request from the client identified by `headers`.
    pub async fn handle(&self, query: &PageloadQuery, headers: &HeaderMap) -> PageloadResponse {
        let request = match query.validate() {
            Ok(request) => request,
            Err(e) => {
                debug!("Rejected request: {}", e);
                return PageloadResponse {
                    status: 400,
                    retry_after_secs: None,
                    body: ResponseBody::Invalid {
                        error: e.to_string(),
                    },
                };
            }
        };

        let use_cache = self.cache_enabled && !request.raw;
        let lookups = self.lookup_cached(&request, use_cache);

        if lookups.iter().any(|l| l.cached.is_none()) {
            let client = client_key(headers);
            if let RateDecision::Denied { retry_after_secs } = self.check_rate(&client) {
                return PageloadResponse {
                    status: 429,
                    retry_after_secs: Some(retry_after_secs),
                    body: ResponseBody::RateLimited {
                        error: format!(
                            "Rate limit exceeded. Try again in {}s.",
                            retry_after_secs
                        ),
                        retry_after_sec: retry_after_secs,
                    },
                };
            }
        }

        let target = request.url.as_str();
        let locale = request.locale.as_deref();
        let fetches = lookups.into_iter().map(|lookup| async move {
            match lookup.cached {
                Some(result) => (lookup.strategy, result, true),
                None => {
                    debug!("Fetching {} audit of {}", lookup.strategy, target);
                    let result = self
                        .client
                        .run_pagespeed(target, lookup.strategy, locale)
                        .await;
                    if use_cache {
                        self.store(&lookup.key, result.clone());
                    }
                    (lookup.strategy, result, false)
                }
            }
        });
        let outcomes = join_all(fetches).await;

        let report = self.compose(&request, outcomes);
        PageloadResponse {
            status: report.derive_status(),
            retry_after_secs: None,
            body: ResponseBody::Report(Box::new(report)),
        }
    }

    fn lookup_cached(&self, request: &PageloadRequest, use_cache: bool) -> Vec<Lookup> {
        let mut cache = if use_cache { self.lock_cache() } else { None };

        request
            .selection
            .strategies()
            .iter()
            .map(|&strategy| {
                let key = cache_key(strategy, request.locale.as_deref(), &request.url);
                let cached = cache.as_mut().and_then(|c| c.get(&key));
                debug!(
                    "Cache {} for {}",
                    if cached.is_some() { "hit" } else { "miss" },
                    key
                );
                Lookup {
                    strategy,
                    key,
                    cached,
                }
            })
            .collect()
    }

    fn compose(
        &self,
        request: &PageloadRequest,
        outcomes: Vec<(Strategy, FetchResult<RawPayload>, bool)>,
    ) -> PageloadReport {
        let api_key_configured = self.client.api_key_configured();
        let mut report = PageloadReport {
            url: request.url.clone(),
            source: response::SOURCE.to_string(),
            api_key_configured,
            error: None,
            hint: None,
            notes: response::notes(api_key_configured),
            mobile: None,
            desktop: None,
            trust: response::TRUST.to_string(),
        };

        for (strategy, result, from_cache) in outcomes {
            let entry = match result {
                FetchResult::Ok(success) => StrategyResult::Summary(StrategySummary::from_success(
                    success,
                    from_cache,
                    request.raw,
                )),
                FetchResult::Err(failure) => StrategyResult::Error(StrategyError::from_failure(
                    failure,
                    from_cache,
                    request.detail,
                    api_key_configured,
                )),
            };
            match strategy {
                Strategy::Mobile => report.mobile = Some(entry),
                Strategy::Desktop => report.desktop = Some(entry),
            }
        }

        if !report.results().any(StrategyResult::is_summary) {
            let first_failure = report
                .results()
                .find_map(StrategyResult::as_error)
                .map(|e| (e.error.clone(), e.hint.clone()));
            if let Some((error, hint)) = first_failure {
                report.error = Some(error);
                report.hint = hint;
            }
        }

        report
    }

    fn check_rate(&self, client: &str) -> RateDecision {
        let mut limiter = self.limiter.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter lock poisoned; continuing with existing state");
            PoisonError::into_inner(poisoned)
        });
        let decision = limiter.check(client);
        debug!("Rate limit decision for {}: {:?}", client, decision);
        decision
    }

    fn store(&self, key: &str, result: FetchResult<RawPayload>) {
        if let Some(mut cache) = self.lock_cache() {
            cache.set(key, result);
        }
    }

    /// A poisoned cache is treated as empty rather than failing the request.
    fn lock_cache(&self) -> Option<MutexGuard<'_, ResponseCache>> {
        match self.cache.lock() {
            Ok(guard) => Some(guard),
            Err(_) => {
                warn!("Response cache lock poisoned; bypassing cache");
                None
            }
        }
    }
}
