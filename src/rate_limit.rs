//! Per-client request rate limiting
//!
//! A fixed window per client key: the first request opens a window of
//! `window` length, requests inside it are counted, and once `max_requests`
//! have been admitted the rest are denied until the window resets. Only
//! requests that will actually reach the upstream are checked.
//!
//! Expired windows are not tracked by a timer. When the map grows past
//! `prune_threshold` keys, windows that have already elapsed are dropped on
//! the next check.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

use log::debug;
use reqwest::header::HeaderMap;

/// Default window length
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Default number of upstream-triggering requests per window
pub const DEFAULT_MAX_REQUESTS: u32 = 10;

/// Default tracked-key count above which elapsed windows are pruned
pub const DEFAULT_PRUNE_THRESHOLD: usize = 1000;

/// Bucket shared by every client without a usable address header
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Address headers consulted for client identity, highest priority first
pub const CLIENT_ADDRESS_HEADERS: [&str; 4] = [
    "x-forwarded-for",
    "x-real-ip",
    "cf-connecting-ip",
    "true-client-ip",
];

/// Limiter settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_requests: u32,
    pub prune_threshold: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            max_requests: DEFAULT_MAX_REQUESTS,
            prune_threshold: DEFAULT_PRUNE_THRESHOLD,
        }
    }
}

/// Result of a limiter check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Denied { retry_after_secs: u64 },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed)
    }
}

#[derive(Debug, Clone, Copy)]
struct RateWindow {
    reset_at: Instant,
    count: u32,
}

/// Per-client window counters
#[derive(Debug)]
pub struct RateLimiter {
    windows: HashMap<String, RateWindow>,
    config: RateLimitConfig,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: HashMap::new(),
            config,
        }
    }

    /// Count one request for `client_key` and decide whether it may proceed.
    pub fn check(&mut self, client_key: &str) -> RateDecision {
        self.check_at(client_key, Instant::now())
    }

    /// Number of client keys currently tracked
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    pub(crate) fn check_at(&mut self, client_key: &str, now: Instant) -> RateDecision {
        if self.windows.len() > self.config.prune_threshold {
            let before = self.windows.len();
            self.windows.retain(|_, w| now < w.reset_at);
            debug!(
                "Pruned {} elapsed rate windows",
                before - self.windows.len()
            );
        }

        match self.windows.get_mut(client_key) {
            Some(window) if now < window.reset_at => {
                if window.count >= self.config.max_requests {
                    let remaining = window.reset_at - now;
                    let retry_after_secs = remaining.as_millis().div_ceil(1000).max(1) as u64;
                    debug!(
                        "Rate limit hit for {} ({} requests, retry in {}s)",
                        client_key, window.count, retry_after_secs
                    );
                    return RateDecision::Denied { retry_after_secs };
                }
                window.count += 1;
                RateDecision::Allowed
            }
            _ => {
                self.windows.insert(
                    client_key.to_string(),
                    RateWindow {
                        reset_at: now + self.config.window,
                        count: 1,
                    },
                );
                RateDecision::Allowed
            }
        }
    }
}

/// Derive the limiter key from forwarded-address headers.
///
/// The first header in [`CLIENT_ADDRESS_HEADERS`] holding a syntactically
/// valid IP address wins. Clients without one share [`UNKNOWN_CLIENT`].
pub fn client_key(headers: &HeaderMap) -> String {
    CLIENT_ADDRESS_HEADERS
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .find_map(parse_client_address)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Parse the first entry of a (possibly comma-separated) address header.
fn parse_client_address(value: &str) -> Option<IpAddr> {
    let first = value.split(',').next()?.trim();
    if first.is_empty() {
        return None;
    }
    first
        .parse::<IpAddr>()
        .ok()
        .or_else(|| first.parse::<SocketAddr>().ok().map(|addr| addr.ip()))
}
