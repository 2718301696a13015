//! Configuration management for pagewhy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::{CacheConfig, CacheTtl, DEFAULT_MAX_ENTRIES};
use crate::client::pagespeed::{API_BASE_URL, PAGESPEED_TIMEOUT};
use crate::error::{ConfigError, Result};
use crate::orchestrator::OrchestratorOptions;
use crate::rate_limit::{
    DEFAULT_MAX_REQUESTS, DEFAULT_PRUNE_THRESHOLD, DEFAULT_WINDOW, RateLimitConfig,
};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// PageSpeed Insights API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Provider base URL (scheme and host)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default)]
    pub upstream: UpstreamSettings,

    #[serde(default)]
    pub cache: CacheSettings,

    #[serde(default)]
    pub rate_limit: RateLimitSettings,
}

fn default_api_base() -> String {
    API_BASE_URL.to_string()
}

/// Upstream call settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    PAGESPEED_TIMEOUT.as_secs()
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Response cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_success_ttl_secs")]
    pub success_ttl_secs: u64,

    #[serde(default = "default_failure_ttl_secs")]
    pub failure_ttl_secs: u64,

    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_true() -> bool {
    true
}

fn default_success_ttl_secs() -> u64 {
    CacheTtl::SUCCESS.as_secs()
}

fn default_failure_ttl_secs() -> u64 {
    CacheTtl::FAILURE.as_secs()
}

fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            success_ttl_secs: default_success_ttl_secs(),
            failure_ttl_secs: default_failure_ttl_secs(),
            max_entries: default_max_entries(),
        }
    }
}

/// Per-client rate limit settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitSettings {
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    #[serde(default = "default_prune_threshold")]
    pub prune_threshold: usize,
}

fn default_window_secs() -> u64 {
    DEFAULT_WINDOW.as_secs()
}

fn default_max_requests() -> u32 {
    DEFAULT_MAX_REQUESTS
}

fn default_prune_threshold() -> usize {
    DEFAULT_PRUNE_THRESHOLD
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            max_requests: default_max_requests(),
            prune_threshold: default_prune_threshold(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".pagewhy").join("config.yaml"))
    }

    /// Load from an explicit path, or from the default path if `None`.
    ///
    /// A missing default file yields the defaults; a missing explicit file
    /// is an error.
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(Path::new(path)),
            None => {
                let path = Self::default_path()?;
                if !path.exists() {
                    log::debug!("No config at {}, using defaults", path.display());
                    return Ok(Self::default());
                }
                Self::load_from(&path)
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()).into());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Reject settings that would disable a bound instead of configuring it
    pub fn validate(&self) -> Result<()> {
        let zero = |name: &str| -> Result<()> {
            Err(ConfigError::Invalid(format!("{} must be greater than zero", name)).into())
        };

        if self.api_base.trim().is_empty() {
            return Err(ConfigError::Invalid("api_base must not be empty".to_string()).into());
        }
        if self.upstream.timeout_secs == 0 {
            return zero("upstream.timeout_secs");
        }
        if self.cache.success_ttl_secs == 0 {
            return zero("cache.success_ttl_secs");
        }
        if self.cache.failure_ttl_secs == 0 {
            return zero("cache.failure_ttl_secs");
        }
        if self.cache.max_entries == 0 {
            return zero("cache.max_entries");
        }
        if self.rate_limit.window_secs == 0 {
            return zero("rate_limit.window_secs");
        }
        if self.rate_limit.max_requests == 0 {
            return zero("rate_limit.max_requests");
        }
        if self.rate_limit.prune_threshold == 0 {
            return zero("rate_limit.prune_threshold");
        }
        Ok(())
    }

    /// API key with blank values treated as unset
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream.timeout_secs)
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            success_ttl: Duration::from_secs(self.cache.success_ttl_secs),
            failure_ttl: Duration::from_secs(self.cache.failure_ttl_secs),
            max_entries: self.cache.max_entries,
        }
    }

    pub fn rate_limit_config(&self) -> RateLimitConfig {
        RateLimitConfig {
            window: Duration::from_secs(self.rate_limit.window_secs),
            max_requests: self.rate_limit.max_requests,
            prune_threshold: self.rate_limit.prune_threshold,
        }
    }

    pub fn orchestrator_options(&self) -> OrchestratorOptions {
        OrchestratorOptions {
            cache: self.cache_config(),
            rate_limit: self.rate_limit_config(),
            cache_enabled: self.cache.enabled,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_api_base(),
            upstream: UpstreamSettings::default(),
            cache: CacheSettings::default(),
            rate_limit: RateLimitSettings::default(),
        }
    }
}
