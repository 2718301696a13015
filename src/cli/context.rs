//! Command execution context
//!
//! Loads configuration, applies CLI overrides, and builds the client and
//! orchestrator shared by the audit commands.

use std::sync::Arc;

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue};

use crate::cli::{GlobalOptions, OutputFormat};
use crate::client::PageSpeedClient;
use crate::config::Config;
use crate::error::{ConfigError, Result};
use crate::orchestrator::Orchestrator;

/// Context for command execution.
pub struct CommandContext {
    /// Orchestrator owning the cache and rate limiter for this process
    pub orchestrator: Arc<Orchestrator<PageSpeedClient>>,
    /// Output format preference
    pub format: OutputFormat,
    /// Caller identity as seen by the rate limiter
    pub headers: HeaderMap,
}

impl CommandContext {
    /// Create a new command context.
    ///
    /// # Errors
    /// Returns an error if the config cannot be loaded or is invalid, or if
    /// `--client-ip` is not a valid header value.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let config = resolve_config(opts)?;

        let client = PageSpeedClient::with_base_url(
            config.api_key().map(str::to_string),
            &config.api_base,
            config.upstream_timeout(),
        )?;
        let orchestrator = Arc::new(Orchestrator::new(
            Arc::new(client),
            config.orchestrator_options(),
        ));

        let headers = client_headers(opts.client_ip.as_deref())?;

        Ok(Self {
            orchestrator,
            format: opts.format,
            headers,
        })
    }
}

/// Load the config file and layer CLI/environment overrides on top.
pub fn resolve_config(opts: &GlobalOptions) -> Result<Config> {
    let mut config = Config::load_at(opts.config_ref())?;

    if let Some(key) = opts.api_key_ref() {
        config.api_key = Some(key.to_string());
    }
    if let Some(base) = opts.api_base_ref() {
        config.api_base = base.to_string();
    }
    if opts.no_cache {
        config.cache.enabled = false;
    }

    config.validate()?;
    debug!(
        "Resolved config: api_base={}, api_key_configured={}, cache_enabled={}",
        config.api_base,
        config.api_key().is_some(),
        config.cache.enabled
    );
    Ok(config)
}

fn client_headers(client_ip: Option<&str>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    if let Some(ip) = client_ip.map(str::trim).filter(|ip| !ip.is_empty()) {
        let value = HeaderValue::from_str(ip)
            .map_err(|_| ConfigError::Invalid(format!("invalid client address '{}'", ip)))?;
        headers.insert("x-forwarded-for", value);
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn opts(config: &NamedTempFile) -> GlobalOptions {
        GlobalOptions {
            format: OutputFormat::Pretty,
            config: Some(config.path().display().to_string()),
            no_cache: false,
            api_key: None,
            api_base: None,
            client_ip: None,
        }
    }

    fn config_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = config_file("api_key: from-file\napi_base: http://file.example\n");
        let opts = GlobalOptions {
            api_key: Some("from-flag".to_string()),
            no_cache: true,
            ..opts(&file)
        };

        let config = resolve_config(&opts).unwrap();

        assert_eq!(config.api_key(), Some("from-flag"));
        assert_eq!(config.api_base, "http://file.example");
        assert!(!config.cache.enabled);
    }

    #[test]
    fn test_invalid_file_values_rejected() {
        let file = config_file("rate_limit:\n  max_requests: 0\n");
        assert!(resolve_config(&opts(&file)).is_err());
    }

    #[test]
    fn test_client_ip_header() {
        let headers = client_headers(Some(" 203.0.113.7 ")).unwrap();
        assert_eq!(headers.get("x-forwarded-for").unwrap(), "203.0.113.7");

        assert!(client_headers(None).unwrap().is_empty());
        assert!(client_headers(Some("bad\nvalue")).is_err());
    }

    #[test]
    fn test_context_applies_config_to_orchestrator() {
        let file = config_file("api_key: from-file\napi_base: http://127.0.0.1:9\n");
        let ctx = CommandContext::new(&GlobalOptions {
            client_ip: Some("198.51.100.4".to_string()),
            ..opts(&file)
        })
        .unwrap();

        assert!(crate::client::PageSpeedApi::api_key_configured(
            ctx.orchestrator.client()
        ));
        assert_eq!(ctx.headers.get("x-forwarded-for").unwrap(), "198.51.100.4");
    }

    #[test]
    fn test_context_builds_orchestrator() {
        let file = config_file("api_base: http://127.0.0.1:9\n");
        let ctx = CommandContext::new(&opts(&file)).unwrap();

        assert_eq!(ctx.format, OutputFormat::Pretty);
        assert_eq!(ctx.orchestrator.cached_entries(), 0);
        assert!(!crate::client::PageSpeedApi::api_key_configured(
            ctx.orchestrator.client()
        ));
    }
}
