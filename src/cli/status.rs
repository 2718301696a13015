//! Status command implementation

use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::cli::context::resolve_config;
use crate::client::pagespeed::API_BASE_URL;
use crate::config::Config;
use crate::error::{ConfigError, Error, Result};

/// Run the status command to display the resolved configuration
pub fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}\n", "pagewhy Configuration Status".bold());

    let config_path = match opts.config_ref() {
        Some(path) => path.to_string(),
        None => Config::default_path()?.display().to_string(),
    };

    match resolve_config(opts) {
        Ok(config) => {
            println!("Config file: {}", config_path.cyan());
            println!();
            print!("{}", describe(&config));
            println!();
        }
        Err(Error::Config(ConfigError::NotFound(path))) => {
            println!("{} Configuration not found: {}", "✗".red(), path);
            println!();
        }
        Err(e) => return Err(e),
    }

    Ok(())
}

fn describe(config: &Config) -> String {
    let mut out = String::new();

    if config.api_key().is_some() {
        out.push_str(&format!("{} API key configured\n", "✓".green()));
    } else {
        out.push_str(&format!(
            "{} API key not configured (shared anonymous quota)\n",
            "○".dimmed()
        ));
        out.push_str("  → Set PAGESPEED_API_KEY or api_key in the config file\n");
    }

    if config.api_base == API_BASE_URL {
        out.push_str(&format!("{} API base: {}\n", "✓".green(), config.api_base));
    } else {
        out.push_str(&format!(
            "{} Custom API base: {}\n",
            "○".dimmed(),
            config.api_base.cyan()
        ));
    }
    out.push_str(&format!(
        "{} Upstream timeout: {}s\n",
        "✓".green(),
        config.upstream.timeout_secs
    ));

    if config.cache.enabled {
        out.push_str(&format!(
            "{} Cache: {} entries, {}s success / {}s failure TTL\n",
            "✓".green(),
            config.cache.max_entries,
            config.cache.success_ttl_secs,
            config.cache.failure_ttl_secs
        ));
    } else {
        out.push_str(&format!("{} Cache disabled\n", "○".dimmed()));
    }

    out.push_str(&format!(
        "{} Rate limit: {} requests per {}s per client\n",
        "✓".green(),
        config.rate_limit.max_requests,
        config.rate_limit.window_secs
    ));

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_defaults() {
        colored::control::set_override(false);
        let text = describe(&Config::default());

        assert!(text.contains("○ API key not configured"));
        assert!(text.contains("✓ API base: https://www.googleapis.com"));
        assert!(text.contains("Cache: 25 entries, 300s success / 30s failure TTL"));
        assert!(text.contains("Rate limit: 10 requests per 60s per client"));
    }

    #[test]
    fn test_describe_custom() {
        colored::control::set_override(false);
        let mut config = Config {
            api_key: Some("secret-key".to_string()),
            api_base: "http://localhost:8080".to_string(),
            ..Config::default()
        };
        config.cache.enabled = false;

        let text = describe(&config);

        assert!(text.contains("✓ API key configured"));
        assert!(!text.contains("secret-key"));
        assert!(text.contains("Custom API base: http://localhost:8080"));
        assert!(text.contains("Cache disabled"));
    }
}
