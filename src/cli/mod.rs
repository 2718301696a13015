//! CLI command definitions and handlers

use clap::{Args, Parser, Subcommand};

pub mod args;
pub mod audit;
pub mod batch;
pub mod context;
pub mod status;

pub use args::{GlobalOptions, OutputFormat, StrategyArgs};
pub use context::CommandContext;

/// pagewhy - explain why a page loads slowly, from PageSpeed Insights data
#[derive(Parser, Debug)]
#[command(name = "pagewhy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json)
    #[arg(
        long,
        global = true,
        env = "PAGEWHY_FORMAT",
        default_value = "pretty",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "PAGEWHY_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "PAGEWHY_DEBUG", hide_env = true)]
    pub debug: bool,

    /// Bypass the response cache
    #[arg(long, global = true, env = "PAGEWHY_NO_CACHE", hide_env = true)]
    pub no_cache: bool,

    /// PageSpeed Insights API key
    #[arg(long, global = true, env = "PAGESPEED_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// PageSpeed Insights base URL
    #[arg(long, global = true, env = "PAGEWHY_API_BASE", hide_env = true)]
    pub api_base: Option<String>,

    /// Client address used for rate limiting
    #[arg(long, global = true, env = "PAGEWHY_CLIENT_IP", hide_env = true)]
    pub client_ip: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Audit one URL and explain what makes it slow
    Audit(AuditArgs),

    /// Audit every URL listed in a file (one per line, `-` for stdin)
    Batch(BatchArgs),

    /// Show the resolved configuration
    Status,

    /// Show version information
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct AuditArgs {
    /// Page to audit (http:// or https://)
    pub url: String,

    #[command(flatten)]
    pub strategy: StrategyArgs,

    /// Include the provider payload and skip the cache
    #[arg(long)]
    pub raw: bool,

    /// Include upstream error bodies in failures
    #[arg(long)]
    pub detail: bool,
}

#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    /// File with one URL per line; blank lines and `#` comments are skipped
    pub file: String,

    #[command(flatten)]
    pub strategy: StrategyArgs,

    /// Maximum audits in flight
    #[arg(long, short = 'c', default_value_t = crate::orchestrator::DEFAULT_BATCH_CONCURRENCY)]
    pub concurrency: usize,
}
