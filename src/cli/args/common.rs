//! Common CLI types shared across commands

use std::fmt;

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty format - colored, human-oriented report (default)
    #[default]
    Pretty,
    /// Table format - rounded tables, one row per metric/diagnosis
    Table,
    /// JSON format - the full report wrapped with metadata
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Pretty => "pretty",
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
        };
        f.write_str(name)
    }
}

/// Options shared by `audit` and `batch`
#[derive(Debug, Clone, clap::Args)]
pub struct StrategyArgs {
    /// Strategy to audit: mobile, desktop or both
    #[arg(long, short = 's', default_value = "mobile")]
    pub strategy: String,

    /// Locale for audit titles and descriptions (e.g. de, pt-BR)
    #[arg(long)]
    pub locale: Option<String>,
}
