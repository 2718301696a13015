//! Batch audit command

use std::io::Read;

use colored::Colorize;
use serde::Serialize;

use crate::cli::{BatchArgs, CommandContext, GlobalOptions, OutputFormat};
use crate::error::{Error, Result};
use crate::models::BatchDisplay;
use crate::orchestrator::{PageloadQuery, PageloadResponse, ResponseBody};
use crate::output::json::format_json;
use crate::output::table::format_table_or;
use crate::output::{self, Formattable};

/// Run every URL in the input through one orchestrator.
pub async fn run(opts: &GlobalOptions, args: &BatchArgs) -> Result<()> {
    let ctx = CommandContext::new(opts)?;

    let contents = read_input(&args.file)?;
    let queries: Vec<PageloadQuery> = parse_targets(&contents)
        .into_iter()
        .map(|url| PageloadQuery {
            url: Some(url.to_string()),
            strategy: Some(args.strategy.strategy.clone()),
            locale: args.strategy.locale.clone(),
            ..PageloadQuery::default()
        })
        .collect();

    let responses = ctx
        .orchestrator
        .handle_batch(&queries, &ctx.headers, args.concurrency)
        .await;

    let report = BatchReport::new(&queries, responses);
    output::print(&report, ctx.format)?;

    let failed = report.failed();
    if failed > 0 {
        return Err(Error::Request {
            status: report.worst_status(),
            message: format!("{} of {} URLs failed", failed, report.entries.len()),
        });
    }
    Ok(())
}

fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    Ok(std::fs::read_to_string(file)?)
}

/// One target per line; blank lines and `#` comments are skipped.
pub fn parse_targets(contents: &str) -> Vec<&str> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect()
}

/// Outcome for one input line
#[derive(Debug, Serialize)]
pub struct BatchEntry {
    pub url: String,
    pub status: u16,
    pub body: ResponseBody,
}

/// All outcomes of a batch, in input order
#[derive(Debug)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    pub fn new(queries: &[PageloadQuery], responses: Vec<PageloadResponse>) -> Self {
        let entries = queries
            .iter()
            .zip(responses)
            .map(|(query, response)| BatchEntry {
                url: query.url.clone().unwrap_or_default(),
                status: response.status,
                body: response.body,
            })
            .collect();
        Self { entries }
    }

    pub fn failed(&self) -> usize {
        self.entries.iter().filter(|e| e.status != 200).count()
    }

    /// Highest non-200 status, used as the command's exit status
    fn worst_status(&self) -> u16 {
        self.entries
            .iter()
            .map(|e| e.status)
            .filter(|&s| s != 200)
            .max()
            .unwrap_or(200)
    }

    fn rows(&self) -> Vec<BatchDisplay> {
        self.entries
            .iter()
            .map(|e| {
                let response = PageloadResponse {
                    status: e.status,
                    retry_after_secs: None,
                    body: e.body.clone(),
                };
                BatchDisplay::new(&e.url, &response)
            })
            .collect()
    }

    fn summary_line(&self) -> String {
        let total = self.entries.len();
        let failed = self.failed();
        format!("{} URLs audited, {} ok, {} failed", total, total - failed, failed)
    }
}

impl Formattable for BatchReport {
    fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(format_json(&self.entries)?),
            OutputFormat::Table => Ok(format!(
                "{}\n{}",
                format_table_or(&self.rows(), "No URLs to audit."),
                self.summary_line()
            )),
            OutputFormat::Pretty => {
                let summary = if self.failed() == 0 {
                    format!("{} {}", "✓".green(), self.summary_line())
                } else {
                    format!("{} {}", "✗".red(), self.summary_line())
                };
                Ok(format!(
                    "{}\n\n{}",
                    format_table_or(&self.rows(), "No URLs to audit."),
                    summary
                ))
            }
        }
    }
}
