//! Formatting for audit reports and orchestrator responses

use crate::cli::OutputFormat;
use crate::client::Strategy;
use crate::error::Result;
use crate::models::{DiagnosisDisplay, MetricDisplay, OpportunityDisplay};
use crate::orchestrator::{PageloadReport, PageloadResponse, ResponseBody, StrategyResult};

use super::Formattable;
use super::json::{format_json, format_json_with_status};
use super::pretty::render_report;
use super::table::format_table_or;

impl PageloadReport {
    fn summaries(&self) -> impl Iterator<Item = (Strategy, &crate::orchestrator::StrategySummary)> {
        [(Strategy::Mobile, &self.mobile), (Strategy::Desktop, &self.desktop)]
            .into_iter()
            .filter_map(|(strategy, result)| match result {
                Some(StrategyResult::Summary(s)) => Some((strategy, s)),
                _ => None,
            })
    }

    fn render_tables(&self) -> String {
        let metrics: Vec<MetricDisplay> = self
            .summaries()
            .flat_map(|(strategy, s)| s.metrics.iter().map(move |m| MetricDisplay::new(strategy, m)))
            .collect();
        let reasons: Vec<DiagnosisDisplay> = self
            .summaries()
            .flat_map(|(strategy, s)| {
                s.reasons
                    .iter()
                    .enumerate()
                    .map(move |(i, d)| DiagnosisDisplay::new(strategy, i + 1, d))
            })
            .collect();
        let opportunities: Vec<OpportunityDisplay> = self
            .summaries()
            .flat_map(|(strategy, s)| {
                s.opportunities
                    .iter()
                    .map(move |o| OpportunityDisplay::new(strategy, o))
            })
            .collect();

        let mut sections = vec![
            format_table_or(&reasons, "No diagnoses."),
            format_table_or(&metrics, "No lab metrics."),
        ];
        if !opportunities.is_empty() {
            sections.push(format_table_or(&opportunities, ""));
        }
        for result in self.results() {
            if let StrategyResult::Error(e) = result {
                sections.push(format!("Error: {}", e.error));
            }
        }
        sections.join("\n")
    }
}

impl Formattable for PageloadReport {
    fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Pretty => Ok(render_report(self)),
            OutputFormat::Table => Ok(self.render_tables()),
            OutputFormat::Json => Ok(format_json(self)?),
        }
    }
}

impl Formattable for PageloadResponse {
    fn format(&self, format: OutputFormat) -> Result<String> {
        if let OutputFormat::Json = format {
            return Ok(format_json_with_status(&self.body, self.status)?);
        }

        match &self.body {
            ResponseBody::Report(report) => report.format(format),
            ResponseBody::RateLimited {
                error,
                retry_after_sec,
            } => Ok(format!(
                "Error (HTTP {}): {} (Retry-After: {}s)",
                self.status, error, retry_after_sec
            )),
            ResponseBody::Invalid { error } => {
                Ok(format!("Error (HTTP {}): {}", self.status, error))
            }
        }
    }
}
