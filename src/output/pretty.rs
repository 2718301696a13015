//! Human-oriented report rendering

use colored::Colorize;

use crate::client::Strategy;
use crate::diagnose::{Diagnosis, Severity};
use crate::extract::FieldData;
use crate::models::display::common::{format_ms, format_score, or_missing};
use crate::orchestrator::{PageloadReport, StrategyError, StrategyResult, StrategySummary};

/// Opportunities listed per strategy in the pretty view
const PRETTY_OPPORTUNITIES: usize = 5;

/// Render a full report as colored text.
pub fn render_report(report: &PageloadReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("{} {}\n", "URL:".bold(), report.url));
    let key_status = if report.api_key_configured {
        format!("{} API key configured", "✓".green())
    } else {
        format!("{} No API key (shared quota)", "○".dimmed())
    };
    out.push_str(&format!("Source: {} | {}\n", report.source, key_status));

    if let Some(ref error) = report.error {
        out.push_str(&format!("\n{} {}\n", "✗".red(), error.red()));
    }
    if let Some(ref hint) = report.hint {
        out.push_str(&format!("  → {}\n", hint));
    }

    for strategy in Strategy::ALL {
        let result = match strategy {
            Strategy::Mobile => report.mobile.as_ref(),
            Strategy::Desktop => report.desktop.as_ref(),
        };
        match result {
            Some(StrategyResult::Summary(summary)) => render_summary(&mut out, strategy, summary),
            Some(StrategyResult::Error(error)) => render_error(&mut out, strategy, error),
            None => {}
        }
    }

    if !report.notes.is_empty() {
        out.push_str(&format!("\n{}\n", "Notes:".dimmed()));
        for note in &report.notes {
            out.push_str(&format!("  {}\n", format!("- {}", note).dimmed()));
        }
    }

    out.trim_end().to_string()
}

fn heading(out: &mut String, strategy: Strategy, suffix: &str) {
    out.push_str(&format!(
        "\n{} {}\n",
        format!("── {} ", strategy.as_str().to_uppercase()).bold(),
        suffix.dimmed()
    ));
}

fn render_summary(out: &mut String, strategy: Strategy, summary: &StrategySummary) {
    let cached = if summary.from_cache { ", cached" } else { "" };
    heading(
        out,
        strategy,
        &format!(
            "(HTTP {}, fetched {}{})",
            summary.status,
            summary.fetched_at.format("%Y-%m-%d %H:%M:%S UTC"),
            cached
        ),
    );

    out.push_str(&format!("Performance: {}\n", colorize_score(summary.perf_score)));

    if !summary.metrics.is_empty() {
        out.push_str(&format!("\n{}\n", "Lab metrics:".bold()));
        for metric in &summary.metrics {
            let name = if metric.title.is_empty() { &metric.id } else { &metric.title };
            out.push_str(&format!("  {:<28} {}\n", name, or_missing(&metric.display_value)));
        }
    }

    if let Some(ref field) = summary.field {
        render_field(out, field);
    }

    out.push_str(&format!("\n{}\n", "Why slow:".bold()));
    if summary.reasons.is_empty() {
        out.push_str(&format!("  {} No significant bottleneck detected\n", "✓".green()));
    }
    for (i, diagnosis) in summary.reasons.iter().enumerate() {
        render_diagnosis(out, i + 1, diagnosis);
    }

    if !summary.opportunities.is_empty() {
        out.push_str(&format!("\n{}\n", "Top opportunities:".bold()));
        for opp in summary.opportunities.iter().take(PRETTY_OPPORTUNITIES) {
            out.push_str(&format!("  - {} ({})\n", opp.title, format_ms(opp.savings_ms)));
        }
    }
}

fn render_field(out: &mut String, field: &FieldData) {
    let overall = field.overall_category.as_deref().unwrap_or("--");
    out.push_str(&format!("\n{} {}\n", "Field data:".bold(), overall));
    for metric in &field.metrics {
        let percentile = metric
            .percentile
            .map(|p| p.to_string())
            .unwrap_or_else(|| "--".to_string());
        out.push_str(&format!(
            "  {:<36} p75 {:<8} {}\n",
            metric.id,
            percentile,
            metric.category.as_deref().unwrap_or("")
        ));
    }
}

fn render_diagnosis(out: &mut String, rank: usize, diagnosis: &Diagnosis) {
    out.push_str(&format!(
        "  {}. {} {} {}\n",
        rank,
        colorize_severity(diagnosis.severity),
        diagnosis.title.bold(),
        format!("(impact: {})", diagnosis.expected_impact).dimmed()
    ));
    for line in &diagnosis.evidence {
        out.push_str(&format!("     - {}\n", line));
    }
    for fix in &diagnosis.recommended_fixes {
        out.push_str(&format!("     → {}\n", fix.cyan()));
    }
}

fn render_error(out: &mut String, strategy: Strategy, error: &StrategyError) {
    let status = error
        .status
        .map(|s| format!("HTTP {}", s))
        .unwrap_or_else(|| "no response".to_string());
    let cached = if error.from_cache { ", cached" } else { "" };
    heading(out, strategy, &format!("({}{})", status, cached));

    out.push_str(&format!("{} {}\n", "✗".red(), error.error));
    if let Some(ref hint) = error.hint {
        out.push_str(&format!("  → {}\n", hint));
    }
    if let Some(ref detail) = error.detail {
        out.push_str(&format!("  {}\n", detail.dimmed()));
    }
}

fn colorize_severity(severity: Severity) -> String {
    let label = format!("[{}]", severity.as_str().to_uppercase());
    match severity {
        Severity::High => label.red().bold().to_string(),
        Severity::Medium => label.yellow().to_string(),
        Severity::Low => label.dimmed().to_string(),
    }
}

fn colorize_score(score: Option<f64>) -> String {
    let text = format_score(score);
    match score {
        Some(s) if s >= 0.9 => text.green().to_string(),
        Some(s) if s >= 0.5 => text.yellow().to_string(),
        Some(_) => text.red().to_string(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fixtures::slow_origin_payload;
    use crate::client::{FetchResult, RawPayload};
    use crate::orchestrator::response::{TRUST, notes};

    fn report_with(mobile: StrategyResult) -> PageloadReport {
        PageloadReport {
            url: "https://example.com/".to_string(),
            source: "pagespeed-insights".to_string(),
            api_key_configured: false,
            error: None,
            hint: None,
            notes: notes(false),
            mobile: Some(mobile),
            desktop: None,
            trust: TRUST.to_string(),
        }
    }

    #[test]
    fn test_render_summary() {
        colored::control::set_override(false);
        let success = match FetchResult::ok(slow_origin_payload(), 200) {
            FetchResult::Ok(s) => s,
            FetchResult::Err(_) => unreachable!(),
        };
        let summary = StrategySummary::from_success(success, true, false);

        let text = render_report(&report_with(StrategyResult::Summary(summary)));

        assert!(text.contains("URL: https://example.com/"));
        assert!(text.contains("── MOBILE"));
        assert!(text.contains("cached"));
        assert!(text.contains("Performance: 40"));
        assert!(text.contains("1. [HIGH] Slow server response (TTFB)"));
        assert!(!text.contains("DESKTOP"));
        assert!(text.contains("Notes:"));
    }

    #[test]
    fn test_render_lines_are_newline_separated() {
        colored::control::set_override(false);
        let success = match FetchResult::ok(slow_origin_payload(), 200) {
            FetchResult::Ok(s) => s,
            FetchResult::Err(_) => unreachable!(),
        };
        let summary = StrategySummary::from_success(success, false, false);

        let text = render_report(&report_with(StrategyResult::Summary(summary)));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "URL: https://example.com/");
        assert!(lines[1].starts_with("Source: pagespeed-insights | "));
        assert!(lines.contains(&"Why slow:"));
        assert!(
            lines
                .iter()
                .any(|l| l.starts_with("  1. [HIGH] Slow server response (TTFB) (impact: "))
        );
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn test_render_error_with_hint() {
        colored::control::set_override(false);
        let failure = match FetchResult::<RawPayload>::err("HTTP 429", Some(429), None) {
            FetchResult::Err(f) => f,
            FetchResult::Ok(_) => unreachable!(),
        };
        let error = StrategyError::from_failure(failure, false, false, false);

        let text = render_report(&report_with(StrategyResult::Error(error)));

        assert!(text.contains("(HTTP 429)"));
        assert!(text.contains("✗ HTTP 429"));
        assert!(text.contains("PAGESPEED_API_KEY"));
    }
}
