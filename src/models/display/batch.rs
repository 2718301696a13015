//! Batch result display model

use serde::Serialize;
use tabled::Tabled;

use super::common::{MISSING, format_score, truncate_string};
use crate::orchestrator::{PageloadResponse, StrategyResult};

const URL_WIDTH: usize = 48;

/// One row per audited URL in `batch` output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct BatchDisplay {
    #[tabled(rename = "URL")]
    pub url: String,

    #[tabled(rename = "STATUS")]
    pub status: u16,

    #[tabled(rename = "MOBILE")]
    pub mobile: String,

    #[tabled(rename = "DESKTOP")]
    pub desktop: String,

    /// Highest-ranked diagnosis across strategies, or the error
    #[tabled(rename = "TOP ISSUE")]
    pub top_issue: String,
}

impl BatchDisplay {
    pub fn new(url: &str, response: &PageloadResponse) -> Self {
        let (mobile, desktop, top_issue) = match response.report() {
            Some(report) => {
                let top = report
                    .results()
                    .find_map(|r| match r {
                        StrategyResult::Summary(s) => s.reasons.first().map(|d| d.title.clone()),
                        StrategyResult::Error(_) => None,
                    })
                    .or_else(|| report.error.clone())
                    .unwrap_or_default();
                (
                    strategy_score(report.mobile.as_ref()),
                    strategy_score(report.desktop.as_ref()),
                    top,
                )
            }
            None => (
                MISSING.to_string(),
                MISSING.to_string(),
                response.error_message().unwrap_or_default().to_string(),
            ),
        };

        Self {
            url: truncate_string(url, URL_WIDTH),
            status: response.status,
            mobile,
            desktop,
            top_issue,
        }
    }
}

/// Performance score, `error` for a failed strategy, placeholder if not requested
fn strategy_score(result: Option<&StrategyResult>) -> String {
    match result {
        Some(StrategyResult::Summary(s)) => format_score(s.perf_score),
        Some(StrategyResult::Error(_)) => "error".to_string(),
        None => MISSING.to_string(),
    }
}
