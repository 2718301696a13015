//! Response shapes produced by the orchestrator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{FetchFailure, FetchSuccess, RawPayload};
use crate::diagnose::{Diagnosis, DiagnosisInput, diagnose};
use crate::extract::{FieldData, Metric, Opportunity, extract};

/// Value of the `source` field on every report
pub const SOURCE: &str = "pagespeed-insights";

/// Value of the `trust` field on every report
pub const TRUST: &str = "untrusted";

pub const NOTE_LAB_VS_FIELD: &str = "Lab metrics come from a single simulated load; field data \
     reflects real users over the previous 28 days, so the two can disagree.";
pub const NOTE_NO_WATERFALL: &str = "No real-browser request waterfall or CPU timeline is \
     captured; diagnoses are heuristics over PageSpeed Insights audits.";
pub const NOTE_NO_API_KEY: &str = "No PageSpeed API key is configured; requests share the \
     anonymous quota and may be throttled.";

pub const QUOTA_HINT: &str = "PageSpeed Insights quota looks exhausted. Set PAGESPEED_API_KEY \
     to use your own quota.";

/// Diagnosed summary for one strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategySummary {
    pub fetched_at: DateTime<Utc>,
    pub status: u16,
    pub from_cache: bool,
    pub perf_score: Option<f64>,
    pub metrics: Vec<Metric>,
    pub opportunities: Vec<Opportunity>,
    pub field: Option<FieldData>,
    pub reasons: Vec<Diagnosis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
}

impl StrategySummary {
    /// Extract and diagnose a successful fetch.
    pub fn from_success(success: FetchSuccess<RawPayload>, from_cache: bool, include_raw: bool) -> Self {
        let extracted = extract(&success.value);
        let reasons = diagnose(&DiagnosisInput::from(&extracted));

        Self {
            fetched_at: success.fetched_at,
            status: success.status,
            from_cache,
            perf_score: extracted.perf_score,
            metrics: extracted.metrics,
            opportunities: extracted.opportunities,
            field: extracted.field,
            reasons,
            raw: include_raw.then_some(success.value),
        }
    }
}

/// Failed fetch for one strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyError {
    pub error: String,
    pub fetched_at: DateTime<Utc>,
    pub status: Option<u16>,
    pub from_cache: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl StrategyError {
    pub fn from_failure(
        failure: FetchFailure,
        from_cache: bool,
        include_detail: bool,
        api_key_configured: bool,
    ) -> Self {
        let hint = (!api_key_configured && looks_like_quota(&failure))
            .then(|| QUOTA_HINT.to_string());

        Self {
            error: failure.error,
            fetched_at: failure.fetched_at,
            status: failure.status,
            from_cache,
            detail: failure.detail.filter(|_| include_detail),
            hint,
        }
    }
}

/// A 429, or a message that talks about quota or rate limits
pub fn looks_like_quota(failure: &FetchFailure) -> bool {
    if failure.status == Some(429) {
        return true;
    }
    let message = failure.error.to_lowercase();
    message.contains("quota") || message.contains("rate limit")
}

/// Per-strategy outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StrategyResult {
    Summary(StrategySummary),
    Error(StrategyError),
}

impl StrategyResult {
    pub fn is_summary(&self) -> bool {
        matches!(self, StrategyResult::Summary(_))
    }

    pub fn as_error(&self) -> Option<&StrategyError> {
        match self {
            StrategyResult::Error(e) => Some(e),
            StrategyResult::Summary(_) => None,
        }
    }
}

/// Full report for one target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageloadReport {
    pub url: String,
    pub source: String,
    pub api_key_configured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub notes: Vec<String>,
    pub mobile: Option<StrategyResult>,
    pub desktop: Option<StrategyResult>,
    pub trust: String,
}

impl PageloadReport {
    /// Requested results in response order
    pub fn results(&self) -> impl Iterator<Item = &StrategyResult> {
        self.mobile.iter().chain(self.desktop.iter())
    }

    /// HTTP status derived from the per-strategy outcomes.
    ///
    /// 200 if any strategy produced a summary, else 429 if any failure
    /// carried a 429, else 502.
    pub fn derive_status(&self) -> u16 {
        if self.results().any(StrategyResult::is_summary) {
            return 200;
        }
        let throttled = self
            .results()
            .filter_map(StrategyResult::as_error)
            .any(|e| e.status == Some(429));
        if throttled { 429 } else { 502 }
    }
}

pub fn notes(api_key_configured: bool) -> Vec<String> {
    let mut notes = vec![NOTE_LAB_VS_FIELD.to_string(), NOTE_NO_WATERFALL.to_string()];
    if !api_key_configured {
        notes.push(NOTE_NO_API_KEY.to_string());
    }
    notes
}

/// Body returned to the caller, shaped by outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Report(Box<PageloadReport>),
    RateLimited {
        error: String,
        #[serde(rename = "retryAfterSec")]
        retry_after_sec: u64,
    },
    Invalid {
        error: String,
    },
}

/// Orchestrator output: HTTP-style status plus body
#[derive(Debug, Clone, PartialEq)]
pub struct PageloadResponse {
    pub status: u16,
    /// Seconds for a `Retry-After` header, set on limiter denials
    pub retry_after_secs: Option<u64>,
    pub body: ResponseBody,
}

impl PageloadResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    pub fn report(&self) -> Option<&PageloadReport> {
        match &self.body {
            ResponseBody::Report(report) => Some(&**report),
            _ => None,
        }
    }

    /// Top-level error message, if the body carries one
    pub fn error_message(&self) -> Option<&str> {
        match &self.body {
            ResponseBody::Report(report) => report.error.as_deref(),
            ResponseBody::RateLimited { error, .. } | ResponseBody::Invalid { error } => {
                Some(error.as_str())
            }
        }
    }
}
