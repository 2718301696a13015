//! Inputs the diagnosis rules read, resolved once per summary

use super::{DiagnosisInput, Impact, Severity};
use crate::extract::{FieldData, Metric, Opportunity};

/// Field metric ids per signal, in lookup order
pub const FIELD_TTFB_IDS: [&str; 2] = ["EXPERIMENTAL_TIME_TO_FIRST_BYTE", "TIME_TO_FIRST_BYTE"];
pub const FIELD_LCP_IDS: [&str; 1] = ["LARGEST_CONTENTFUL_PAINT_MS"];
pub const FIELD_INP_IDS: [&str; 1] = ["INTERACTION_TO_NEXT_PAINT"];
pub const FIELD_CLS_IDS: [&str; 1] = ["CUMULATIVE_LAYOUT_SHIFT_SCORE"];

/// Opportunity audits summed per bottleneck
pub const RENDER_BLOCKING_AUDITS: [&str; 1] = ["render-blocking-resources"];
pub const JS_AUDITS: [&str; 4] = [
    "unused-javascript",
    "legacy-javascript",
    "bootup-time",
    "mainthread-work-breakdown",
];
pub const IMAGE_AUDITS: [&str; 4] = [
    "modern-image-formats",
    "uses-responsive-images",
    "offscreen-images",
    "efficiently-encode-images",
];
pub const CACHE_AUDITS: [&str; 1] = ["uses-long-cache-ttl"];
pub const THIRD_PARTY_AUDITS: [&str; 1] = ["third-party-summary"];

/// Lab metrics, field categories and opportunity sums for one strategy
#[derive(Debug, Clone, Copy)]
pub struct Signals<'a> {
    pub perf_score: Option<f64>,

    pub ttfb: Option<&'a Metric>,
    pub lcp: Option<&'a Metric>,
    pub inp: Option<&'a Metric>,
    pub cls: Option<&'a Metric>,
    pub tbt: Option<&'a Metric>,

    pub field_ttfb: Option<&'a str>,
    pub field_lcp: Option<&'a str>,
    pub field_inp: Option<&'a str>,
    pub field_cls: Option<&'a str>,

    pub render_blocking_ms: f64,
    pub js_ms: f64,
    pub image_ms: f64,
    pub cache_ms: f64,
    pub third_party_ms: f64,
}

impl<'a> Signals<'a> {
    pub fn collect(input: &DiagnosisInput<'a>) -> Self {
        let metric = |id: &str| input.metrics.iter().find(|m| m.id == id);
        let savings = |ids: &[&str]| savings_for(input.opportunities, ids);

        Self {
            perf_score: input.perf_score,

            ttfb: metric("server-response-time"),
            lcp: metric("largest-contentful-paint"),
            inp: metric("interaction-to-next-paint"),
            cls: metric("cumulative-layout-shift"),
            tbt: metric("total-blocking-time"),

            field_ttfb: field_category(input.field, &FIELD_TTFB_IDS),
            field_lcp: field_category(input.field, &FIELD_LCP_IDS),
            field_inp: field_category(input.field, &FIELD_INP_IDS),
            field_cls: field_category(input.field, &FIELD_CLS_IDS),

            render_blocking_ms: savings(&RENDER_BLOCKING_AUDITS),
            js_ms: savings(&JS_AUDITS),
            image_ms: savings(&IMAGE_AUDITS),
            cache_ms: savings(&CACHE_AUDITS),
            third_party_ms: savings(&THIRD_PARTY_AUDITS),
        }
    }
}

/// Numeric value of a lab metric, zero when absent
pub fn value_of(metric: Option<&Metric>) -> f64 {
    metric.and_then(|m| m.numeric_value).unwrap_or(0.0)
}

/// Non-empty display value of a lab metric
pub fn display_of(metric: Option<&Metric>) -> Option<&str> {
    metric
        .map(|m| m.display_value.as_str())
        .filter(|d| !d.trim().is_empty())
}

/// Category of the first listed field metric that has one
pub fn field_category<'a>(field: Option<&'a FieldData>, ids: &[&str]) -> Option<&'a str> {
    let field = field?;
    ids.iter().find_map(|id| {
        field
            .metrics
            .iter()
            .find(|m| m.id == *id)
            .and_then(|m| m.category.as_deref())
            .filter(|c| !c.is_empty())
    })
}

/// Rounded sum of non-negative savings for the listed opportunity audits
pub fn savings_for(opportunities: &[Opportunity], ids: &[&str]) -> f64 {
    let total: f64 = ids
        .iter()
        .filter_map(|id| opportunities.iter().find(|o| o.id == *id))
        .filter_map(|o| o.savings_ms)
        .map(|ms| ms.max(0.0))
        .sum();
    total.round()
}

fn normalize(category: Option<&str>) -> Option<String> {
    let c = category?.trim().to_lowercase();
    (!c.is_empty()).then_some(c)
}

pub fn is_poor(category: Option<&str>) -> bool {
    matches!(normalize(category).as_deref(), Some("poor" | "slow"))
}

pub fn is_needs_improvement(category: Option<&str>) -> bool {
    matches!(
        normalize(category).as_deref(),
        Some("needs improvement" | "needs-improvement" | "ni" | "average")
    )
}

/// Tiered severity: `high` at or above `high`, `medium` at or above `medium`
pub fn severity_from_ms(ms: f64, medium: f64, high: f64) -> Severity {
    if ms >= high {
        Severity::High
    } else if ms >= medium {
        Severity::Medium
    } else {
        Severity::Low
    }
}

pub fn impact_from_ms(ms: f64) -> Impact {
    if ms >= 1200.0 {
        Impact::High
    } else if ms >= 350.0 {
        Impact::Medium
    } else {
        Impact::Low
    }
}

/// `min(cap, round(value))`, the per-rule ranking boost
pub fn capped(value: f64, cap: i64) -> i64 {
    (value.round() as i64).min(cap)
}
