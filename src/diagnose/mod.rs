//! "Why is this page slow" diagnosis engine
//!
//! Each rule looks at the extracted lab metrics, field categories and summed
//! opportunity savings for one strategy and may emit one diagnosis. Fired
//! diagnoses are ranked by `severity weight * 100 + rule boost` and the top
//! [`MAX_DIAGNOSES`] are kept. The engine is deterministic and never fails;
//! missing inputs only suppress rules.

mod rules;
pub mod signals;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::extract::{Extracted, FieldData, Metric, Opportunity};
use signals::Signals;

/// Maximum diagnoses returned per strategy
pub const MAX_DIAGNOSES: usize = 5;

/// Evidence strings and fixes kept per diagnosis
pub const MAX_DETAIL_LINES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// Ranking weight; multiplied by 100 before the rule boost is added
    pub fn weight(&self) -> i64 {
        match self {
            Severity::High => 3,
            Severity::Medium => 2,
            Severity::Low => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

impl Impact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::High => "high",
            Impact::Medium => "medium",
            Impact::Low => "low",
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ranked, evidence-backed explanation of a likely bottleneck
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    pub id: String,
    pub title: String,
    pub severity: Severity,
    pub expected_impact: Impact,
    pub evidence: Vec<String>,
    pub recommended_fixes: Vec<String>,
}

/// Borrowed view of everything the rules may consult
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagnosisInput<'a> {
    pub perf_score: Option<f64>,
    pub metrics: &'a [Metric],
    pub opportunities: &'a [Opportunity],
    pub field: Option<&'a FieldData>,
}

impl<'a> From<&'a Extracted> for DiagnosisInput<'a> {
    fn from(extracted: &'a Extracted) -> Self {
        Self {
            perf_score: extracted.perf_score,
            metrics: &extracted.metrics,
            opportunities: &extracted.opportunities,
            field: extracted.field.as_ref(),
        }
    }
}

/// Run every rule and return at most [`MAX_DIAGNOSES`], best first.
pub fn diagnose(input: &DiagnosisInput<'_>) -> Vec<Diagnosis> {
    let signals = Signals::collect(input);
    let mut drafts = Drafts::default();

    rules::origin_latency(&signals, &mut drafts);
    rules::lcp_render_blocking(&signals, &mut drafts);
    rules::js_main_thread(&signals, &mut drafts);
    rules::image_payload(&signals, &mut drafts);
    rules::cache_policy(&signals, &mut drafts);
    rules::layout_instability(&signals, &mut drafts);
    rules::third_party_overhead(&signals, &mut drafts);

    if drafts.is_empty() {
        rules::mixed_bottlenecks(&signals, &mut drafts);
    }

    drafts.into_ranked(MAX_DIAGNOSES)
}

/// A fired rule awaiting ranking
#[derive(Debug)]
struct Draft {
    score: i64,
    diagnosis: Diagnosis,
}

/// Candidate diagnoses in rule evaluation order
#[derive(Debug, Default)]
pub(crate) struct Drafts(Vec<Draft>);

/// Fields of a candidate diagnosis, before the evidence/fix guard runs
pub(crate) struct Candidate<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub severity: Severity,
    pub impact: Impact,
    pub evidence: Vec<Option<String>>,
    pub fixes: &'a [&'a str],
    pub boost: i64,
}

impl Drafts {
    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keep the candidate only if it has at least one evidence line and fix.
    pub(crate) fn push(&mut self, candidate: Candidate<'_>) {
        let evidence: Vec<String> = candidate
            .evidence
            .into_iter()
            .flatten()
            .filter(|line| !line.trim().is_empty())
            .take(MAX_DETAIL_LINES)
            .collect();
        let fixes: Vec<String> = candidate
            .fixes
            .iter()
            .filter(|line| !line.trim().is_empty())
            .take(MAX_DETAIL_LINES)
            .map(|line| line.to_string())
            .collect();

        if evidence.is_empty() || fixes.is_empty() {
            return;
        }

        self.0.push(Draft {
            score: candidate.severity.weight() * 100 + candidate.boost,
            diagnosis: Diagnosis {
                id: candidate.id.to_string(),
                title: candidate.title.to_string(),
                severity: candidate.severity,
                expected_impact: candidate.impact,
                evidence,
                recommended_fixes: fixes,
            },
        });
    }

    fn into_ranked(mut self, limit: usize) -> Vec<Diagnosis> {
        // Stable: equal scores keep rule evaluation order
        self.0.sort_by(|a, b| b.score.cmp(&a.score));
        self.0
            .into_iter()
            .take(limit)
            .map(|draft| draft.diagnosis)
            .collect()
    }
}
