//! Diagnosis display model

use serde::Serialize;
use tabled::Tabled;

use crate::client::Strategy;
use crate::diagnose::Diagnosis;

/// One ranked diagnosis row for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct DiagnosisDisplay {
    #[tabled(rename = "STRATEGY")]
    pub strategy: String,

    /// 1-based rank within the strategy
    #[tabled(rename = "#")]
    pub rank: usize,

    #[tabled(rename = "SEVERITY")]
    pub severity: String,

    #[tabled(rename = "IMPACT")]
    pub impact: String,

    #[tabled(rename = "DIAGNOSIS")]
    pub title: String,

    /// Leading evidence line
    #[tabled(rename = "EVIDENCE")]
    pub evidence: String,
}

impl DiagnosisDisplay {
    pub fn new(strategy: Strategy, rank: usize, diagnosis: &Diagnosis) -> Self {
        Self {
            strategy: strategy.to_string(),
            rank,
            severity: diagnosis.severity.to_string(),
            impact: diagnosis.expected_impact.to_string(),
            title: diagnosis.title.clone(),
            evidence: diagnosis.evidence.first().cloned().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnose::{Impact, Severity};

    #[test]
    fn test_diagnosis_display() {
        let diagnosis = Diagnosis {
            id: "origin-latency".to_string(),
            title: "Slow server response (TTFB)".to_string(),
            severity: Severity::High,
            expected_impact: Impact::High,
            evidence: vec![
                "Lab server response time: 2,000 ms.".to_string(),
                "Field TTFB category: SLOW.".to_string(),
            ],
            recommended_fixes: vec!["Cache HTML at the edge.".to_string()],
        };

        let display = DiagnosisDisplay::new(Strategy::Mobile, 1, &diagnosis);

        assert_eq!(display.rank, 1);
        assert_eq!(display.severity, "high");
        assert_eq!(display.impact, "high");
        assert_eq!(display.evidence, "Lab server response time: 2,000 ms.");
    }
}
