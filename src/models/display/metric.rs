//! Lab metric display model

use serde::Serialize;
use tabled::Tabled;

use super::common::{format_score, or_missing};
use crate::client::Strategy;
use crate::extract::Metric;

/// One lab metric row for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct MetricDisplay {
    #[tabled(rename = "STRATEGY")]
    pub strategy: String,

    #[tabled(rename = "METRIC")]
    pub metric: String,

    #[tabled(rename = "VALUE")]
    pub value: String,

    /// Audit score, 0-100
    #[tabled(rename = "SCORE")]
    pub score: String,
}

impl MetricDisplay {
    pub fn new(strategy: Strategy, metric: &Metric) -> Self {
        let name = if metric.title.is_empty() {
            metric.id.clone()
        } else {
            metric.title.clone()
        };

        Self {
            strategy: strategy.to_string(),
            metric: name,
            value: or_missing(&metric.display_value),
            score: format_score(metric.score),
        }
    }
}
