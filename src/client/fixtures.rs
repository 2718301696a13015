//! PageSpeed payload fixtures for tests

use serde_json::{Map, Value, json};

/// Builder for `runPagespeed` response bodies.
#[derive(Debug, Default)]
pub struct PayloadBuilder {
    perf_score: Option<f64>,
    audits: Map<String, Value>,
    overall_category: Option<String>,
    field_metrics: Map<String, Value>,
}

pub fn payload() -> PayloadBuilder {
    PayloadBuilder::default()
}

impl PayloadBuilder {
    pub fn perf_score(mut self, score: f64) -> Self {
        self.perf_score = Some(score);
        self
    }

    /// Lab metric audit with a numeric value and display string
    pub fn metric(mut self, id: &str, numeric: f64, display: &str) -> Self {
        self.audits.insert(
            id.to_string(),
            json!({
                "title": id.replace('-', " "),
                "displayValue": display,
                "numericValue": numeric,
                "score": 0.5,
            }),
        );
        self
    }

    /// Opportunity audit with an explicit `overallSavingsMs`
    pub fn opportunity(mut self, id: &str, savings_ms: f64) -> Self {
        self.audits.insert(
            id.to_string(),
            json!({
                "title": format!("Opportunity {}", id),
                "description": "Fix it",
                "displayValue": format!("Potential savings of {} ms", savings_ms),
                "details": { "type": "opportunity", "overallSavingsMs": savings_ms },
            }),
        );
        self
    }

    /// Arbitrary audit body
    pub fn audit(mut self, id: &str, body: Value) -> Self {
        self.audits.insert(id.to_string(), body);
        self
    }

    pub fn overall_category(mut self, category: &str) -> Self {
        self.overall_category = Some(category.to_string());
        self
    }

    pub fn field_metric(mut self, id: &str, percentile: Option<f64>, category: Option<&str>) -> Self {
        let mut entry = Map::new();
        if let Some(p) = percentile {
            entry.insert("percentile".to_string(), json!(p));
        }
        if let Some(c) = category {
            entry.insert("category".to_string(), json!(c));
        }
        self.field_metrics.insert(id.to_string(), Value::Object(entry));
        self
    }

    pub fn build(self) -> Value {
        let mut lhr = Map::new();
        if let Some(score) = self.perf_score {
            lhr.insert(
                "categories".to_string(),
                json!({ "performance": { "score": score } }),
            );
        }
        lhr.insert("audits".to_string(), Value::Object(self.audits));

        let mut root = Map::new();
        root.insert("id".to_string(), json!("https://example.com/"));
        root.insert("lighthouseResult".to_string(), Value::Object(lhr));

        if self.overall_category.is_some() || !self.field_metrics.is_empty() {
            let mut le = Map::new();
            if let Some(c) = self.overall_category {
                le.insert("overall_category".to_string(), json!(c));
            }
            le.insert("metrics".to_string(), Value::Object(self.field_metrics));
            root.insert("loadingExperience".to_string(), Value::Object(le));
        }

        Value::Object(root)
    }
}

/// Every lab metric within budget, no opportunities
pub fn healthy_payload() -> Value {
    payload()
        .perf_score(0.95)
        .metric("server-response-time", 100.0, "Root document took 100 ms")
        .metric("largest-contentful-paint", 800.0, "0.8 s")
        .metric("total-blocking-time", 20.0, "20 ms")
        .metric("cumulative-layout-shift", 0.01, "0.01")
        .build()
}

/// Slow origin dominates everything else
pub fn slow_origin_payload() -> Value {
    payload()
        .perf_score(0.4)
        .metric("server-response-time", 2000.0, "Root document took 2,000 ms")
        .build()
}
