//! Typed view over a raw PageSpeed payload
//!
//! Extraction is total: absent or mistyped fields become `None` or are
//! dropped, never an error.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lab audits surfaced as metrics, in display order
pub const LAB_METRIC_IDS: [&str; 6] = [
    "server-response-time",
    "largest-contentful-paint",
    "interaction-to-next-paint",
    "cumulative-layout-shift",
    "total-blocking-time",
    "speed-index",
];

/// Maximum number of opportunities kept per summary
pub const MAX_OPPORTUNITIES: usize = 12;

/// One lab metric audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub id: String,
    pub title: String,
    pub display_value: String,
    pub numeric_value: Option<f64>,
    pub score: Option<f64>,
}

/// An audit estimating time saved by a specific fix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: String,
    pub title: String,
    pub description: String,
    pub savings_ms: Option<f64>,
    pub display_value: String,
}

/// Real-user percentile data for the target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldData {
    pub overall_category: Option<String>,
    pub metrics: Vec<FieldMetric>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMetric {
    pub id: String,
    pub percentile: Option<f64>,
    pub category: Option<String>,
}

/// Everything the diagnosis engine reads from one payload
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Extracted {
    pub perf_score: Option<f64>,
    pub metrics: Vec<Metric>,
    pub opportunities: Vec<Opportunity>,
    pub field: Option<FieldData>,
}

/// Extract metrics, opportunities, field data and the performance score.
pub fn extract(raw: &Value) -> Extracted {
    let lhr = raw.get("lighthouseResult");
    let audits = lhr.and_then(|l| l.get("audits")).and_then(Value::as_object);

    Extracted {
        perf_score: lhr.and_then(perf_score),
        metrics: audits.map(pick_metrics).unwrap_or_default(),
        opportunities: audits.map(pick_opportunities).unwrap_or_default(),
        field: raw.get("loadingExperience").and_then(pick_field_data),
    }
}

fn perf_score(lhr: &Value) -> Option<f64> {
    lhr.pointer("/categories/performance/score")?.as_f64()
}

fn string_field(audit: &Value, name: &str) -> Option<String> {
    audit.get(name).and_then(Value::as_str).map(str::to_string)
}

fn number_field(audit: &Value, name: &str) -> Option<f64> {
    audit.get(name).and_then(Value::as_f64)
}

fn pick_metrics(audits: &Map<String, Value>) -> Vec<Metric> {
    LAB_METRIC_IDS
        .iter()
        .filter_map(|id| {
            let audit = audits.get(*id).filter(|a| a.is_object())?;
            Some(Metric {
                id: id.to_string(),
                title: string_field(audit, "title").unwrap_or_default(),
                display_value: string_field(audit, "displayValue").unwrap_or_default(),
                numeric_value: number_field(audit, "numericValue"),
                score: number_field(audit, "score"),
            })
        })
        .collect()
}

fn pick_opportunities(audits: &Map<String, Value>) -> Vec<Opportunity> {
    let mut out: Vec<Opportunity> = audits
        .iter()
        .filter_map(|(id, audit)| {
            let details = audit.get("details")?;
            if details.get("type").and_then(Value::as_str) != Some("opportunity") {
                return None;
            }
            let savings_ms = details
                .get("overallSavingsMs")
                .and_then(Value::as_f64)
                .or_else(|| number_field(audit, "numericValue"));
            Some(Opportunity {
                id: id.clone(),
                title: string_field(audit, "title").unwrap_or_else(|| id.clone()),
                description: string_field(audit, "description").unwrap_or_default(),
                savings_ms,
                display_value: string_field(audit, "displayValue").unwrap_or_default(),
            })
        })
        .collect();

    // Stable sort keeps provider order among equal savings
    out.sort_by(|a, b| {
        let a = a.savings_ms.unwrap_or(0.0);
        let b = b.savings_ms.unwrap_or(0.0);
        b.total_cmp(&a)
    });
    out.truncate(MAX_OPPORTUNITIES);
    out
}

fn pick_field_data(loading: &Value) -> Option<FieldData> {
    let metrics: Vec<FieldMetric> = loading
        .get("metrics")
        .and_then(Value::as_object)?
        .iter()
        .filter_map(|(id, entry)| {
            let percentile = number_field(entry, "percentile");
            let category = string_field(entry, "category");
            if percentile.is_none() && category.is_none() {
                return None;
            }
            Some(FieldMetric {
                id: id.clone(),
                percentile,
                category,
            })
        })
        .collect();

    if metrics.is_empty() {
        return None;
    }

    Some(FieldData {
        overall_category: string_field(loading, "overall_category"),
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fixtures::payload;
    use serde_json::json;

    #[test]
    fn test_extract_empty_payload() {
        let extracted = extract(&json!({}));
        assert_eq!(extracted, Extracted::default());
    }

    #[test]
    fn test_perf_score_requires_number() {
        let raw = json!({
            "lighthouseResult": { "categories": { "performance": { "score": "0.9" } } }
        });
        assert_eq!(extract(&raw).perf_score, None);

        let raw = payload().perf_score(0.42).build();
        assert_eq!(extract(&raw).perf_score, Some(0.42));
    }

    #[test]
    fn test_metrics_in_fixed_order_and_absent_dropped() {
        let raw = payload()
            .metric("speed-index", 3000.0, "3.0 s")
            .metric("server-response-time", 120.0, "120 ms")
            .metric("first-contentful-paint", 900.0, "0.9 s")
            .build();

        let metrics = extract(&raw).metrics;
        let ids: Vec<&str> = metrics.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["server-response-time", "speed-index"]);
        assert_eq!(metrics[0].numeric_value, Some(120.0));
        assert_eq!(metrics[0].display_value, "120 ms");
    }

    #[test]
    fn test_metric_defaults_for_missing_fields() {
        let raw = payload()
            .audit("total-blocking-time", json!({ "numericValue": "fast", "score": null }))
            .build();

        let metric = &extract(&raw).metrics[0];
        assert_eq!(metric.title, "");
        assert_eq!(metric.display_value, "");
        assert_eq!(metric.numeric_value, None);
        assert_eq!(metric.score, None);
    }

    #[test]
    fn test_opportunities_sorted_and_truncated() {
        let mut builder = payload();
        for i in 0..15 {
            builder = builder.opportunity(&format!("opp-{:02}", i), (i * 100) as f64);
        }
        builder = builder.audit(
            "no-savings",
            json!({ "details": { "type": "opportunity" } }),
        );

        let opps = extract(&builder.build()).opportunities;
        assert_eq!(opps.len(), MAX_OPPORTUNITIES);
        assert_eq!(opps[0].id, "opp-14");
        assert!(
            opps.windows(2)
                .all(|w| w[0].savings_ms.unwrap_or(0.0) >= w[1].savings_ms.unwrap_or(0.0))
        );
        assert!(!opps.iter().any(|o| o.id == "no-savings"));
    }

    #[test]
    fn test_equal_savings_keep_provider_order() {
        let raw: Value = serde_json::from_str(
            r#"{
                "lighthouseResult": {
                    "audits": {
                        "zeta": { "details": { "type": "opportunity", "overallSavingsMs": 100 } },
                        "big": { "details": { "type": "opportunity", "overallSavingsMs": 900 } },
                        "alpha": { "details": { "type": "opportunity", "overallSavingsMs": 100 } },
                        "middle": { "details": { "type": "opportunity" } }
                    }
                }
            }"#,
        )
        .unwrap();

        let ids: Vec<String> = extract(&raw).opportunities.into_iter().map(|o| o.id).collect();
        assert_eq!(ids, vec!["big", "zeta", "alpha", "middle"]);
    }

    #[test]
    fn test_field_metrics_keep_provider_order() {
        let raw: Value = serde_json::from_str(
            r#"{
                "loadingExperience": {
                    "metrics": {
                        "LARGEST_CONTENTFUL_PAINT_MS": { "percentile": 2600, "category": "AVERAGE" },
                        "CUMULATIVE_LAYOUT_SHIFT_SCORE": { "percentile": 5, "category": "FAST" }
                    }
                }
            }"#,
        )
        .unwrap();

        let ids: Vec<String> = extract(&raw)
            .field
            .unwrap()
            .metrics
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(
            ids,
            vec!["LARGEST_CONTENTFUL_PAINT_MS", "CUMULATIVE_LAYOUT_SHIFT_SCORE"]
        );
    }

    #[test]
    fn test_opportunity_savings_fallback_to_numeric_value() {
        let raw = payload()
            .audit(
                "unused-css-rules",
                json!({ "numericValue": 340.0, "details": { "type": "opportunity" } }),
            )
            .audit(
                "diagnostic-only",
                json!({ "numericValue": 900.0, "details": { "type": "table" } }),
            )
            .build();

        let opps = extract(&raw).opportunities;
        assert_eq!(opps.len(), 1);
        assert_eq!(opps[0].savings_ms, Some(340.0));
        assert_eq!(opps[0].title, "unused-css-rules");
    }

    #[test]
    fn test_field_data_filters_empty_entries() {
        let raw = payload()
            .overall_category("SLOW")
            .field_metric("LARGEST_CONTENTFUL_PAINT_MS", Some(4100.0), Some("SLOW"))
            .field_metric("FIRST_INPUT_DELAY_MS", None, None)
            .field_metric("CUMULATIVE_LAYOUT_SHIFT_SCORE", None, Some("FAST"))
            .build();

        let field = extract(&raw).field.unwrap();
        assert_eq!(field.overall_category.as_deref(), Some("SLOW"));
        assert_eq!(field.metrics.len(), 2);
        assert!(!field.metrics.iter().any(|m| m.id == "FIRST_INPUT_DELAY_MS"));
    }

    #[test]
    fn test_field_data_absent_when_nothing_survives() {
        let raw = payload()
            .overall_category("AVERAGE")
            .field_metric("FIRST_INPUT_DELAY_MS", None, None)
            .build();
        assert_eq!(extract(&raw).field, None);
    }

    #[test]
    fn test_serializes_camel_case() {
        let metric = Metric {
            id: "speed-index".into(),
            title: "Speed Index".into(),
            display_value: "3.0 s".into(),
            numeric_value: Some(3000.0),
            score: None,
        };
        let json = serde_json::to_value(&metric).unwrap();
        assert_eq!(json["displayValue"], "3.0 s");
        assert_eq!(json["numericValue"], 3000.0);
        assert!(json["score"].is_null());
    }
}
