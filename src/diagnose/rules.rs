//! The individual diagnosis rules
//!
//! Rules run in the order `diagnose` calls them; that order breaks score ties.

use super::signals::{
    Signals, capped, display_of, impact_from_ms, is_needs_improvement, is_poor, severity_from_ms,
    value_of,
};
use super::{Candidate, Drafts, Impact, Severity};

pub(super) fn origin_latency(s: &Signals<'_>, out: &mut Drafts) {
    let ms = value_of(s.ttfb);
    let field_poor = is_poor(s.field_ttfb);
    if ms < 800.0 && !field_poor && !is_needs_improvement(s.field_ttfb) {
        return;
    }

    let severity = if field_poor || ms >= 1800.0 {
        Severity::High
    } else {
        severity_from_ms(ms, 800.0, 1400.0)
    };
    let impact = if severity == Severity::High {
        Impact::High
    } else {
        Impact::Medium
    };

    out.push(Candidate {
        id: "origin-latency",
        title: "Slow server response (TTFB)",
        severity,
        impact,
        evidence: vec![
            display_of(s.ttfb).map(|d| format!("Lab server response time: {d}.")),
            s.field_ttfb.map(|c| format!("Field TTFB category: {c}.")),
        ],
        fixes: &[
            "Cache HTML at a CDN edge so repeat visits skip the origin.",
            "Profile backend and database time on the first request and trim cold-start work.",
            "Add preconnect or early hints for critical origins when the backend cannot get faster.",
        ],
        boost: capped(ms / 25.0, 90),
    });
}

pub(super) fn lcp_render_blocking(s: &Signals<'_>, out: &mut Drafts) {
    let lcp_ms = value_of(s.lcp);
    let blocking = s.render_blocking_ms;
    let field_poor = is_poor(s.field_lcp);
    if lcp_ms < 2500.0 && blocking < 150.0 && !field_poor {
        return;
    }

    let severity = if lcp_ms >= 4000.0 || blocking >= 700.0 || field_poor {
        Severity::High
    } else {
        severity_from_ms(lcp_ms, 2500.0, 3200.0)
    };

    out.push(Candidate {
        id: "lcp-render-blocking",
        title: "Late hero rendering (LCP path blocked)",
        severity,
        impact: impact_from_ms((lcp_ms / 4.0).max(blocking)),
        evidence: vec![
            display_of(s.lcp).map(|d| format!("Lab LCP: {d}.")),
            (blocking > 0.0)
                .then(|| format!("Render-blocking resource opportunity: ~{blocking}ms.")),
            s.field_lcp.map(|c| format!("Field LCP category: {c}.")),
        ],
        fixes: &[
            "Inline the critical CSS and defer styles and scripts the first view does not need.",
            "Preload the LCP image or font and shrink the above-the-fold payload.",
            "Load non-essential third-party scripts after the first paint.",
        ],
        boost: ((lcp_ms / 30.0).round() as i64 + (blocking / 20.0).round() as i64).min(140),
    });
}

pub(super) fn js_main_thread(s: &Signals<'_>, out: &mut Drafts) {
    let tbt_ms = value_of(s.tbt);
    let inp_ms = value_of(s.inp);
    let js_ms = s.js_ms;
    let field_poor = is_poor(s.field_inp);
    if tbt_ms < 200.0 && inp_ms < 200.0 && js_ms < 250.0 && !field_poor {
        return;
    }

    let max_work = tbt_ms.max(js_ms).max(inp_ms);
    let severity = if max_work >= 600.0 || field_poor {
        Severity::High
    } else {
        severity_from_ms(max_work, 200.0, 420.0)
    };

    out.push(Candidate {
        id: "js-main-thread",
        title: "Main-thread JavaScript pressure",
        severity,
        impact: impact_from_ms(max_work),
        evidence: vec![
            display_of(s.tbt).map(|d| format!("Lab Total Blocking Time: {d}.")),
            display_of(s.inp).map(|d| format!("Lab INP audit: {d}.")),
            (js_ms > 0.0)
                .then(|| format!("JS-related opportunities suggest ~{js_ms}ms potential savings.")),
        ],
        fixes: &[
            "Split large bundles and defer hydration or work the first view does not need.",
            "Drop unused and legacy JavaScript and push third-party boot cost later.",
            "Break long tasks into smaller chunks and move heavy computation to workers.",
        ],
        boost: capped(max_work / 10.0, 150),
    });
}

pub(super) fn image_payload(s: &Signals<'_>, out: &mut Drafts) {
    let ms = s.image_ms;
    if ms < 250.0 {
        return;
    }

    let severity = if ms >= 1200.0 {
        Severity::High
    } else if ms >= 500.0 {
        Severity::Medium
    } else {
        Severity::Low
    };

    out.push(Candidate {
        id: "image-payload",
        title: "Heavy image payload",
        severity,
        impact: impact_from_ms(ms),
        evidence: vec![Some(format!(
            "Image-related opportunities suggest ~{ms}ms potential savings."
        ))],
        fixes: &[
            "Serve AVIF or WebP and right-size responsive variants.",
            "Lazy-load images below the fold and compress them harder.",
            "Preload only the one hero image that is the LCP element.",
        ],
        boost: capped(ms / 8.0, 130),
    });
}

pub(super) fn cache_policy(s: &Signals<'_>, out: &mut Drafts) {
    let ms = s.cache_ms;
    if ms < 200.0 {
        return;
    }

    let severity = if ms >= 1200.0 {
        Severity::High
    } else {
        Severity::Medium
    };

    out.push(Candidate {
        id: "cache-policy",
        title: "Weak static caching policy",
        severity,
        impact: impact_from_ms(ms),
        evidence: vec![Some(format!(
            "Caching opportunity indicates ~{ms}ms potential savings."
        ))],
        fixes: &[
            "Send long-lived immutable cache headers for versioned static assets.",
            "Put cacheable assets behind a CDN with edge caching and compression.",
        ],
        boost: capped(ms / 10.0, 90),
    });
}

pub(super) fn layout_instability(s: &Signals<'_>, out: &mut Drafts) {
    let cls = value_of(s.cls);
    let field_poor = is_poor(s.field_cls);
    if cls < 0.1 && !field_poor && !is_needs_improvement(s.field_cls) {
        return;
    }

    let severity = if cls >= 0.25 || field_poor {
        Severity::High
    } else {
        Severity::Medium
    };
    let impact = if severity == Severity::High {
        Impact::Medium
    } else {
        Impact::Low
    };

    out.push(Candidate {
        id: "layout-instability",
        title: "Layout instability (CLS)",
        severity,
        impact,
        evidence: vec![
            display_of(s.cls).map(|d| format!("Lab CLS: {d}.")),
            s.field_cls.map(|c| format!("Field CLS category: {c}.")),
        ],
        fixes: &[
            "Reserve space for media, ads and embeds; never insert content above what is already shown.",
            "Load fonts with `font-display: swap` and avoid late style changes that move layout.",
        ],
        boost: capped(cls * 500.0, 70),
    });
}

pub(super) fn third_party_overhead(s: &Signals<'_>, out: &mut Drafts) {
    let ms = s.third_party_ms;
    if ms < 300.0 {
        return;
    }

    let severity = if ms >= 1000.0 {
        Severity::High
    } else {
        Severity::Medium
    };

    out.push(Candidate {
        id: "third-party-overhead",
        title: "Third-party script overhead",
        severity,
        impact: impact_from_ms(ms),
        evidence: vec![Some(format!(
            "Third-party summary audit suggests ~{ms}ms potential savings."
        ))],
        fixes: &[
            "Hold non-critical tags until after first input or idle.",
            "Remove low-value tags and load the rest asynchronously.",
            "Self-host critical third-party assets with better caching where contracts allow.",
        ],
        boost: capped(ms / 12.0, 100),
    });
}

/// Fallback when nothing specific fired but the score is still poor
pub(super) fn mixed_bottlenecks(s: &Signals<'_>, out: &mut Drafts) {
    let Some(score) = s.perf_score.filter(|score| *score < 0.75) else {
        return;
    };

    out.push(Candidate {
        id: "mixed-bottlenecks",
        title: "Mixed bottlenecks detected",
        severity: Severity::Medium,
        impact: Impact::Medium,
        evidence: vec![Some(format!(
            "Performance score is {} with no single dominant PSI opportunity.",
            (score * 100.0).round() as i64
        ))],
        fixes: &[
            "Inspect the trace and waterfall to separate backend, render and third-party cost.",
            "Repeat the test with the same URL, device and network, then fix the largest stable bottleneck first.",
        ],
        boost: 40,
    });
}

#[cfg(test)]
mod tests {
    use super::super::{Diagnosis, DiagnosisInput, diagnose};
    use super::*;
    use crate::client::fixtures::payload;
    use crate::extract::extract;

    fn run(raw: serde_json::Value) -> Vec<Diagnosis> {
        let extracted = extract(&raw);
        diagnose(&DiagnosisInput::from(&extracted))
    }

    fn find<'a>(diagnoses: &'a [Diagnosis], id: &str) -> Option<&'a Diagnosis> {
        diagnoses.iter().find(|d| d.id == id)
    }

    #[test]
    fn test_origin_latency_tiers() {
        let d = run(payload().metric("server-response-time", 900.0, "900 ms").build());
        let origin = find(&d, "origin-latency").unwrap();
        assert_eq!(origin.severity, Severity::Medium);
        assert_eq!(origin.expected_impact, Impact::Medium);

        let d = run(payload().metric("server-response-time", 1500.0, "1.5 s").build());
        assert_eq!(find(&d, "origin-latency").unwrap().severity, Severity::High);

        let d = run(payload().metric("server-response-time", 799.0, "799 ms").build());
        assert!(find(&d, "origin-latency").is_none());
    }

    #[test]
    fn test_origin_latency_from_field_only() {
        let d = run(
            payload()
                .field_metric("EXPERIMENTAL_TIME_TO_FIRST_BYTE", Some(2400.0), Some("SLOW"))
                .build(),
        );
        let origin = find(&d, "origin-latency").unwrap();
        assert_eq!(origin.severity, Severity::High);
        assert_eq!(origin.evidence, vec!["Field TTFB category: SLOW."]);

        let d = run(
            payload()
                .field_metric("TIME_TO_FIRST_BYTE", Some(1000.0), Some("AVERAGE"))
                .build(),
        );
        // Needs-improvement with no lab value still fires, at the lowest tier
        assert_eq!(find(&d, "origin-latency").unwrap().severity, Severity::Low);
    }

    #[test]
    fn test_lcp_render_blocking_evidence() {
        let d = run(
            payload()
                .metric("largest-contentful-paint", 2600.0, "2.6 s")
                .opportunity("render-blocking-resources", 320.4)
                .build(),
        );
        let lcp = find(&d, "lcp-render-blocking").unwrap();
        assert_eq!(lcp.severity, Severity::Medium);
        assert_eq!(lcp.expected_impact, Impact::Medium);
        assert_eq!(
            lcp.evidence,
            vec![
                "Lab LCP: 2.6 s.",
                "Render-blocking resource opportunity: ~320ms.",
            ]
        );
    }

    #[test]
    fn test_lcp_high_when_render_blocking_large() {
        let d = run(payload().opportunity("render-blocking-resources", 800.0).build());
        let lcp = find(&d, "lcp-render-blocking").unwrap();
        assert_eq!(lcp.severity, Severity::High);
        assert_eq!(lcp.evidence.len(), 1);
    }

    #[test]
    fn test_js_main_thread_uses_max_work() {
        let d = run(
            payload()
                .metric("total-blocking-time", 150.0, "150 ms")
                .opportunity("unused-javascript", 200.0)
                .opportunity("bootup-time", 150.0)
                .build(),
        );
        let js = find(&d, "js-main-thread").unwrap();
        assert_eq!(js.severity, Severity::Medium);
        assert_eq!(js.expected_impact, Impact::Medium);
        assert!(js.evidence.iter().any(|e| e.contains("~350ms")));
    }

    #[test]
    fn test_js_main_thread_field_inp_poor() {
        let d = run(
            payload()
                .field_metric("INTERACTION_TO_NEXT_PAINT", Some(700.0), Some("SLOW"))
                .metric("interaction-to-next-paint", 90.0, "90 ms")
                .build(),
        );
        assert_eq!(find(&d, "js-main-thread").unwrap().severity, Severity::High);
    }

    #[test]
    fn test_image_payload_thresholds() {
        let d = run(payload().opportunity("offscreen-images", 249.0).build());
        assert!(find(&d, "image-payload").is_none());

        let d = run(
            payload()
                .opportunity("offscreen-images", 200.0)
                .opportunity("modern-image-formats", 100.0)
                .build(),
        );
        assert_eq!(find(&d, "image-payload").unwrap().severity, Severity::Low);
    }

    #[test]
    fn test_cache_policy_and_third_party() {
        let d = run(
            payload()
                .opportunity("uses-long-cache-ttl", 250.0)
                .opportunity("third-party-summary", 1000.0)
                .build(),
        );
        assert_eq!(find(&d, "cache-policy").unwrap().severity, Severity::Medium);
        assert_eq!(find(&d, "cache-policy").unwrap().expected_impact, Impact::Low);
        assert_eq!(
            find(&d, "third-party-overhead").unwrap().severity,
            Severity::High
        );
    }

    #[test]
    fn test_layout_instability() {
        let d = run(payload().metric("cumulative-layout-shift", 0.12, "0.12").build());
        let cls = find(&d, "layout-instability").unwrap();
        assert_eq!(cls.severity, Severity::Medium);
        assert_eq!(cls.expected_impact, Impact::Low);

        let d = run(
            payload()
                .field_metric("CUMULATIVE_LAYOUT_SHIFT_SCORE", Some(30.0), Some("POOR"))
                .build(),
        );
        let cls = find(&d, "layout-instability").unwrap();
        assert_eq!(cls.severity, Severity::High);
        assert_eq!(cls.expected_impact, Impact::Medium);
    }
}
