//! Common display utilities and helpers

/// Placeholder for values the provider did not report
pub const MISSING: &str = "--";

/// Truncate string to max characters with ellipsis
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Lighthouse score (0..1) as a 0..100 integer string
pub fn format_score(score: Option<f64>) -> String {
    score
        .map(|s| format!("{}", (s * 100.0).round() as i64))
        .unwrap_or_else(|| MISSING.to_string())
}

/// Milliseconds rounded to whole numbers, e.g. `1230 ms`
pub fn format_ms(ms: Option<f64>) -> String {
    ms.map(|v| format!("{} ms", v.round() as i64))
        .unwrap_or_else(|| MISSING.to_string())
}

/// Display value if non-empty, otherwise the placeholder
pub fn or_missing(value: &str) -> String {
    if value.trim().is_empty() {
        MISSING.to_string()
    } else {
        value.to_string()
    }
}
