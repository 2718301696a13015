//! Bounded JSON GET that never fails loudly.
//!
//! Every outcome (transport error, timeout, non-2xx, unparsable body) is folded
//! into a [`FetchResult`] so callers can cache and report failures uniformly.

use std::time::Duration;

use log::debug;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest::{Client as HttpClient, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::FetchResult;
use crate::error::ApiError;

/// Timeout applied when a caller does not pick one
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on the body snippet kept as failure detail
pub const DETAIL_LIMIT: usize = 2000;

/// Per-call options for [`safe_json_fetch`]
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub headers: HeaderMap,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            headers: HeaderMap::new(),
        }
    }
}

impl FetchOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }
}

/// GET `url` and decode the body as JSON.
///
/// The request carries only the headers in `opts`; the HTTP client is built
/// without a cookie store so no cookies or credentials leak to third parties.
pub async fn safe_json_fetch<T: DeserializeOwned>(
    http: &HttpClient,
    url: Url,
    opts: &FetchOptions,
) -> FetchResult<T> {
    debug!("GET {} (timeout {:?})", redact(&url), opts.timeout);

    let response = match http
        .get(url)
        .headers(opts.headers.clone())
        .timeout(opts.timeout)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => return FetchResult::err(describe_error(e, opts.timeout), None, None),
    };

    let status = response.status();
    if !status.is_success() {
        let (message, detail) = read_response_detail(response).await;
        let error = match message {
            Some(msg) => format!("HTTP {}: {}", status.as_u16(), msg),
            None => format!("HTTP {}", status.as_u16()),
        };
        return FetchResult::err(error, Some(status.as_u16()), detail);
    }

    match response.json::<T>().await {
        Ok(value) => FetchResult::ok(value, status.as_u16()),
        Err(e) => FetchResult::err(describe_error(e, opts.timeout), None, None),
    }
}

fn describe_error(err: reqwest::Error, timeout: Duration) -> String {
    match ApiError::from(err) {
        ApiError::Timeout(_) => ApiError::Timeout(Some(timeout)),
        other => other,
    }
    .to_string()
}

/// Pull an error message and a body snippet out of a failed response.
async fn read_response_detail(response: Response) -> (Option<String>, Option<String>) {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));

    let Ok(text) = response.text().await else {
        return (None, None);
    };

    let detail = truncate_detail(&text);
    let message = if is_json {
        serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| pick_error_message(&v))
    } else {
        None
    };
    (message, detail)
}

/// Extract `error.message` from a `{ "error": { "message": ... } }` body.
pub fn pick_error_message(body: &Value) -> Option<String> {
    let msg = body.get("error")?.get("message")?.as_str()?.trim();
    (!msg.is_empty()).then(|| msg.to_string())
}

/// Trim and cap a response body to [`DETAIL_LIMIT`] characters.
pub fn truncate_detail(text: &str) -> Option<String> {
    let snippet: String = text.trim().chars().take(DETAIL_LIMIT).collect();
    (!snippet.is_empty()).then_some(snippet)
}

/// Strip the `key` query parameter before a URL reaches the logs.
fn redact(url: &Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "key" { "***".into() } else { v };
            (k.into_owned(), v.into_owned())
        })
        .collect();
    if !pairs.is_empty() {
        redacted.query_pairs_mut().clear().extend_pairs(pairs);
    }
    redacted.to_string()
}
