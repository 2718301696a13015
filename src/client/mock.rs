//! Mock PageSpeed client for orchestrator tests

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::{FetchResult, PageSpeedApi, RawPayload, Strategy};

/// Canned responses per strategy plus a call log.
#[derive(Default)]
pub struct MockPageSpeedClient {
    responses: HashMap<Strategy, FetchResult<RawPayload>>,
    delays: HashMap<Strategy, Duration>,
    calls: Mutex<Vec<(String, Strategy, Option<String>)>>,
    call_count: AtomicUsize,
    api_key_configured: bool,
}

impl MockPageSpeedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond with `result` for every call using `strategy`.
    pub fn with_response(mut self, strategy: Strategy, result: FetchResult<RawPayload>) -> Self {
        self.responses.insert(strategy, result);
        self
    }

    /// Respond with `result` for both strategies.
    pub fn with_all(self, result: FetchResult<RawPayload>) -> Self {
        self.with_response(Strategy::Mobile, result.clone())
            .with_response(Strategy::Desktop, result)
    }

    /// Sleep before answering calls for `strategy`.
    pub fn with_delay(mut self, strategy: Strategy, delay: Duration) -> Self {
        self.delays.insert(strategy, delay);
        self
    }

    pub fn with_api_key(mut self) -> Self {
        self.api_key_configured = true;
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<(String, Strategy, Option<String>)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PageSpeedApi for MockPageSpeedClient {
    async fn run_pagespeed(
        &self,
        target: &str,
        strategy: Strategy,
        locale: Option<&str>,
    ) -> FetchResult<RawPayload> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((target.to_string(), strategy, locale.map(str::to_string)));
        }

        if let Some(delay) = self.delays.get(&strategy) {
            tokio::time::sleep(*delay).await;
        }

        self.responses
            .get(&strategy)
            .cloned()
            .unwrap_or_else(|| FetchResult::err("no mock response configured", None, None))
    }

    fn api_key_configured(&self) -> bool {
        self.api_key_configured
    }
}
