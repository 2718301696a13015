//! Bounded-concurrency batch handling
//!
//! Runs many queries through one orchestrator so they share its cache and
//! rate limiter, keeping at most `max_concurrent` requests in flight.

use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, info};
use reqwest::header::HeaderMap;

use super::{Orchestrator, PageloadQuery, PageloadResponse};
use crate::client::PageSpeedApi;

/// Default number of URLs audited at once by `batch`
pub const DEFAULT_BATCH_CONCURRENCY: usize = 4;

impl<C: PageSpeedApi> Orchestrator<C> {
    /// Handle every query, returning responses in input order.
    ///
    /// A `max_concurrent` of zero is treated as one.
    pub async fn handle_batch(
        &self,
        queries: &[PageloadQuery],
        headers: &HeaderMap,
        max_concurrent: usize,
    ) -> Vec<PageloadResponse> {
        if queries.is_empty() {
            return Vec::new();
        }

        let max_concurrent = max_concurrent.max(1);
        let total = queries.len();
        debug!(
            "Handling {} queries with max {} concurrent",
            total, max_concurrent
        );

        let run = |index: usize| async move { (index, self.handle(&queries[index], headers).await) };

        let mut slots: Vec<Option<PageloadResponse>> = vec![None; total];
        let mut in_flight = FuturesUnordered::new();
        let mut pending = 0..total;

        // Seed up to max_concurrent
        for index in pending.by_ref().take(max_concurrent) {
            in_flight.push(run(index));
        }

        let mut done = 0;
        while let Some((index, response)) = in_flight.next().await {
            done += 1;
            info!(
                "[{}/{}] {} -> HTTP {}",
                done,
                total,
                queries[index].url.as_deref().unwrap_or(""),
                response.status
            );
            slots[index] = Some(response);

            if let Some(next) = pending.next() {
                in_flight.push(run(next));
            }
        }

        slots.into_iter().flatten().collect()
    }
}
