//! Fetch worker loop
//!
//! Each worker repeatedly claims a URL from the frontier, fetches it, and
//! either enqueues the in-scope links of the page or records the failure. A
//! worker exits once the frontier reports drain.

use crate::crawler::fetcher::{FetchFailure, FetchOutcome, Fetcher};
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::extract_links;
use crate::output::ErrorLogger;
use crate::url::ScopeFilter;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// One member of the fetch worker pool
pub struct Worker<F: Fetcher> {
    id: usize,
    frontier: Arc<Frontier>,
    fetcher: Arc<F>,
    scope: Arc<ScopeFilter>,
    logger: ErrorLogger,
    timeout: Duration,
}

impl<F: Fetcher> Worker<F> {
    /// Creates a worker sharing the given frontier, fetcher and scope
    pub fn new(
        id: usize,
        frontier: Arc<Frontier>,
        fetcher: Arc<F>,
        scope: Arc<ScopeFilter>,
        logger: ErrorLogger,
        timeout: Duration,
    ) -> Self {
        Self {
            id,
            frontier,
            fetcher,
            scope,
            logger,
            timeout,
        }
    }

    /// Runs until the frontier is drained
    ///
    /// # Returns
    ///
    /// The number of URLs this worker attempted
    pub async fn run(self) -> u64 {
        tracing::debug!("Worker {} started", self.id);

        let mut attempted = 0;
        while let Some(url) = self.frontier.dequeue().await {
            self.process(url).await;
            self.frontier.mark_done();
            attempted += 1;
        }

        tracing::debug!("Worker {} finished after {} URLs", self.id, attempted);
        attempted
    }

    /// Fetches one URL and applies the outcome to the frontier or error log
    ///
    /// The fetch and extraction run in their own task, so a panic anywhere in
    /// them ends up as an `Unknown` failure instead of killing this worker.
    async fn process(&self, url: Url) {
        tracing::debug!("Worker {} fetching {}", self.id, url);

        let attempt = {
            let fetcher = Arc::clone(&self.fetcher);
            let scope = Arc::clone(&self.scope);
            let timeout = self.timeout;
            let target = url.clone();

            tokio::spawn(async move {
                let outcome = match tokio::time::timeout(timeout, fetcher.fetch(&target)).await {
                    Ok(outcome) => outcome,
                    Err(_) => return Err(FetchFailure::Timeout),
                };

                match outcome {
                    // A page that ended up outside the domain is reachable but
                    // its links are not ours to follow
                    FetchOutcome::Success(page)
                        if scope.admit_url(page.final_url.clone()).is_none() =>
                    {
                        Ok(Vec::new())
                    }
                    FetchOutcome::Success(page) => Ok(extract_links(
                        &page.body,
                        &page.content_type,
                        &page.final_url,
                    )
                    .filter_map(|link| scope.admit_url(link))
                    .collect::<Vec<Url>>()),
                    FetchOutcome::Failure(failure) => Err(failure),
                }
            })
        };

        let result = match attempt.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => Err(FetchFailure::Unknown(panic_message(e.into_panic()))),
            Err(e) => Err(FetchFailure::Unknown(e.to_string())),
        };

        match result {
            Ok(links) => {
                let mut admitted = 0;
                for link in links {
                    if self.frontier.enqueue(link) {
                        admitted += 1;
                    }
                }
                tracing::debug!("{} ok, {} new links", url, admitted);
            }
            Err(failure) => {
                tracing::warn!("{} unreachable ({}): {}", url, failure.kind(), failure);
                self.logger.record(url.as_str(), failure.to_string());
            }
        }
    }
}

/// Pulls a readable message out of a panic payload
fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic during fetch".to_string()
    }
}
