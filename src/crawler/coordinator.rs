//! Crawler coordinator - main crawl orchestration logic
//!
//! This module wires the crawl together:
//! - Seeding the frontier with the normalized start URL
//! - Starting the error log writer and the fetch worker pool
//! - Waiting for drain, then flushing the error log
//! - Producing the final crawl report

use crate::config::{validate, Config};
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::frontier::Frontier;
use crate::crawler::worker::Worker;
use crate::output::{
    CrawlStats, ErrorLogWriter, ErrorLogger, FileSink, LogSink, ProgressReporter, WriterSummary,
    PROGRESS_INTERVAL,
};
use crate::url::{normalize_url, ScopeFilter};
use crate::{ConfigError, ReachError, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use url::Url;

/// Outcome of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Counters at drain time
    pub stats: CrawlStats,

    /// Wall-clock time from the first worker start to the log flush
    pub elapsed: Duration,

    /// What the error log writer managed to persist
    pub log: WriterSummary,
}

/// Main crawler coordinator structure
pub struct Coordinator<F: Fetcher> {
    config: Config,
    seed: Url,
    frontier: Arc<Frontier>,
    fetcher: Arc<F>,
    scope: Arc<ScopeFilter>,
    writer: ErrorLogWriter,
}

impl<F: Fetcher> Coordinator<F> {
    /// Creates a new coordinator instance
    ///
    /// The seed is normalized and must fall inside the configured domain. The
    /// error log writer starts here, so this must be called from within a
    /// tokio runtime.
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `fetcher` - Retrieves URLs; shared by every worker
    /// * `sink` - Durable target for error records
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Frontier seeded and log writer running
    /// * `Err(ReachError)` - Bad seed or zero workers
    pub fn new<S: LogSink>(config: Config, fetcher: F, sink: S) -> Result<Self> {
        if config.crawl.worker_count == 0 {
            return Err(ConfigError::Validation("worker-count must be at least 1".to_string()).into());
        }

        let scope = ScopeFilter::new(config.crawl.domain_suffix.as_str());
        let seed = normalize_url(&config.crawl.seed_url)?;
        let seed = scope
            .admit_url(seed)
            .ok_or_else(|| ReachError::SeedOutOfScope {
                url: config.crawl.seed_url.clone(),
                domain: config.crawl.domain_suffix.clone(),
            })?;

        let frontier = Arc::new(Frontier::new());
        frontier.enqueue(seed.clone());

        Ok(Self {
            config,
            seed,
            frontier,
            fetcher: Arc::new(fetcher),
            scope: Arc::new(scope),
            writer: ErrorLogger::spawn(sink),
        })
    }

    /// Returns the shared frontier, e.g. for external progress reporting
    pub fn frontier(&self) -> Arc<Frontier> {
        Arc::clone(&self.frontier)
    }

    /// Runs the crawl to drain
    ///
    /// Starts `worker-count` workers, waits until every one of them has seen the
    /// frontier drain, then shuts down the error log writer. Fetch failures are
    /// never returned here; only a failure to flush the log is.
    pub async fn run(self) -> Result<CrawlReport> {
        let Coordinator {
            config,
            seed,
            frontier,
            fetcher,
            scope,
            writer,
        } = self;

        tracing::info!(
            "Starting crawl of {} (domain {}, {} workers, {}s timeout)",
            seed,
            scope.domain_suffix(),
            config.crawl.worker_count,
            config.crawl.timeout_seconds
        );

        let start_time = Instant::now();
        let timeout = Duration::from_secs(config.crawl.timeout_seconds);

        let progress = config.crawl.progress.then(|| {
            ProgressReporter::spawn(Arc::clone(&frontier), writer.logger(), PROGRESS_INTERVAL)
        });

        let mut workers = JoinSet::new();
        for id in 0..config.crawl.worker_count {
            let worker = Worker::new(
                id,
                Arc::clone(&frontier),
                Arc::clone(&fetcher),
                Arc::clone(&scope),
                writer.logger(),
                timeout,
            );
            workers.spawn(worker.run());
        }

        let mut attempted = 0;
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(count) => attempted += count,
                Err(e) => tracing::error!("Worker task failed: {}", e),
            }
        }

        if let Some(progress) = progress {
            progress.stop().await;
        }

        let stats = CrawlStats::new(frontier.stats(), writer.errored());
        let log = writer
            .shutdown()
            .await
            .map_err(|e| ReachError::Sink(e.to_string()))?;
        let elapsed = start_time.elapsed();

        tracing::info!(
            "Crawl completed: {} URLs checked, {} errors recorded in {:?}",
            attempted,
            stats.errored,
            elapsed
        );

        Ok(CrawlReport {
            stats,
            elapsed,
            log,
        })
    }
}

/// Runs a complete crawl against the network
///
/// Validates the configuration, builds the HTTP fetcher, opens the error log
/// in append mode and runs the coordinator to drain.
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl drained; failures are in the log file
/// * `Err(ReachError)` - Startup failed (invalid config, unwritable log) or the
///   log could not be flushed
pub async fn run_crawl(config: Config) -> Result<CrawlReport> {
    validate(&config)?;

    let fetcher = HttpFetcher::new(&config)?;
    let sink = FileSink::open(Path::new(&config.output.log_path))?;
    tracing::info!("Recording unreachable URLs to {}", sink.path().display());

    Coordinator::new(config, fetcher, sink)?.run().await
}
