//! Crawler module for the reachability crawl
//!
//! This module contains the core crawling logic, including:
//! - The shared frontier (queue, visited set, in-flight tracking)
//! - HTTP fetching with timeout and failure classification
//! - Pattern-based link extraction
//! - The fetch worker pool and overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod worker;

pub use coordinator::{run_crawl, Coordinator, CrawlReport};
pub use fetcher::{
    build_http_client, fetch_url, FetchFailure, FetchOutcome, FetchedPage, Fetcher, HttpFetcher,
};
pub use frontier::{Frontier, FrontierStats};
pub use parser::{extract_links, is_markup, Links};
pub use worker::Worker;

use crate::config::Config;
use crate::Result;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration
/// 2. Open the error log and build the HTTP client
/// 3. Seed the frontier and start the worker pool
/// 4. Wait for the frontier to drain
/// 5. Flush every recorded error
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl drained
/// * `Err(ReachError)` - Crawl could not start, or the log could not be flushed
pub async fn crawl(config: Config) -> Result<CrawlReport> {
    run_crawl(config).await
}
