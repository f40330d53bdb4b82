//! Crawl statistics and the final report
//!
//! This module turns frontier counters and the error count into the rolling
//! progress line and the summary printed once the crawl has drained.

use crate::crawler::{CrawlReport, FrontierStats};
use std::path::Path;
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Total number of URLs admitted to the frontier
    pub discovered: u64,

    /// URLs still waiting for a fetch attempt
    pub pending: u64,

    /// URLs currently being fetched
    pub in_flight: u64,

    /// URLs whose fetch attempt has finished
    pub checked: u64,

    /// Error records submitted to the log
    pub errored: u64,
}

impl CrawlStats {
    /// Combines a frontier snapshot with the error counter
    pub fn new(frontier: FrontierStats, errored: u64) -> Self {
        Self {
            discovered: frontier.discovered,
            pending: frontier.pending,
            in_flight: frontier.in_flight,
            checked: frontier.checked,
            errored,
        }
    }

    /// URLs checked without an error record
    pub fn reachable(&self) -> u64 {
        self.checked.saturating_sub(self.errored)
    }
}

/// Formats the single-line progress display
pub fn format_progress(stats: &CrawlStats) -> String {
    format!(
        "pending: {} | in-flight: {} | discovered: {} | checked: {} | errors: {}",
        stats.pending, stats.in_flight, stats.discovered, stats.checked, stats.errored
    )
}

/// Prints the final crawl summary to stdout
///
/// # Arguments
///
/// * `report` - The report returned by the coordinator
/// * `log_path` - Where the error records were written
pub fn print_report(report: &CrawlReport, log_path: &Path) {
    let stats = &report.stats;

    println!("=== Crawl Summary ===\n");
    println!("  URLs discovered: {}", stats.discovered);
    println!("  URLs checked: {}", stats.checked);
    println!("  Reachable: {}", stats.reachable());
    println!("  Errors recorded: {}", stats.errored);

    // Calculate error rate
    let error_rate = if stats.checked > 0 {
        (stats.errored as f64 / stats.checked as f64) * 100.0
    } else {
        0.0
    };
    println!("  Error rate: {:.1}%", error_rate);

    let rate = if report.elapsed > Duration::ZERO {
        stats.checked as f64 / report.elapsed.as_secs_f64()
    } else {
        0.0
    };
    println!(
        "  Elapsed: {:.1}s ({:.2} URLs/sec)",
        report.elapsed.as_secs_f64(),
        rate
    );
    println!();
    println!("Error log: {}", log_path.display());
}
