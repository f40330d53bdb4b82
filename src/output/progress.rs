//! Rolling console progress display

use crate::crawler::Frontier;
use crate::output::error_log::ErrorLogger;
use crate::output::stats::{format_progress, CrawlStats};
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Refresh period of the progress line
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(250);

/// Background task redrawing a single stdout line with the crawl counters
///
/// The display carries no error semantics; it only reads counters.
#[derive(Debug)]
pub struct ProgressReporter {
    stop: Arc<Notify>,
    handle: JoinHandle<()>,
}

impl ProgressReporter {
    /// Starts redrawing every `interval`
    pub fn spawn(frontier: Arc<Frontier>, logger: ErrorLogger, interval: Duration) -> Self {
        let stop = Arc::new(Notify::new());
        let signal = Arc::clone(&stop);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        render(&CrawlStats::new(frontier.stats(), logger.errored()));
                    }
                    _ = signal.notified() => break,
                }
            }

            // Leave the final counts on screen
            render(&CrawlStats::new(frontier.stats(), logger.errored()));
            println!();
        });

        Self { stop, handle }
    }

    /// Draws the last line and waits for the task to finish
    pub async fn stop(self) {
        // notify_one stores a permit, so a stop issued mid-render is not lost
        self.stop.notify_one();
        if let Err(e) = self.handle.await {
            tracing::debug!("Progress display ended abnormally: {}", e);
        }
    }
}

fn render(stats: &CrawlStats) {
    let mut stdout = io::stdout().lock();
    // Progress output is best effort
    let _ = write!(stdout, "\r{}", format_progress(stats));
    let _ = stdout.flush();
}
