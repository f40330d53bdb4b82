//! Serialized asynchronous error logger
//!
//! Workers hand records to [`ErrorLogger::record`], which only pushes onto an
//! unbounded channel and returns. A single blocking writer task drains the
//! channel into the [`LogSink`], so lines are written one at a time and in
//! submission order. [`ErrorLogWriter::shutdown`] closes the channel and waits for
//! the writer to flush everything that was submitted.

use crate::output::sink::{ErrorRecord, LogSink};
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// Summary returned by the writer when it finishes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterSummary {
    /// Records successfully appended to the sink
    pub written: u64,

    /// Records the sink rejected
    pub failed: u64,
}

/// Handle for submitting error records
///
/// Cheap to clone; every worker holds one. The writer task stops once the
/// owning handle is shut down and every clone has been dropped.
#[derive(Debug, Clone)]
pub struct ErrorLogger {
    tx: UnboundedSender<ErrorRecord>,
    errored: Arc<AtomicU64>,
}

/// Owner side of the logger, holding the writer task
#[derive(Debug)]
pub struct ErrorLogWriter {
    logger: ErrorLogger,
    handle: JoinHandle<io::Result<WriterSummary>>,
}

impl ErrorLogger {
    /// Starts the writer task for `sink` and returns the owning handle
    ///
    /// The session header is written before any record. Must be called from
    /// within a tokio runtime.
    pub fn spawn<S: LogSink>(sink: S) -> ErrorLogWriter {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::task::spawn_blocking(move || run_writer(sink, rx));

        ErrorLogWriter {
            logger: ErrorLogger {
                tx,
                errored: Arc::new(AtomicU64::new(0)),
            },
            handle,
        }
    }

    /// Submits a record for `url` with the current timestamp
    ///
    /// Never blocks on IO. The errored counter is bumped immediately so
    /// progress reporting reflects the failure before the line hits disk.
    pub fn record(&self, url: impl Into<String>, reason: impl Into<String>) {
        self.submit(ErrorRecord::new(url, reason));
    }

    /// Submits a pre-built record
    pub fn submit(&self, record: ErrorRecord) {
        self.errored.fetch_add(1, Ordering::Relaxed);
        if self.tx.send(record).is_err() {
            tracing::error!("Error log writer is gone; record dropped");
        }
    }

    /// Number of records submitted so far
    pub fn errored(&self) -> u64 {
        self.errored.load(Ordering::Relaxed)
    }
}

impl ErrorLogWriter {
    /// Returns a submission handle to give to workers
    pub fn logger(&self) -> ErrorLogger {
        self.logger.clone()
    }

    /// Number of records submitted so far
    pub fn errored(&self) -> u64 {
        self.logger.errored()
    }

    /// Closes the channel and waits until every submitted record is flushed
    ///
    /// Records submitted through clones that are still alive are also written;
    /// this call returns once the last clone is dropped.
    pub async fn shutdown(self) -> io::Result<WriterSummary> {
        let ErrorLogWriter { logger, handle } = self;
        drop(logger);

        match handle.await {
            Ok(result) => result,
            Err(e) => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("error log writer panicked: {}", e),
            )),
        }
    }
}

/// Writer loop: runs on the blocking pool until the channel closes
fn run_writer<S: LogSink>(
    mut sink: S,
    mut rx: UnboundedReceiver<ErrorRecord>,
) -> io::Result<WriterSummary> {
    sink.begin_session()?;

    let mut summary = WriterSummary::default();
    while let Some(record) = rx.blocking_recv() {
        match sink.append(&record) {
            Ok(()) => summary.written += 1,
            Err(e) => {
                summary.failed += 1;
                tracing::error!("Failed to write error record for {}: {}", record.url, e);
            }
        }

        // Flush whenever the channel is momentarily empty, so records reach
        // disk during long crawls and not only at shutdown.
        if rx.is_empty() {
            if let Err(e) = sink.flush() {
                tracing::error!("Failed to flush error log: {}", e);
            }
        }
    }

    sink.flush()?;
    tracing::debug!(
        "Error log writer finished: {} written, {} failed",
        summary.written,
        summary.failed
    );
    Ok(summary)
}
