//! Output module for crawl results
//!
//! This module handles:
//! - The durable error log (one line per unreachable URL)
//! - Serializing concurrent error submissions through a single writer
//! - The rolling progress display and final crawl summary

mod error_log;
mod progress;
mod sink;
pub mod stats;

pub use error_log::{ErrorLogWriter, ErrorLogger, WriterSummary};
pub use progress::{ProgressReporter, PROGRESS_INTERVAL};
pub use sink::{session_header, ErrorRecord, FileSink, LogSink, MemorySink, TIMESTAMP_FORMAT};
pub use stats::{format_progress, print_report, CrawlStats};
