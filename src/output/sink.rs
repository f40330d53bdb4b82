//! Log sink abstraction and implementations
//!
//! A sink is the durable, append-only target for error records. The
//! [`ErrorLogger`](crate::output::ErrorLogger) owns exactly one sink and is its
//! only writer, so implementations need no internal locking.

use chrono::{DateTime, Local};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Timestamp format used in log lines
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One unreachable-URL observation
///
/// Records are never mutated once written. Several records for the same URL
/// are all kept; the log is an audit trail, not an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub url: String,
    pub reason: String,
    pub timestamp: DateTime<Local>,
}

impl ErrorRecord {
    /// Creates a record stamped with the current local time
    pub fn new(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reason: reason.into(),
            timestamp: Local::now(),
        }
    }
}

/// Formats as one log line body: `URL - ERROR - TIMESTAMP`
impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Line breaks inside a reason would split one record across lines
        let reason = self.reason.replace(['\r', '\n'], " ");
        write!(
            f,
            "{} - {} - {}",
            self.url,
            reason,
            self.timestamp.format(TIMESTAMP_FORMAT)
        )
    }
}

/// Durable append-only target for error records
pub trait LogSink: Send + 'static {
    /// Writes the session header line; called once before any record
    fn begin_session(&mut self) -> io::Result<()>;

    /// Appends one record as a single line
    fn append(&mut self, record: &ErrorRecord) -> io::Result<()>;

    /// Flushes buffered records to durable storage
    fn flush(&mut self) -> io::Result<()>;
}

/// Formats the header line written at the start of each session
pub fn session_header(started: DateTime<Local>) -> String {
    format!(
        "# URL - ERROR - TIME (session started {})",
        started.format(TIMESTAMP_FORMAT)
    )
}

/// Sink writing to a text file opened in append mode
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileSink {
    /// Opens (or creates) the log file for appending
    ///
    /// Failing here is a startup failure: the crawl must not start if its only
    /// error-reporting surface is unwritable.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    /// Path of the underlying log file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for FileSink {
    fn begin_session(&mut self) -> io::Result<()> {
        writeln!(self.writer, "{}", session_header(Local::now()))?;
        self.writer.flush()
    }

    fn append(&mut self, record: &ErrorRecord) -> io::Result<()> {
        writeln!(self.writer, "{}", record)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_data()
    }
}

/// In-memory sink, shared by handle, for embedding and tests
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<MemoryLog>>,
}

#[derive(Debug, Default)]
struct MemoryLog {
    sessions: usize,
    records: Vec<ErrorRecord>,
    flushed: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records appended so far
    pub fn records(&self) -> Vec<ErrorRecord> {
        self.lock().records.clone()
    }

    /// Number of records covered by the last flush
    pub fn flushed(&self) -> usize {
        self.lock().flushed
    }

    /// Number of sessions begun
    pub fn sessions(&self) -> usize {
        self.lock().sessions
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryLog> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LogSink for MemorySink {
    fn begin_session(&mut self) -> io::Result<()> {
        self.lock().sessions += 1;
        Ok(())
    }

    fn append(&mut self, record: &ErrorRecord) -> io::Result<()> {
        self.lock().records.push(record.clone());
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut log = self.lock();
        log.flushed = log.records.len();
        Ok(())
    }
}
