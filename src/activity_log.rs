//! Append-only activity log.
//!
//! Every scan, move, rename, failure and lifecycle event is written here as a
//! single timestamped line:
//!
//! ```text
//! 2025-11-09 14:30:52 - Moving 'report.pdf' to '/home/me/Downloads/docs'.
//! ```
//!
//! The log is an explicit value handed to the organizer, not process-global
//! state. Clones share the same underlying sink.

use chrono::Local;
use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

/// Default log file, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "organizer.log";

/// Timestamp format used at the start of every log line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

type Sink = Arc<Mutex<Box<dyn Write + Send>>>;

/// Line-oriented, timestamped log sink shared by the scanner, watcher and mover.
#[derive(Clone)]
pub struct ActivityLog {
    sink: Sink,
}

impl std::fmt::Debug for ActivityLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityLog").finish_non_exhaustive()
    }
}

impl ActivityLog {
    /// Opens `path` for appending, creating it if needed.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::from_writer(file))
    }

    /// Wraps an arbitrary writer.
    pub fn from_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Creates a log backed by memory, returning a handle to read it back.
    ///
    /// # Examples
    ///
    /// ```
    /// use tidywatch::activity_log::ActivityLog;
    ///
    /// let (log, buffer) = ActivityLog::in_memory();
    /// log.info("Initial scan complete.");
    /// assert!(buffer.lines()[0].ends_with(" - Initial scan complete."));
    /// ```
    pub fn in_memory() -> (Self, MemoryLog) {
        let buffer = MemoryLog::default();
        (Self::from_writer(buffer.clone()), buffer)
    }

    /// Records an informational event.
    pub fn info(&self, message: &str) {
        tracing::debug!(target: "tidywatch::activity", "{}", message);
        self.write_line(message);
    }

    /// Records a failure.
    pub fn error(&self, message: &str) {
        tracing::debug!(target: "tidywatch::activity", error = true, "{}", message);
        self.write_line(message);
    }

    fn write_line(&self, message: &str) {
        let line = format_line(&Local::now().format(TIMESTAMP_FORMAT).to_string(), message);
        let mut sink = self.sink.lock();
        if let Err(e) = sink.write_all(line.as_bytes()).and_then(|()| sink.flush()) {
            tracing::warn!("failed to write activity log: {}", e);
        }
    }
}

fn format_line(timestamp: &str, message: &str) -> String {
    format!("{} - {}\n", timestamp, message)
}

/// In-memory log contents, shared with the [`ActivityLog`] that writes them.
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl MemoryLog {
    /// Everything written so far.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    /// Written lines, without trailing newlines.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    /// Messages with their timestamp prefix stripped.
    pub fn messages(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .map(|line| match line.split_once(" - ") {
                Some((_, message)) => message.to_string(),
                None => line,
            })
            .collect()
    }
}

impl Write for MemoryLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use tempfile::TempDir;

    #[test]
    fn test_line_has_timestamp_prefix() {
        let (log, buffer) = ActivityLog::in_memory();
        log.info("Performing initial scan...");

        let lines = buffer.lines();
        assert_eq!(lines.len(), 1);

        let (timestamp, message) = lines[0].split_once(" - ").unwrap();
        assert_eq!(timestamp.len(), 19);
        assert!(NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).is_ok());
        assert_eq!(message, "Performing initial scan...");
    }

    #[test]
    fn test_one_line_per_event() {
        let (log, buffer) = ActivityLog::in_memory();
        log.info("first");
        log.error("second");
        log.info("third");

        assert_eq!(buffer.messages(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_clones_share_sink() {
        let (log, buffer) = ActivityLog::in_memory();
        let other = log.clone();
        log.info("from original");
        other.info("from clone");

        assert_eq!(buffer.lines().len(), 2);
    }

    #[test]
    fn test_open_appends_to_existing_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("organizer.log");
        std::fs::write(&path, "2020-01-01 00:00:00 - earlier run\n").unwrap();

        let log = ActivityLog::open(&path).expect("Failed to open log");
        log.info("later run");
        drop(log);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "2020-01-01 00:00:00 - earlier run");
        assert!(lines[1].ends_with(" - later run"));
    }

    #[test]
    fn test_format_line() {
        assert_eq!(
            format_line("2025-11-09 14:30:52", "hello"),
            "2025-11-09 14:30:52 - hello\n"
        );
    }
}
