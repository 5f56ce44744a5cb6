//! Daily access log.
//!
//! One line per completed request, appended to a file named after the
//! current local date:
//!
//! ```text
//! logs/2026_10_16.request.log
//! 10.0.0.7 - - [16/Oct/2026:14:03:11 +0200] "GET /index.html HTTP/1.0" 200 37
//! ```
//!
//! The file is picked from the entry's own timestamp, taken when the request
//! completes, not when the server starts, so a long-running process rolls
//! over to a new file at midnight and a line always lands in the file for
//! the date it shows.

use std::fmt;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Local, NaiveDate};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

const LOG_FILE_SUFFIX: &str = ".request.log";

/// A single access-log record.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub client: IpAddr,
    pub timestamp: DateTime<Local>,
    pub request_line: String,
    pub status: u16,
    pub bytes_sent: u64,
}

impl LogEntry {
    /// Creates an entry stamped with the current local time.
    pub fn now(client: IpAddr, request_line: impl Into<String>, status: u16, bytes_sent: u64) -> Self {
        Self {
            client,
            timestamp: Local::now(),
            request_line: request_line.into(),
            status,
            bytes_sent,
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - - [{}] \"{}\" {} {}",
            self.client,
            self.timestamp.format("%d/%b/%Y:%H:%M:%S %z"),
            self.request_line,
            self.status,
            self.bytes_sent
        )
    }
}

/// Appends entries to date-named files under one directory.
///
/// Appends are serialized through an async mutex, so concurrent connection
/// tasks never interleave partial lines.
#[derive(Debug)]
pub struct AccessLog {
    directory: PathBuf,
    write_lock: Mutex<()>,
}

impl AccessLog {
    /// Opens the log directory, creating it if absent.
    pub fn open(directory: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let directory = directory.into();
        std::fs::create_dir_all(&directory)
            .with_context(|| format!("creating log directory {}", directory.display()))?;

        Ok(Self {
            directory,
            write_lock: Mutex::new(()),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the log file for `date`.
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.directory
            .join(format!("{}{}", date.format("%Y_%m_%d"), LOG_FILE_SUFFIX))
    }

    /// Appends `entry` to the file for the date of its timestamp.
    pub async fn append(&self, entry: &LogEntry) -> anyhow::Result<()> {
        self.append_on(entry.timestamp.date_naive(), entry).await
    }

    /// Appends `entry` to the file for `date`.
    pub async fn append_on(&self, date: NaiveDate, entry: &LogEntry) -> anyhow::Result<()> {
        let path = self.path_for(date);
        let line = format!("{entry}\n");

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("opening access log {}", path.display()))?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }

    /// Appends `entry`, reporting a failure on the diagnostic channel instead
    /// of to the caller.
    pub async fn record(&self, entry: LogEntry) {
        if let Err(e) = self.append(&entry).await {
            tracing::error!(error = %e, "failed to write access log entry");
        }
    }
}
