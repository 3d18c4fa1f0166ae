//! Structured logger backed by `tracing`.
use std::path::PathBuf;

use super::subscriber::{ENTRY_TARGET, STAGE_TARGET};
use super::types::{Log, LogEntry, status_counts};
use super::utils::log_file_path;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger.
///
/// All messages are written to a persistent log file at
/// `$XDG_CACHE_HOME/dotai/<command>.log` (default `~/.cache/dotai/<command>.log`)
/// with timestamps and ANSI codes stripped, regardless of the verbose flag.
#[derive(Debug)]
pub struct Logger {
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger.
    ///
    /// Stores the log file path for display in the run summary. The file
    /// itself is created by [`init_subscriber`](super::init_subscriber).
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            log_file: log_file_path(command),
        }
    }

    /// Create a logger that never reports a log file.
    ///
    /// Events still flow through whatever `tracing` dispatcher is active.
    #[must_use]
    pub const fn ephemeral() -> Self {
        Self { log_file: None }
    }

    /// Return the log file path, if available.
    #[must_use]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Present a journal entry.
    pub fn entry(&self, entry: &LogEntry) {
        tracing::info!(target: ENTRY_TARGET, status = entry.status.as_str(), "{}", entry.label);
    }

    /// Print the one-line summary of a finished run.
    pub fn print_summary(&self, entries: &[LogEntry]) {
        if entries.is_empty() {
            self.info("nothing to do");
        } else {
            let parts: Vec<String> = status_counts(entries)
                .into_iter()
                .map(|(status, n)| {
                    format!("{}{n} {}\x1b[0m", status.color(), status.summary_word())
                })
                .collect();
            self.info(&parts.join(", "));
        }
        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error);

    fn entry(&self, entry: &LogEntry) {
        self.entry(entry);
    }
}
