//! Core logging types: journal entries, their status, and the [`Log`] trait.
use std::fmt;

use serde::Serialize;

/// Outcome recorded for one touched (or deliberately untouched) target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// A file that did not exist was written.
    Installed,
    /// An existing file was backed up and overwritten.
    Updated,
    /// An existing file was backed up and deleted.
    Removed,
    /// The target already matched; nothing was written.
    Current,
    /// The target was deliberately left alone.
    Skipped,
    /// A pre-mutation snapshot was captured.
    Snapshot,
    /// A file was written back from a snapshot.
    Restored,
    /// A recoverable problem was found and worked around.
    Warning,
}

impl EntryStatus {
    /// All statuses, in summary order.
    pub const ALL: [Self; 8] = [
        Self::Installed,
        Self::Updated,
        Self::Removed,
        Self::Current,
        Self::Skipped,
        Self::Snapshot,
        Self::Restored,
        Self::Warning,
    ];

    /// Lowercase token used in JSON output and the log file.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Installed => "installed",
            Self::Updated => "updated",
            Self::Removed => "removed",
            Self::Current => "current",
            Self::Skipped => "skipped",
            Self::Snapshot => "snapshot",
            Self::Restored => "restored",
            Self::Warning => "warning",
        }
    }

    /// Fixed-width console badge.
    #[must_use]
    pub const fn badge(self) -> &'static str {
        match self {
            Self::Installed => "+  INSTALLED",
            Self::Updated => "~  UPDATED  ",
            Self::Removed => "-  REMOVED  ",
            Self::Current => "=  CURRENT  ",
            Self::Skipped => ".  SKIPPED  ",
            Self::Snapshot => "*  SNAPSHOT ",
            Self::Restored => "<  RESTORED ",
            Self::Warning => "!  WARNING  ",
        }
    }

    /// ANSI colour prefix for the console badge.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Installed | Self::Restored => "\x1b[32m",
            Self::Updated | Self::Warning => "\x1b[33m",
            Self::Removed => "\x1b[31m",
            Self::Current | Self::Skipped => "\x1b[90m",
            Self::Snapshot => "\x1b[36m",
        }
    }

    /// Word used in the one-line run summary.
    #[must_use]
    pub const fn summary_word(self) -> &'static str {
        match self {
            Self::Current => "unchanged",
            Self::Warning => "warnings",
            Self::Snapshot => "snapshots",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the run journal. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    /// What happened.
    pub status: EntryStatus,
    /// Human-readable target, e.g. `~/.claude/rules/security.md`.
    pub label: String,
}

impl LogEntry {
    /// Create an entry.
    #[must_use]
    pub fn new(status: EntryStatus, label: impl Into<String>) -> Self {
        Self {
            status,
            label: label.into(),
        }
    }

    /// Shorthand for an `installed` entry.
    #[must_use]
    pub fn installed(label: impl Into<String>) -> Self {
        Self::new(EntryStatus::Installed, label)
    }

    /// Shorthand for an `updated` entry.
    #[must_use]
    pub fn updated(label: impl Into<String>) -> Self {
        Self::new(EntryStatus::Updated, label)
    }

    /// Shorthand for a `current` entry.
    #[must_use]
    pub fn current(label: impl Into<String>) -> Self {
        Self::new(EntryStatus::Current, label)
    }

    /// Shorthand for a `skipped` entry.
    #[must_use]
    pub fn skipped(label: impl Into<String>) -> Self {
        Self::new(EntryStatus::Skipped, label)
    }

    /// Shorthand for a `warning` entry.
    #[must_use]
    pub fn warning(label: impl Into<String>) -> Self {
        Self::new(EntryStatus::Warning, label)
    }
}

/// Count entries per status, in [`EntryStatus::ALL`] order, omitting zeros.
#[must_use]
pub fn status_counts(entries: &[LogEntry]) -> Vec<(EntryStatus, usize)> {
    EntryStatus::ALL
        .iter()
        .map(|&s| (s, entries.iter().filter(|e| e.status == s).count()))
        .filter(|&(_, n)| n > 0)
        .collect()
}

/// Abstraction over logging backends.
///
/// The engine logs through this trait so it never depends on how (or
/// whether) output reaches a terminal.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Present a journal entry as it is appended.
    fn entry(&self, entry: &LogEntry);
}
