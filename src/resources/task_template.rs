//! Task templates that never clobber a file the user has started filling in.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::Applicable;
use super::helpers::fs::is_regular_file;
use super::managed_file::ManagedFile;
use crate::logging::LogEntry;

/// A task template (e.g. `lessons.md`) installed next to the user's work.
#[derive(Debug, Clone)]
pub struct TaskTemplate {
    file: ManagedFile,
}

impl TaskTemplate {
    /// Create a template resource.
    #[must_use]
    pub fn new(source: PathBuf, dest: PathBuf, label: impl Into<String>) -> Self {
        Self {
            file: ManagedFile::new(source, dest, label),
        }
    }
}

impl Applicable for TaskTemplate {
    fn description(&self) -> String {
        format!("task template {}", self.file.dest.display())
    }

    fn apply(&self) -> Result<LogEntry> {
        if has_content(&self.file.dest)? {
            return Ok(LogEntry::skipped(format!("{} (has content)", self.file.label)));
        }
        if !is_regular_file(&self.file.source) {
            return Ok(LogEntry::warning(format!(
                "{} (template not found)",
                self.file.label
            )));
        }
        self.file.apply()
    }
}

/// Return `true` if `path` holds anything besides blank lines, markdown
/// headings, and HTML comments.
///
/// # Errors
///
/// Returns an error if an existing file cannot be read.
pub fn has_content(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(text_has_content(&String::from_utf8_lossy(&bytes)))
}

fn text_has_content(text: &str) -> bool {
    strip_html_comments(text)
        .lines()
        .map(str::trim)
        .any(|line| !line.is_empty() && !line.starts_with('#'))
}

fn strip_html_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("<!--") {
        let (before, after) = rest.split_at(start);
        out.push_str(before);
        match after.find("-->") {
            Some(end) => rest = after.get(end + 3..).unwrap_or_default(),
            None => {
                // Unterminated comments are kept as text.
                rest = after;
                break;
            }
        }
    }
    out.push_str(rest);
    out
}
