//! Lightweight metadata read from the head of a markdown document.
use std::io::Read as _;
use std::path::Path;

/// Bytes read from the start of a file when extracting metadata.
pub const HEADER_LIMIT: u64 = 16 * 1024;

/// Metadata of one catalog item. Every field degrades to a default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// First markdown heading, without the leading `#`s.
    pub heading: Option<String>,
    /// `description:` front-matter field, or empty.
    pub description: String,
    /// `model:` front-matter field, if non-empty.
    pub model: Option<String>,
}

/// Read and parse the bounded header region of `path`.
///
/// Unreadable files yield default metadata.
#[must_use]
pub fn read(path: &Path) -> Metadata {
    let mut buf = Vec::new();
    let read = std::fs::File::open(path)
        .and_then(|f| f.take(HEADER_LIMIT).read_to_end(&mut buf));
    match read {
        Ok(_) => parse(&String::from_utf8_lossy(&buf)),
        Err(e) => {
            tracing::debug!("metadata unavailable for {}: {e}", path.display());
            Metadata::default()
        }
    }
}

/// Parse metadata from document text.
///
/// A leading block delimited by `---` lines is scanned for `description:`
/// and `model:`. The heading is the first line starting with `#` after
/// that block.
#[must_use]
pub fn parse(text: &str) -> Metadata {
    let mut meta = Metadata::default();
    let mut lines = text.lines().peekable();

    if lines.peek().is_some_and(|l| l.trim() == "---") {
        lines.next();
        for line in lines.by_ref() {
            if line.trim() == "---" {
                break;
            }
            if let Some(value) = field(line, "description") {
                meta.description = value.to_string();
            } else if let Some(value) = field(line, "model")
                && !value.is_empty()
            {
                meta.model = Some(value.to_string());
            }
        }
    }

    meta.heading = lines
        .find(|l| l.starts_with('#'))
        .map(|l| l.trim_start_matches('#').trim().to_string())
        .filter(|h| !h.is_empty());
    meta
}

fn field<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    line.strip_prefix(name)?.strip_prefix(':').map(str::trim)
}
