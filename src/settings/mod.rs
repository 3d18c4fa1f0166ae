//! Structured settings documents: tolerant reads, stable writes, and the
//! diff-aware merge of a template into the installed document.
pub mod merge;

use anyhow::{Context as _, Result};
use serde_json::{Map, Value};
use std::io;
use std::path::{Path, PathBuf};

pub use merge::{SettingsPolicy, merge, merge_settings};

use crate::logging::LogEntry;
use crate::resources::helpers::fs::{backup_file, ensure_parent_dir, file_name};

/// Outcome of reading a settings document from disk.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    /// No file at the path.
    Missing,
    /// The file parsed as a mapping.
    Parsed(Map<String, Value>),
    /// The file exists but is not a JSON mapping.
    Malformed(String),
}

/// Read a settings document without ever failing on its content.
///
/// # Errors
///
/// Returns an error only when an existing file cannot be read.
pub fn read_document(path: &Path) -> Result<Document> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Document::Missing),
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };
    Ok(match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Document::Parsed(map),
        Ok(other) => Document::Malformed(format!("expected an object, found {}", kind(&other))),
        Err(e) => Document::Malformed(e.to_string()),
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Write `value` as pretty JSON with a trailing newline, creating parents.
///
/// Key order is preserved as held in memory.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_document(path: &Path, value: &Value) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut text = serde_json::to_string_pretty(value).context("serializing settings")?;
    text.push('\n');
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}

/// Existing document loaded for a merge, with any recovery already journaled.
#[derive(Debug)]
pub struct Existing {
    /// Mapping to merge into; empty when missing or malformed.
    pub map: Map<String, Value>,
    /// `true` when the file existed and parsed with at least one key.
    pub has_content: bool,
}

/// Load `path` for merging. A malformed file is backed up and a `warning`
/// is pushed to `entries`; the merge then starts from an empty mapping.
///
/// # Errors
///
/// Returns an error if the file cannot be read or backed up.
pub fn load_existing(path: &Path, label: &str, entries: &mut Vec<LogEntry>) -> Result<Existing> {
    match read_document(path)? {
        Document::Missing => Ok(Existing {
            map: Map::new(),
            has_content: false,
        }),
        Document::Parsed(map) => {
            let has_content = !map.is_empty();
            Ok(Existing { map, has_content })
        }
        Document::Malformed(reason) => {
            let backup = backup_file(path)?;
            tracing::debug!("{}: {reason}", path.display());
            entries.push(LogEntry::warning(format!(
                "{label} (malformed JSON, backed up -> {})",
                file_name(&backup)
            )));
            Ok(Existing {
                map: Map::new(),
                has_content: false,
            })
        }
    }
}

/// Write `merged` over `path` unless it equals `existing`, journaling the result.
///
/// # Errors
///
/// Returns an error if the backup or the write fails.
pub fn commit(
    path: &Path,
    label: &str,
    existing: &Existing,
    merged: &Value,
    detail: Option<&str>,
) -> Result<LogEntry> {
    let suffix = detail.map_or_else(String::new, |d| format!(", {d}"));
    if merged.as_object() == Some(&existing.map) && path.exists() {
        return Ok(LogEntry::current(label));
    }
    if existing.has_content && path.exists() {
        let backup = backup_file(path)?;
        write_document(path, merged)?;
        return Ok(LogEntry::updated(format!(
            "{label} (backed up -> {}{suffix})",
            file_name(&backup)
        )));
    }
    write_document(path, merged)?;
    Ok(match detail {
        Some(d) => LogEntry::installed(format!("{label} ({d})")),
        None => LogEntry::installed(label),
    })
}

/// Merge of the settings template into the installed settings document.
#[derive(Debug, Clone)]
pub struct SettingsMerge {
    /// Template document in the source tree.
    pub template: PathBuf,
    /// Installed document.
    pub dest: PathBuf,
    /// Label used in journal entries.
    pub label: String,
    /// Authoritative keys.
    pub policy: SettingsPolicy,
    /// Model identifier to force, if any.
    pub model: Option<String>,
}

impl SettingsMerge {
    /// Load the template, merge, and write if anything changed.
    ///
    /// An unreadable or malformed template produces a single `warning` and
    /// leaves the installed document untouched.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure against the installed document.
    pub fn apply(&self) -> Result<Vec<LogEntry>> {
        let template = match self.load_template() {
            Ok(t) => t,
            Err(reason) => {
                return Ok(vec![LogEntry::warning(format!(
                    "{} (failed to read template: {reason})",
                    self.label
                ))]);
            }
        };
        let mut entries = Vec::new();
        let existing = load_existing(&self.dest, &self.label, &mut entries)?;
        let merged = merge_settings(
            &template,
            &Value::Object(existing.map.clone()),
            &self.policy,
            self.model.as_deref(),
        );
        entries.push(commit(&self.dest, &self.label, &existing, &merged, None)?);
        Ok(entries)
    }

    /// Parsed template, or a message explaining why it is unusable.
    fn load_template(&self) -> std::result::Result<Value, String> {
        match read_document(&self.template) {
            Ok(Document::Parsed(map)) => Ok(Value::Object(map)),
            Ok(Document::Missing) => Err("not found".to_string()),
            Ok(Document::Malformed(reason)) => Err(reason),
            Err(e) => Err(format!("{e:#}")),
        }
    }

    /// Parsed template mapping, if readable. Used for checks that inspect
    /// template values without merging.
    #[must_use]
    pub fn template_value(&self) -> Option<Value> {
        self.load_template().ok()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::EntryStatus;
    use serde_json::json;
    use std::fs;

    fn fixture(template: &str) -> (tempfile::TempDir, SettingsMerge) {
        let dir = tempfile::tempdir().unwrap();
        let tpl = dir.path().join("template.json");
        fs::write(&tpl, template).unwrap();
        let merge = SettingsMerge {
            template: tpl,
            dest: dir.path().join("target/settings.json"),
            label: "~/.claude/settings.json".to_string(),
            policy: SettingsPolicy::default(),
            model: None,
        };
        (dir, merge)
    }

    fn read(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn read_document_variants() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("s.json");
        assert_eq!(read_document(&p).unwrap(), Document::Missing);
        fs::write(&p, "{\"a\": 1}").unwrap();
        assert!(matches!(read_document(&p).unwrap(), Document::Parsed(_)));
        fs::write(&p, "{not json").unwrap();
        assert!(matches!(read_document(&p).unwrap(), Document::Malformed(_)));
        fs::write(&p, "[1, 2]").unwrap();
        assert!(matches!(read_document(&p).unwrap(), Document::Malformed(m) if m.contains("array")));
    }

    #[test]
    fn write_document_is_pretty_with_newline_and_ordered() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("nested/s.json");
        write_document(&p, &json!({"z": 1, "a": 2})).unwrap();
        let text = fs::read_to_string(&p).unwrap();
        assert!(text.ends_with("}\n"));
        insta::assert_snapshot!(text.trim_end(), @r#"
        {
          "z": 1,
          "a": 2
        }
        "#);
    }

    #[test]
    fn fresh_install_writes_template() {
        let (_dir, merge) = fixture(r#"{"env": {"A": "1"}}"#);
        let entries = merge.apply().unwrap();
        assert_eq!(entries, vec![LogEntry::installed("~/.claude/settings.json")]);
        assert_eq!(read(&merge.dest), json!({"env": {"A": "1"}}));
    }

    #[test]
    fn unchanged_document_is_current() {
        let (_dir, merge) = fixture(r#"{"env": {"A": "1"}}"#);
        merge.apply().unwrap();
        let entries = merge.apply().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, EntryStatus::Current);
    }

    #[test]
    fn changed_document_is_backed_up() {
        let (dir, merge) = fixture(r#"{"permissions": {"allow": ["Read", "Grep"]}}"#);
        fs::create_dir_all(merge.dest.parent().unwrap()).unwrap();
        let before = r#"{"permissions": {"allow": ["Read"]}}"#;
        fs::write(&merge.dest, before).unwrap();

        let entries = merge.apply().unwrap();
        assert_eq!(entries[0].status, EntryStatus::Updated);
        assert_eq!(read(&merge.dest)["permissions"]["allow"], json!(["Read", "Grep"]));

        let backup = fs::read_dir(dir.path().join("target"))
            .unwrap()
            .map(|e| e.unwrap().path())
            .find(|p| p.to_string_lossy().contains(".bak."))
            .expect("backup written");
        assert_eq!(fs::read_to_string(backup).unwrap(), before);
    }

    #[test]
    fn malformed_existing_warns_and_recovers() {
        let (_dir, merge) = fixture(r#"{"env": {"A": "1"}}"#);
        fs::create_dir_all(merge.dest.parent().unwrap()).unwrap();
        fs::write(&merge.dest, "{broken").unwrap();

        let entries = merge.apply().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].status, EntryStatus::Warning);
        assert!(entries[0].label.contains("malformed JSON"));
        assert_eq!(entries[1].status, EntryStatus::Installed);
        assert_eq!(read(&merge.dest), json!({"env": {"A": "1"}}));
    }

    #[test]
    fn unreadable_template_warns_without_writing() {
        let (_dir, merge) = fixture("{oops");
        let entries = merge.apply().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, EntryStatus::Warning);
        assert!(!merge.dest.exists());
    }

    #[test]
    fn model_is_forced() {
        let (_dir, mut merge) = fixture(r#"{"model": "template-model"}"#);
        merge.model = Some("chosen".to_string());
        fs::create_dir_all(merge.dest.parent().unwrap()).unwrap();
        fs::write(&merge.dest, r#"{"model": "user-model"}"#).unwrap();
        merge.apply().unwrap();
        assert_eq!(read(&merge.dest)["model"], "chosen");
    }
}
