//! Project-level auto-approve permissions in `<project>/.claude/settings.json`.
use anyhow::Result;
use serde_json::Value;
use std::path::PathBuf;

use crate::logging::LogEntry;
use crate::settings::merge::{PERMISSIONS, array_entry, object_entry, union_into};
use crate::settings::{commit, load_existing};

/// Permission list key the project permissions are added to.
const ALLOW: &str = "allow";

/// Auto-approve permissions unioned into a project settings document.
#[derive(Debug, Clone)]
pub struct ProjectPermissions {
    /// Project settings document.
    pub path: PathBuf,
    /// Permissions to grant.
    pub allow: Vec<String>,
    /// Label used in journal entries.
    pub label: String,
}

impl ProjectPermissions {
    /// Add every missing permission to `permissions.allow`.
    ///
    /// Reports `current` when all are already present. Existing entries and
    /// unrelated keys are kept. A malformed document is backed up, reported
    /// with a `warning`, and replaced.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure.
    pub fn apply(&self) -> Result<Vec<LogEntry>> {
        let mut entries = Vec::new();
        let existing = load_existing(&self.path, &self.label, &mut entries)?;

        let mut merged = existing.map.clone();
        let wanted: Vec<Value> = self.allow.iter().cloned().map(Value::String).collect();
        let added = object_entry(&mut merged, PERMISSIONS)
            .and_then(|perms| array_entry(perms, ALLOW))
            .map_or(0, |list| union_into(list, &wanted));

        if added == 0 && self.path.exists() && existing.map == merged {
            entries.push(LogEntry::current(format!(
                "{} (permissions already present)",
                self.label
            )));
            return Ok(entries);
        }

        let detail = if existing.has_content {
            format!("added {added} permissions")
        } else {
            "auto-approve read".to_string()
        };
        entries.push(commit(
            &self.path,
            &self.label,
            &existing,
            &Value::Object(merged),
            Some(&detail),
        )?);
        Ok(entries)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::EntryStatus;
    use serde_json::json;
    use std::fs;

    fn fresh_document(allow: &[String]) -> Value {
        json!({ "permissions": { "allow": allow } })
    }

    fn fixture() -> (tempfile::TempDir, ProjectPermissions) {
        let dir = tempfile::tempdir().unwrap();
        let perms = ProjectPermissions {
            path: dir.path().join(".claude/settings.json"),
            allow: vec!["Read".to_string(), "Grep".to_string()],
            label: ".claude/settings.json".to_string(),
        };
        (dir, perms)
    }

    fn read(perms: &ProjectPermissions) -> Value {
        serde_json::from_str(&fs::read_to_string(&perms.path).unwrap()).unwrap()
    }

    #[test]
    fn creates_document_when_missing() {
        let (_dir, perms) = fixture();
        let entries = perms.apply().unwrap();
        assert_eq!(
            entries,
            vec![LogEntry::installed(".claude/settings.json (auto-approve read)")]
        );
        assert_eq!(read(&perms), fresh_document(&perms.allow));
    }

    #[test]
    fn second_run_is_current() {
        let (_dir, perms) = fixture();
        perms.apply().unwrap();
        let entries = perms.apply().unwrap();
        assert_eq!(entries[0].status, EntryStatus::Current);
        assert!(entries[0].label.contains("already present"));
    }

    #[test]
    fn unions_into_existing_document() {
        let (_dir, perms) = fixture();
        fs::create_dir_all(perms.path.parent().unwrap()).unwrap();
        fs::write(
            &perms.path,
            r#"{"permissions": {"allow": ["Bash(make:*)", "Read"]}, "other": true}"#,
        )
        .unwrap();
        let entries = perms.apply().unwrap();
        assert_eq!(entries[0].status, EntryStatus::Updated);
        assert!(entries[0].label.contains("added 1 permissions"));
        let doc = read(&perms);
        assert_eq!(doc["permissions"]["allow"], json!(["Bash(make:*)", "Read", "Grep"]));
        assert_eq!(doc["other"], true);
    }

    #[test]
    fn malformed_document_is_replaced_with_warning() {
        let (_dir, perms) = fixture();
        fs::create_dir_all(perms.path.parent().unwrap()).unwrap();
        fs::write(&perms.path, "nope").unwrap();
        let entries = perms.apply().unwrap();
        assert_eq!(entries[0].status, EntryStatus::Warning);
        assert_eq!(entries[1].status, EntryStatus::Installed);
        assert_eq!(read(&perms), fresh_document(&perms.allow));
    }
}
