//! A single managed file: diff-aware install and backed-up removal.
use anyhow::{Context as _, Result};
use std::path::PathBuf;

use super::helpers::fs::{backup_file, copy_file, ensure_parent_dir, file_name};
use super::{Applicable, ItemStatus, Resource, classify, read_optional, read_source};
use crate::logging::{EntryStatus, LogEntry};

/// A source file mirrored to a destination under the target tree.
#[derive(Debug, Clone)]
pub struct ManagedFile {
    /// Read-only source.
    pub source: PathBuf,
    /// Destination the engine owns.
    pub dest: PathBuf,
    /// Label used in journal entries.
    pub label: String,
}

impl ManagedFile {
    /// Create a new managed file.
    #[must_use]
    pub fn new(source: PathBuf, dest: PathBuf, label: impl Into<String>) -> Self {
        Self {
            source,
            dest,
            label: label.into(),
        }
    }
}

impl Applicable for ManagedFile {
    fn description(&self) -> String {
        format!("{} -> {}", self.source.display(), self.dest.display())
    }

    /// Install `source` at `dest`.
    ///
    /// Absent destination: copy and report `installed`. Differing
    /// destination: back up, overwrite, report `updated`. Equal bytes:
    /// report `current` without writing.
    fn apply(&self) -> Result<LogEntry> {
        let src = read_source(&self.source)?;
        let existing = read_optional(&self.dest)?;
        match classify(&src, existing.as_deref()) {
            ItemStatus::Installed => Ok(LogEntry::current(&self.label)),
            ItemStatus::New => {
                ensure_parent_dir(&self.dest)?;
                copy_file(&self.source, &self.dest)?;
                Ok(LogEntry::installed(&self.label))
            }
            ItemStatus::Update => {
                let backup = backup_file(&self.dest)?;
                copy_file(&self.source, &self.dest)?;
                Ok(LogEntry::updated(format!(
                    "{} (backed up -> {})",
                    self.label,
                    file_name(&backup)
                )))
            }
        }
    }

    /// Back up and delete `dest`. Silent (`None`) when it does not exist.
    ///
    /// A symlink is backed up by content when it points at a file, then
    /// unlinked; its target is left alone.
    fn remove(&self) -> Result<Option<LogEntry>> {
        let Ok(meta) = self.dest.symlink_metadata() else {
            return Ok(None);
        };
        let is_link = meta.file_type().is_symlink();
        if !is_link && !meta.is_file() {
            return Ok(None);
        }
        let backup = if self.dest.is_file() {
            Some(backup_file(&self.dest)?)
        } else {
            None
        };
        std::fs::remove_file(&self.dest)
            .with_context(|| format!("removing {}", self.dest.display()))?;
        let detail = match (&backup, is_link) {
            (Some(b), false) => format!("backed up -> {}", file_name(b)),
            (Some(b), true) => format!("symlink, backed up -> {}", file_name(b)),
            (None, _) => "dangling symlink".to_string(),
        };
        Ok(Some(LogEntry::new(
            EntryStatus::Removed,
            format!("{} ({detail})", self.label),
        )))
    }
}

impl Resource for ManagedFile {
    fn current_state(&self) -> Result<ItemStatus> {
        super::classify_paths(&self.source, &self.dest)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture(src: &[u8]) -> (tempfile::TempDir, ManagedFile) {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src/a.md");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::write(&source, src).unwrap();
        let file = ManagedFile::new(source, dir.path().join("dst/rules/a.md"), "rules/a.md");
        (dir, file)
    }

    fn backups(file: &ManagedFile) -> Vec<PathBuf> {
        fs::read_dir(file.dest.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.to_string_lossy().contains(".bak."))
            .collect()
    }

    #[test]
    fn installs_when_absent_creating_parents() {
        let (_dir, file) = fixture(b"v1");
        let entry = file.apply().unwrap();
        assert_eq!(entry, LogEntry::installed("rules/a.md"));
        assert_eq!(fs::read(&file.dest).unwrap(), b"v1");
    }

    #[test]
    fn second_apply_is_current() {
        let (_dir, file) = fixture(b"v1");
        file.apply().unwrap();
        let entry = file.apply().unwrap();
        assert_eq!(entry.status, EntryStatus::Current);
        assert!(backups(&file).is_empty(), "no backup for an unchanged file");
    }

    #[test]
    fn update_backs_up_previous_bytes() {
        let (_dir, file) = fixture(b"v2");
        fs::create_dir_all(file.dest.parent().unwrap()).unwrap();
        fs::write(&file.dest, b"v1").unwrap();

        let entry = file.apply().unwrap();
        assert_eq!(entry.status, EntryStatus::Updated);
        assert!(entry.label.starts_with("rules/a.md (backed up -> a.md.bak."));
        assert_eq!(fs::read(&file.dest).unwrap(), b"v2");

        let baks = backups(&file);
        assert_eq!(baks.len(), 1);
        assert_eq!(fs::read(&baks[0]).unwrap(), b"v1");
    }

    #[test]
    fn remove_backs_up_then_deletes() {
        let (_dir, file) = fixture(b"v1");
        file.apply().unwrap();
        let entry = file.remove().unwrap().expect("entry for removed file");
        assert_eq!(entry.status, EntryStatus::Removed);
        assert!(!file.dest.exists());
        let baks = backups(&file);
        assert_eq!(fs::read(&baks[0]).unwrap(), b"v1");
    }

    #[cfg(unix)]
    #[test]
    fn remove_symlink_backs_up_content_and_unlinks() {
        let (dir, file) = fixture(b"v1");
        let outside = dir.path().join("outside.md");
        fs::write(&outside, b"linked").unwrap();
        fs::create_dir_all(file.dest.parent().unwrap()).unwrap();
        std::os::unix::fs::symlink(&outside, &file.dest).unwrap();

        let entry = file.remove().unwrap().expect("entry for removed symlink");

        assert_eq!(entry.status, EntryStatus::Removed);
        assert!(entry.label.starts_with("rules/a.md (symlink, backed up -> a.md.bak."));
        assert!(file.dest.symlink_metadata().is_err());
        assert_eq!(fs::read(&outside).unwrap(), b"linked");
        let baks = backups(&file);
        assert_eq!(fs::read(&baks[0]).unwrap(), b"linked");
    }

    #[cfg(unix)]
    #[test]
    fn remove_dangling_symlink_is_reported() {
        let (dir, file) = fixture(b"v1");
        fs::create_dir_all(file.dest.parent().unwrap()).unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.md"), &file.dest).unwrap();

        let entry = file.remove().unwrap().expect("entry for removed symlink");

        assert_eq!(entry.label, "rules/a.md (dangling symlink)");
        assert!(file.dest.symlink_metadata().is_err());
        assert!(backups(&file).is_empty());
    }

    #[test]
    fn remove_absent_is_silent() {
        let (_dir, file) = fixture(b"v1");
        assert!(file.remove().unwrap().is_none());
    }

    #[test]
    fn missing_source_is_error() {
        let (_dir, mut file) = fixture(b"v1");
        file.source = file.source.with_file_name("missing.md");
        assert!(file.apply().is_err());
        assert!(!file.dest.exists());
    }

    #[test]
    fn needs_change_tracks_state() {
        let (_dir, file) = fixture(b"v1");
        assert!(file.needs_change().unwrap());
        file.apply().unwrap();
        assert!(!file.needs_change().unwrap());
        assert_eq!(file.current_state().unwrap(), ItemStatus::Installed);
    }
}
