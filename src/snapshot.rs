//! Timestamped snapshots of the managed subset of the target tree.
//!
//! A snapshot is a directory `backups/<YYYYMMDD-HHMMSS>/` holding copies of
//! the managed files under their target-relative paths. Later snapshots in
//! the same second append `-1`, `-2`, ... to the id. Snapshots are never
//! modified after creation and never deleted by the engine.
use anyhow::{Context as _, Result};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::config::{BACKUPS_DIR, MANAGED_DIRS, MANAGED_FILES};
use crate::error::SnapshotError;
use crate::logging::{EntryStatus, LogEntry};
use crate::resources::helpers::fs::{
    backup_file, collect_files, copy_file, ensure_parent_dir, is_regular_file, timestamp,
};
use crate::resources::{ItemStatus, classify, read_optional};

/// A snapshot on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Timestamp id, also the directory name.
    pub id: String,
    /// Snapshot directory.
    pub path: PathBuf,
}

impl Snapshot {
    /// Files held by the snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot directory cannot be read.
    pub fn files(&self) -> Result<Vec<PathBuf>> {
        collect_files(&self.path)
    }
}

/// Return `true` if `name` has the `YYYYMMDD-HHMMSS` shape, optionally
/// followed by `-<n>` for later snapshots taken within the same second.
#[must_use]
pub fn is_snapshot_id(name: &str) -> bool {
    let Some((stamp, seq)) = name.split_at_checked(15) else {
        return false;
    };
    let stamp_ok = stamp
        .bytes()
        .enumerate()
        .all(|(i, b)| if i == 8 { b == b'-' } else { b.is_ascii_digit() });
    stamp_ok
        && (seq.is_empty()
            || seq
                .strip_prefix('-')
                .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit())))
}

/// Sort key of a snapshot id: timestamp, then same-second sequence.
fn id_key(id: &str) -> (&str, u64) {
    match id.split_at_checked(15) {
        Some((stamp, seq)) => (
            stamp,
            seq.strip_prefix('-')
                .and_then(|n| n.parse().ok())
                .unwrap_or(0),
        ),
        None => (id, 0),
    }
}

/// Resolve `relative` under `root`, refusing anything that could land
/// outside it.
///
/// Rejects absolute paths and `..` components outright, then canonicalizes
/// the deepest existing ancestor of the candidate so symlinked directories
/// inside the root cannot redirect the write elsewhere.
#[must_use]
pub fn resolve_within(root: &Path, relative: &Path) -> Option<PathBuf> {
    if relative.as_os_str().is_empty()
        || relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return None;
    }
    let canonical_root = dunce::canonicalize(root).ok()?;
    let candidate = root.join(relative);
    let mut probe = candidate.as_path();
    while probe.symlink_metadata().is_err() {
        probe = probe.parent()?;
    }
    let resolved = dunce::canonicalize(probe).ok()?;
    resolved.starts_with(&canonical_root).then_some(candidate)
}

/// Creates, lists, and restores snapshots for one target root.
#[derive(Debug, Clone)]
pub struct SnapshotManager {
    target_root: PathBuf,
    backups: PathBuf,
    label_root: String,
}

impl SnapshotManager {
    /// Manager for `target_root`; `label_root` prefixes journal labels
    /// (e.g. `~/.claude`).
    #[must_use]
    pub fn new(target_root: &Path, label_root: impl Into<String>) -> Self {
        Self {
            target_root: target_root.to_path_buf(),
            backups: target_root.join(BACKUPS_DIR),
            label_root: label_root.into(),
        }
    }

    /// Snapshot root directory.
    #[must_use]
    pub fn backups_dir(&self) -> &Path {
        &self.backups
    }

    fn label(&self, relative: &Path) -> String {
        let rel = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/{rel}", self.label_root)
    }

    /// Currently installed managed files: the top-level managed documents
    /// and every regular file under the managed sub-directories.
    ///
    /// # Errors
    ///
    /// Returns an error if a managed directory cannot be read.
    pub fn managed_files(&self) -> Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = MANAGED_FILES
            .iter()
            .map(|name| self.target_root.join(name))
            .filter(|p| is_regular_file(p))
            .collect();
        for dir in MANAGED_DIRS {
            files.extend(collect_files(&self.target_root.join(dir))?);
        }
        Ok(files)
    }

    /// Capture the managed files into a new snapshot.
    ///
    /// Returns `None` without creating anything when the target root is
    /// absent or holds no managed files. Every call gets a directory of its
    /// own: a second snapshot within the same second is `<timestamp>-1`,
    /// then `-2`, and so on.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot directory cannot be created or a
    /// file cannot be copied.
    pub fn create(&self) -> Result<Option<Snapshot>> {
        if !self.target_root.is_dir() {
            return Ok(None);
        }
        let files = self.managed_files()?;
        if files.is_empty() {
            return Ok(None);
        }

        let snapshot = self.claim(&timestamp())?;
        for file in &files {
            let rel = file
                .strip_prefix(&self.target_root)
                .with_context(|| format!("{} is outside the target root", file.display()))?;
            let dest = snapshot.path.join(rel);
            ensure_parent_dir(&dest)?;
            copy_file(file, &dest)?;
        }
        tracing::debug!("snapshot {} captured {} files", snapshot.id, files.len());
        Ok(Some(snapshot))
    }

    /// Create a fresh, empty snapshot directory for `stamp`.
    fn claim(&self, stamp: &str) -> Result<Snapshot> {
        std::fs::create_dir_all(&self.backups)
            .with_context(|| format!("creating {}", self.backups.display()))?;
        let mut id = stamp.to_string();
        let mut seq = 0_u64;
        loop {
            let path = self.backups.join(&id);
            match std::fs::create_dir(&path) {
                Ok(()) => return Ok(Snapshot { id, path }),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    seq += 1;
                    id = format!("{stamp}-{seq}");
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("creating {}", path.display()));
                }
            }
        }
    }

    /// Snapshots on disk, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backups directory exists but cannot be read.
    pub fn discover(&self) -> Result<Vec<Snapshot>> {
        if !self.backups.is_dir() {
            return Ok(Vec::new());
        }
        let mut snapshots = Vec::new();
        for entry in std::fs::read_dir(&self.backups)
            .with_context(|| format!("reading {}", self.backups.display()))?
        {
            let entry = entry?;
            let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_dir && is_snapshot_id(&name) {
                snapshots.push(Snapshot {
                    path: entry.path(),
                    id: name,
                });
            }
        }
        snapshots.sort_by(|a, b| id_key(&b.id).cmp(&id_key(&a.id)));
        Ok(snapshots)
    }

    /// Select the snapshot with `id`, or the newest when `id` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::NoSnapshots`] when there are none, or
    /// [`SnapshotError::NotFound`] for an unknown id.
    pub fn select(&self, id: Option<&str>) -> Result<Snapshot> {
        let mut snapshots = self.discover()?;
        if snapshots.is_empty() {
            return Err(SnapshotError::NoSnapshots {
                dir: self.backups.clone(),
            }
            .into());
        }
        match id {
            None => Ok(snapshots.swap_remove(0)),
            Some(id) => match snapshots.iter().position(|s| s.id == id) {
                Some(i) => Ok(snapshots.swap_remove(i)),
                None => Err(SnapshotError::NotFound {
                    id: id.to_string(),
                    available: snapshots.into_iter().map(|s| s.id).collect(),
                }
                .into()),
            },
        }
    }

    /// Write every file of `snapshot` back under the target root.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read, backed up, or written.
    pub fn restore(&self, snapshot: &Snapshot) -> Result<Vec<LogEntry>> {
        let mut entries = Vec::new();
        for file in snapshot.files()? {
            let rel = file
                .strip_prefix(&snapshot.path)
                .with_context(|| format!("{} is outside the snapshot", file.display()))?;
            if let Some(entry) = self.restore_file(rel, &file)? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    /// Restore one snapshot file to `relative` under the target root.
    ///
    /// Returns `None` when `relative` would resolve outside the target root;
    /// such entries are skipped without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, backed up, or written.
    pub fn restore_file(&self, relative: &Path, source: &Path) -> Result<Option<LogEntry>> {
        let Some(dest) = resolve_within(&self.target_root, relative) else {
            tracing::debug!("skipping {}: resolves outside target root", relative.display());
            return Ok(None);
        };
        let label = self.label(relative);
        let wanted =
            std::fs::read(source).with_context(|| format!("reading {}", source.display()))?;
        let existing = read_optional(&dest)?;
        match classify(&wanted, existing.as_deref()) {
            ItemStatus::Installed => Ok(Some(LogEntry::current(label))),
            status => {
                if status == ItemStatus::Update {
                    backup_file(&dest)?;
                }
                ensure_parent_dir(&dest)?;
                copy_file(source, &dest)?;
                Ok(Some(LogEntry::new(EntryStatus::Restored, label)))
            }
        }
    }
}
