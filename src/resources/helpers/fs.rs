//! File-system resource helpers.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

/// Timestamp format shared by backups and snapshot ids.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Current local time formatted as `YYYYMMDD-HHMMSS`.
#[must_use]
pub fn timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Copy `src` to `dst`, carrying over permissions and modification time.
///
/// # Errors
///
/// Returns an error if the copy fails. Timestamp propagation is best effort.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    std::fs::copy(src, dst)
        .with_context(|| format!("copying {} to {}", src.display(), dst.display()))?;
    if let Ok(meta) = std::fs::metadata(src) {
        let atime = filetime::FileTime::from_last_access_time(&meta);
        let mtime = filetime::FileTime::from_last_modification_time(&meta);
        filetime::set_file_times(dst, atime, mtime).ok();
    }
    Ok(())
}

/// Sibling backup path `<name>.bak.<ts>` for `path`.
///
/// When a backup with that name already exists (two backups within one
/// second) a numeric suffix is appended so no earlier backup is overwritten.
#[must_use]
pub fn backup_path(path: &Path, ts: &str) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
    let base = path.with_file_name(format!("{name}.bak.{ts}"));
    if base.symlink_metadata().is_err() {
        return base;
    }
    (1u32..)
        .map(|n| path.with_file_name(format!("{name}.bak.{ts}.{n}")))
        .find(|p| p.symlink_metadata().is_err())
        .unwrap_or(base)
}

/// Copy `path` to a timestamped sibling and return the backup's path.
///
/// # Errors
///
/// Returns an error if the backup cannot be written.
pub fn backup_file(path: &Path) -> Result<PathBuf> {
    let backup = backup_path(path, &timestamp());
    copy_file(path, &backup).with_context(|| format!("backing up {}", path.display()))?;
    Ok(backup)
}

/// File name of a path for log labels.
#[must_use]
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

/// Return `true` if `path` is a regular file and not a symlink.
#[must_use]
pub fn is_regular_file(path: &Path) -> bool {
    path.symlink_metadata().is_ok_and(|m| m.file_type().is_file())
}

/// Recursively collect regular files under `dir`, sorted by path.
///
/// Symlinks are never followed or returned. A missing directory yields an
/// empty list.
///
/// # Errors
///
/// Returns an error if an existing directory cannot be read.
pub fn collect_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !dir.symlink_metadata().is_ok_and(|m| m.is_dir()) {
        return Ok(files);
    }
    collect_into(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_into(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in
        std::fs::read_dir(dir).with_context(|| format!("reading directory {}", dir.display()))?
    {
        let entry = entry.with_context(|| format!("reading entry in {}", dir.display()))?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("inspecting {}", entry.path().display()))?;
        if file_type.is_dir() {
            collect_into(&entry.path(), files)?;
        } else if file_type.is_file() {
            files.push(entry.path());
        }
    }
    Ok(())
}
