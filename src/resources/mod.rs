//! Idempotent resource primitives (check + apply pattern).
pub mod helpers;
pub mod managed_file;
pub mod permissions;
pub mod task_template;

use std::fmt;
use std::io;
use std::path::Path;

use anyhow::{Context as _, Result};

use crate::error::CatalogError;
use crate::logging::LogEntry;

/// Installation status of a source item relative to its destination.
///
/// Derived on every classification pass and never persisted.
///
/// # Examples
///
/// ```
/// use dotai::resources::{ItemStatus, classify};
///
/// assert_eq!(classify(b"a", None), ItemStatus::New);
/// assert_eq!(classify(b"a", Some(b"a")), ItemStatus::Installed);
/// assert_eq!(classify(b"a", Some(b"b")), ItemStatus::Update);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemStatus {
    /// No destination file.
    New,
    /// Destination bytes equal source bytes.
    Installed,
    /// Destination exists and differs.
    Update,
}

impl ItemStatus {
    /// Badge shown next to catalog items.
    #[must_use]
    pub const fn badge(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Installed => "UP TO DATE",
            Self::Update => "UPDATE",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::New => "new",
            Self::Installed => "installed",
            Self::Update => "update",
        })
    }
}

/// Classify a source buffer against an optional destination buffer.
#[must_use]
pub fn classify(source: &[u8], destination: Option<&[u8]>) -> ItemStatus {
    match destination {
        None => ItemStatus::New,
        Some(dest) if dest == source => ItemStatus::Installed,
        Some(_) => ItemStatus::Update,
    }
}

/// Classify two paths by reading their current bytes.
///
/// # Errors
///
/// Returns [`CatalogError::Unreadable`] if the source cannot be read, or an
/// I/O error if an existing destination cannot be read.
pub fn classify_paths(source: &Path, destination: &Path) -> Result<ItemStatus> {
    let src = read_source(source)?;
    let dest = read_optional(destination)?;
    Ok(classify(&src, dest.as_deref()))
}

/// Read a source file, mapping failure to [`CatalogError::Unreadable`].
///
/// # Errors
///
/// Returns [`CatalogError::Unreadable`] if the file cannot be read.
pub fn read_source(path: &Path) -> Result<Vec<u8>, CatalogError> {
    std::fs::read(path).map_err(|source| CatalogError::Unreadable {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a file that may legitimately be absent.
///
/// # Errors
///
/// Returns an error for any failure other than the file not existing.
pub fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
    }
}

/// Minimal interface for resources that can be described, applied, and removed.
pub trait Applicable {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Bring the destination in line with the source and report what happened.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure or if the source cannot be read.
    fn apply(&self) -> Result<LogEntry>;

    /// Remove the resource, undoing a previous `apply()`.
    ///
    /// Returns `None` when there was nothing to remove.
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails or is not supported for this
    /// resource type.
    fn remove(&self) -> Result<Option<LogEntry>> {
        anyhow::bail!(
            "operation 'remove' is not supported for resource '{}'",
            self.description()
        )
    }
}

/// Resources that can also report their state without touching anything.
pub trait Resource: Applicable {
    /// Classify the destination against the source.
    ///
    /// # Errors
    ///
    /// Returns an error if either side cannot be read.
    fn current_state(&self) -> Result<ItemStatus>;

    /// Determine if the resource needs to be changed.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`current_state`](Self::current_state).
    fn needs_change(&self) -> Result<bool> {
        Ok(self.current_state()? != ItemStatus::Installed)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn classify_new_when_destination_absent() {
        assert_eq!(classify(b"x", None), ItemStatus::New);
    }

    #[test]
    fn classify_compares_bytes_exactly() {
        assert_eq!(classify(b"x\n", Some(b"x\n")), ItemStatus::Installed);
        assert_eq!(classify(b"x\n", Some(b"x\r\n")), ItemStatus::Update);
        assert_eq!(classify(b"", Some(b"")), ItemStatus::Installed);
    }

    #[test]
    fn classify_paths_reads_live_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.md");
        let dst = dir.path().join("dst.md");
        std::fs::write(&src, b"one").unwrap();
        assert_eq!(classify_paths(&src, &dst).unwrap(), ItemStatus::New);
        std::fs::write(&dst, b"one").unwrap();
        assert_eq!(classify_paths(&src, &dst).unwrap(), ItemStatus::Installed);
        std::fs::write(&src, b"two").unwrap();
        assert_eq!(classify_paths(&src, &dst).unwrap(), ItemStatus::Update);
    }

    #[test]
    fn classify_paths_missing_source_is_catalog_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = classify_paths(&dir.path().join("nope"), &dir.path().join("x")).unwrap_err();
        assert!(err.downcast_ref::<CatalogError>().is_some());
    }

    #[test]
    fn badges() {
        assert_eq!(ItemStatus::New.badge(), "NEW");
        assert_eq!(ItemStatus::Installed.badge(), "UP TO DATE");
        assert_eq!(ItemStatus::Update.to_string(), "update");
    }
}
