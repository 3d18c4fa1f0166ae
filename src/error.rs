//! Domain-specific error types for the dotai sync engine.
//!
//! Internal modules return these typed errors and command handlers convert
//! them to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! ConfigError  : root resolution, manifest parsing, model tokens
//! CatalogError : unreadable or missing source documents
//! SyncError    : target tree cannot be prepared
//! SnapshotError: restore requested for a snapshot that does not exist
//! ```
//!
//! Recoverable defects (malformed front-matter, corrupt settings documents)
//! never surface here: they degrade to defaults and become `warning`
//! journal entries instead.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise while building the run configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The `--model` token does not name a configured model choice.
    #[error("unknown model '{token}': expected one of {}", .choices.join(", "))]
    UnknownModel {
        /// Token supplied by the front-end.
        token: String,
        /// Tokens accepted by the manifest.
        choices: Vec<String>,
    },

    /// The manifest file exists but cannot be parsed.
    #[error("invalid manifest {}: {message}", .path.display())]
    InvalidManifest {
        /// Path of the offending manifest.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// No standards repository could be located.
    #[error("cannot determine standards root. Use --source or set DOTAI_ROOT")]
    RootNotFound,
}

/// Errors that arise from reading the read-only source tree.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The primary document every global install needs is absent.
    #[error("primary document not found: {}", .path.display())]
    MissingPrimaryDocument {
        /// Expected location of the primary document.
        path: PathBuf,
    },

    /// A source file exists but could not be read.
    #[error("cannot read source file {}: {source}", .path.display())]
    Unreadable {
        /// Path of the unreadable file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that abort a sync run before any item is touched.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The target installation root could not be created.
    #[error("cannot create target root {}: {source}", .path.display())]
    TargetRoot {
        /// Target root that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise when selecting a snapshot to restore.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The backups directory holds no snapshots at all.
    #[error("no snapshots found in {}", .dir.display())]
    NoSnapshots {
        /// Backups directory that was searched.
        dir: PathBuf,
    },

    /// The requested snapshot id is not among the available snapshots.
    #[error("snapshot '{id}' not found (available: {})", .available.join(", "))]
    NotFound {
        /// Requested snapshot id.
        id: String,
        /// Ids that do exist, newest first.
        available: Vec<String>,
    },
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn unknown_model_lists_choices() {
        let e = ConfigError::UnknownModel {
            token: "gpt".to_string(),
            choices: vec!["haiku".to_string(), "sonnet".to_string()],
        };
        assert_eq!(
            e.to_string(),
            "unknown model 'gpt': expected one of haiku, sonnet"
        );
    }

    #[test]
    fn invalid_manifest_mentions_path() {
        let e = ConfigError::InvalidManifest {
            path: PathBuf::from("/src/standards/dotai.toml"),
            message: "expected `=`".to_string(),
        };
        assert!(e.to_string().contains("/src/standards/dotai.toml"));
        assert!(e.to_string().contains("expected `=`"));
    }

    #[test]
    fn missing_primary_document_display() {
        let e = CatalogError::MissingPrimaryDocument {
            path: PathBuf::from("/src/standards/home/CLAUDE.md"),
        };
        assert_eq!(
            e.to_string(),
            "primary document not found: /src/standards/home/CLAUDE.md"
        );
    }

    #[test]
    fn unreadable_has_source() {
        use std::error::Error as StdError;
        let e = CatalogError::Unreadable {
            path: PathBuf::from("/src/a.md"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.source().is_some());
    }

    #[test]
    fn target_root_display() {
        let e = SyncError::TargetRoot {
            path: PathBuf::from("/home/u/.claude"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.to_string().starts_with("cannot create target root /home/u/.claude"));
    }

    #[test]
    fn snapshot_not_found_lists_available() {
        let e = SnapshotError::NotFound {
            id: "20240101-000000".to_string(),
            available: vec!["20250102-030405".to_string(), "20250101-000000".to_string()],
        };
        assert_eq!(
            e.to_string(),
            "snapshot '20240101-000000' not found (available: 20250102-030405, 20250101-000000)"
        );
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<ConfigError>();
        assert_send_sync::<CatalogError>();
        assert_send_sync::<SyncError>();
        assert_send_sync::<SnapshotError>();
    }

    #[test]
    fn errors_convert_to_anyhow() {
        let _a: anyhow::Error = ConfigError::RootNotFound.into();
        let _b: anyhow::Error = SnapshotError::NoSnapshots {
            dir: PathBuf::from("/b"),
        }
        .into();
    }
}
