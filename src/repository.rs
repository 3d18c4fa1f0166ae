//! Git work-tree detection for project-scope installs.
use std::path::{Path, PathBuf};

use git2::Repository;

/// Return the work tree containing `dir`, searching upwards.
///
/// Bare repositories and directories outside any repository yield `None`.
#[must_use]
pub fn find_work_tree(dir: &Path) -> Option<PathBuf> {
    match Repository::discover(dir) {
        Ok(repo) => repo.workdir().map(Path::to_path_buf),
        Err(e) => {
            tracing::debug!("no git repository at {}: {}", dir.display(), e.message());
            None
        }
    }
}
