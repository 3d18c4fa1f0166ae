//! Removal of the managed files.
use anyhow::{Context as _, Result};

use super::{Context, Task};
use crate::config::MANAGED_DIRS;
use crate::logging::{EntryStatus, LogEntry};
use crate::resources::Applicable;
use crate::resources::helpers::fs::collect_files;
use crate::resources::managed_file::ManagedFile;

/// Remove the primary document and the managed sub-directories.
///
/// The settings document and helper script stay in place. Runs after
/// [`SnapshotManagedFiles`](super::snapshot::SnapshotManagedFiles), so
/// everything removed here can be restored.
#[derive(Debug)]
pub struct RemoveManagedFiles;

impl Task for RemoveManagedFiles {
    fn name(&self) -> &'static str {
        "Remove managed files"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<()> {
        let root = &ctx.config.target_root;
        if !root.is_dir() {
            ctx.log
                .info(&format!("{} not found, nothing to uninstall", ctx.label(root)));
            return Ok(());
        }

        let dest = ctx.config.primary_target();
        let primary = ManagedFile::new(ctx.config.primary_source(), dest.clone(), ctx.label(&dest));
        if let Some(entry) = primary.remove()? {
            ctx.record(entry);
        }

        for name in MANAGED_DIRS {
            let dir = root.join(name);
            if !dir.is_dir() {
                continue;
            }
            let count = collect_files(&dir)?.len();
            std::fs::remove_dir_all(&dir)
                .with_context(|| format!("removing {}", dir.display()))?;
            ctx.record(LogEntry::new(
                EntryStatus::Removed,
                format!("{} ({count} files)", ctx.label(&dir)),
            ));
        }
        Ok(())
    }
}
