//! Snapshot and restore tasks.
use anyhow::Result;

use super::{Context, Task};
use crate::logging::{EntryStatus, LogEntry};
use crate::selection::Scope;
use crate::snapshot::SnapshotManager;

fn manager(ctx: &Context) -> SnapshotManager {
    SnapshotManager::new(
        &ctx.config.target_root,
        ctx.label(&ctx.config.target_root),
    )
}

/// Capture the managed files before anything is changed.
#[derive(Debug)]
pub struct SnapshotManagedFiles;

impl Task for SnapshotManagedFiles {
    fn name(&self) -> &'static str {
        "Snapshot managed files"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.selection.scope.includes_global()
    }

    fn run(&self, ctx: &Context) -> Result<()> {
        let Some(snapshot) = manager(ctx).create()? else {
            ctx.log.debug("no managed files to snapshot");
            return Ok(());
        };
        let count = snapshot.files()?.len();
        ctx.record(LogEntry::new(
            EntryStatus::Snapshot,
            format!("{} ({count} files)", ctx.label(&snapshot.path)),
        ));
        Ok(())
    }
}

/// Restore the selected snapshot onto the target root.
#[derive(Debug)]
pub struct RestoreSnapshot;

impl Task for RestoreSnapshot {
    fn name(&self) -> &'static str {
        "Restore snapshot"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.selection.scope == Scope::Restore
    }

    fn run(&self, ctx: &Context) -> Result<()> {
        let manager = manager(ctx);
        let snapshot = manager.select(ctx.selection.snapshot.as_deref())?;
        ctx.log.info(&format!("restoring snapshot {}", snapshot.id));
        ctx.record_all(manager.restore(&snapshot)?);
        Ok(())
    }
}
