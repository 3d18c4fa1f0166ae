//! Named steps of a sync run, executed in order over a shared [`Context`].
pub mod context;
pub mod documents;
pub mod project;
pub mod settings;
pub mod snapshot;
pub mod templates;
pub mod uninstall;

pub use context::Context;

use anyhow::{Context as _, Result};

use crate::selection::Scope;

/// A named, executable task.
pub trait Task {
    /// Human-readable task name, shown as the stage header.
    fn name(&self) -> &'static str;

    /// Whether this task applies to the current selection.
    fn should_run(&self, ctx: &Context) -> bool;

    /// Execute the task, recording journal entries on `ctx`.
    ///
    /// # Errors
    ///
    /// Returns an error for unrecoverable failures: an unreadable primary
    /// document, an uncreatable target root, or an I/O error mid-write.
    fn run(&self, ctx: &Context) -> Result<()>;
}

/// Tasks of an install run, in execution order.
///
/// The snapshot comes first so every later overwrite is reversible.
#[must_use]
pub fn all_install_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(snapshot::SnapshotManagedFiles),
        Box::new(documents::PrepareTargetRoot),
        Box::new(documents::InstallPrimaryDocument),
        Box::new(documents::SyncRules),
        Box::new(documents::SyncAgents),
        Box::new(templates::InstallTaskTemplates),
        Box::new(settings::MergeGlobalSettings),
        Box::new(documents::InstallStatusline),
        Box::new(project::ConfigureProject),
    ]
}

/// Tasks of a restore run.
#[must_use]
pub fn all_restore_tasks() -> Vec<Box<dyn Task>> {
    vec![Box::new(snapshot::RestoreSnapshot)]
}

/// Tasks of an uninstall run.
#[must_use]
pub fn all_uninstall_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(snapshot::SnapshotManagedFiles),
        Box::new(uninstall::RemoveManagedFiles),
    ]
}

/// Tasks for a selection's scope.
#[must_use]
pub fn tasks_for(scope: Scope) -> Vec<Box<dyn Task>> {
    match scope {
        Scope::Restore => all_restore_tasks(),
        Scope::Global | Scope::Project | Scope::Both => all_install_tasks(),
    }
}

/// Execute a task if it applies.
///
/// # Errors
///
/// Returns the task's error, annotated with its name.
pub fn execute(task: &dyn Task, ctx: &Context) -> Result<()> {
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping task: {} (not applicable)", task.name()));
        return Ok(());
    }
    ctx.log.stage(task.name());
    task.run(ctx).with_context(|| task.name().to_lowercase())
}

/// Execute `tasks` in order, stopping at the first failure.
///
/// Work completed before a failure stays on disk and in the journal.
///
/// # Errors
///
/// Returns the first task error.
pub fn run_all<'a>(tasks: impl IntoIterator<Item = &'a dyn Task>, ctx: &Context) -> Result<()> {
    for task in tasks {
        execute(task, ctx)?;
    }
    Ok(())
}
