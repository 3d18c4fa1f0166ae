//! Restore command implementation.
use anyhow::Result;
use std::sync::Arc;

use super::{CommandSetup, run_to_completion};
use crate::cli::{GlobalOpts, RestoreOpts};
use crate::logging::Logger;
use crate::selection::{FlagSelection, Scope};
use crate::tasks;

/// Run the restore command.
///
/// # Errors
///
/// Returns an error if there is no matching snapshot or a file cannot be
/// restored.
pub fn run(global: &GlobalOpts, opts: &RestoreOpts, log: &Arc<Logger>, json: bool) -> Result<()> {
    let setup = CommandSetup::init_target_only(global, log)?;
    let selection = FlagSelection {
        scope: Scope::Restore,
        snapshot: opts.id.clone(),
        ..FlagSelection::default()
    };
    let ctx = setup.context(&selection, log)?;
    let tasks = tasks::all_restore_tasks();
    run_to_completion(tasks.iter().map(AsRef::as_ref), &ctx, log, json)
}
