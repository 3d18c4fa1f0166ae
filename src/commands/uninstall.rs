//! Uninstall command implementation.
use anyhow::Result;
use std::sync::Arc;

use super::{CommandSetup, run_to_completion};
use crate::cli::GlobalOpts;
use crate::logging::Logger;
use crate::selection::FlagSelection;
use crate::tasks;

/// Run the uninstall command.
///
/// # Errors
///
/// Returns an error if configuration loading or removal fails.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>, json: bool) -> Result<()> {
    let setup = CommandSetup::init_target_only(global, log)?;
    let ctx = setup.context(&FlagSelection::default(), log)?;
    let tasks = tasks::all_uninstall_tasks();
    run_to_completion(tasks.iter().map(AsRef::as_ref), &ctx, log, json)
}
