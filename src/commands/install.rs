//! Install command implementation.
use anyhow::Result;
use std::sync::Arc;

use super::{CommandSetup, run_to_completion};
use crate::cli::{GlobalOpts, InstallOpts};
use crate::logging::Logger;
use crate::selection::FlagSelection;
use crate::tasks;

/// Front-end selection described by `install` flags.
#[must_use]
pub fn selection_from(opts: &InstallOpts) -> FlagSelection {
    FlagSelection {
        scope: opts.scope,
        rules: opts.rules.clone(),
        agents: opts.agents.clone(),
        model: opts.model.clone(),
        create_tasks: !opts.no_tasks,
        auto_read: opts.auto_read,
        snapshot: None,
    }
}

/// Run the install command.
///
/// # Errors
///
/// Returns an error if configuration loading or any task fails.
pub fn run(global: &GlobalOpts, opts: &InstallOpts, log: &Arc<Logger>, json: bool) -> Result<()> {
    log.info(&format!("dotai {}", super::version::version()));

    let setup = CommandSetup::init(global, log)?;
    let ctx = setup.context(&selection_from(opts), log)?;
    log.info(&format!(
        "scope: {}, {} rules, {} agents",
        ctx.selection.scope,
        ctx.selection.rules.len(),
        ctx.selection.agents.len()
    ));

    let tasks = tasks::tasks_for(ctx.selection.scope);
    run_to_completion(tasks.iter().map(AsRef::as_ref), &ctx, log, json)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::selection::Scope;

    #[test]
    fn flags_map_onto_selection() {
        let opts = InstallOpts {
            scope: Scope::Project,
            rules: Some(vec!["a.md".to_string()]),
            agents: None,
            model: Some("haiku".to_string()),
            no_tasks: true,
            auto_read: true,
        };
        let selection = selection_from(&opts);
        assert_eq!(selection.scope, Scope::Project);
        assert_eq!(selection.rules, Some(vec!["a.md".to_string()]));
        assert!(!selection.create_tasks);
        assert!(selection.auto_read);
        assert_eq!(selection.snapshot, None);
    }
}
