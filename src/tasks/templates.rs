//! Task templates for the global root and for projects.
use anyhow::Result;
use std::path::Path;

use super::{Context, Task};
use crate::resources::Applicable;
use crate::resources::task_template::TaskTemplate;

/// Install the global task templates under the target root.
#[derive(Debug)]
pub struct InstallTaskTemplates;

impl Task for InstallTaskTemplates {
    fn name(&self) -> &'static str {
        "Install task templates"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.selection.scope.includes_global() && ctx.selection.create_tasks
    }

    fn run(&self, ctx: &Context) -> Result<()> {
        install_templates(ctx, &ctx.config.tasks_target())
    }
}

/// Install every manifest template into `dest_dir`, leaving files that
/// already have content alone.
///
/// # Errors
///
/// Returns an error if a template cannot be read or written.
pub fn install_templates(ctx: &Context, dest_dir: &Path) -> Result<()> {
    let source_dir = ctx.config.templates_source();
    for name in &ctx.config.manifest.tasks.templates {
        let dest = dest_dir.join(name);
        let template = TaskTemplate::new(source_dir.join(name), dest.clone(), ctx.label(&dest));
        ctx.record(template.apply()?);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::EntryStatus;
    use crate::selection::Scope;
    use crate::tasks::test_helpers::{config_in, context, context_with, write_source};
    use std::fs;

    #[test]
    fn installs_templates_and_keeps_filled_ones() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        write_source(&config, "tasks/lessons.md", "# Lessons\n");
        write_source(&config, "tasks/todo.md", "# Todo\n");
        fs::create_dir_all(config.tasks_target()).unwrap();
        fs::write(config.tasks_target().join("todo.md"), "# Todo\n- [ ] ship it\n").unwrap();

        let ctx = context(config, Scope::Global);
        InstallTaskTemplates.run(&ctx).unwrap();

        let journal = ctx.journal();
        assert_eq!(journal[0].status, EntryStatus::Installed);
        assert_eq!(journal[0].label, "~/.claude/tasks/lessons.md");
        assert_eq!(journal[1].status, EntryStatus::Skipped);
        assert_eq!(journal[1].label, "~/.claude/tasks/todo.md (has content)");
    }

    #[test]
    fn missing_template_warns() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(config_in(dir.path()), Scope::Global);
        InstallTaskTemplates.run(&ctx).unwrap();
        assert!(ctx.journal().iter().all(|e| e.status == EntryStatus::Warning));
    }

    #[test]
    fn toggle_disables_task() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context_with(config_in(dir.path()), |s| s.create_tasks = false);
        assert!(!InstallTaskTemplates.should_run(&ctx));
    }
}
