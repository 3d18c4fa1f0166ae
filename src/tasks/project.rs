//! Project-scope install inside a git work tree.
use anyhow::Result;

use super::templates::install_templates;
use super::{Context, Task};
use crate::logging::LogEntry;
use crate::resources::permissions::ProjectPermissions;

/// Install project task templates and auto-approve permissions.
///
/// Only runs inside a git work tree; elsewhere it records a single
/// `skipped` entry and leaves the directory alone.
#[derive(Debug)]
pub struct ConfigureProject;

impl Task for ConfigureProject {
    fn name(&self) -> &'static str {
        "Configure project"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.selection.scope.includes_project()
    }

    fn run(&self, ctx: &Context) -> Result<()> {
        let Some(work_tree) = &ctx.work_tree else {
            ctx.record(LogEntry::skipped("Project install (not in a git repo)"));
            return Ok(());
        };
        ctx.log.debug(&format!("git work tree: {}", work_tree.display()));

        if ctx.selection.create_tasks {
            install_templates(ctx, &ctx.config.project_tasks_dir())?;
        }
        if ctx.selection.auto_read {
            let path = ctx.config.project_settings();
            let permissions = ProjectPermissions {
                label: ctx.label(&path),
                path,
                allow: ctx.config.manifest.project.auto_read_allow.clone(),
            };
            ctx.record_all(permissions.apply()?);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::EntryStatus;
    use crate::selection::Scope;
    use crate::tasks::test_helpers::{config_in, context_with, write_source};
    use std::fs;

    #[test]
    fn outside_repository_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        fs::create_dir_all(&config.project_dir).unwrap();
        let ctx = context_with(config, |s| {
            s.scope = Scope::Project;
            s.auto_read = true;
        });
        ConfigureProject.run(&ctx).unwrap();
        assert_eq!(
            ctx.journal(),
            vec![LogEntry::skipped("Project install (not in a git repo)")]
        );
        assert!(!ctx.config.project_settings().exists());
    }

    #[test]
    fn inside_repository_installs_templates_and_permissions() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        fs::create_dir_all(&config.project_dir).unwrap();
        git2::Repository::init(&config.project_dir).unwrap();
        write_source(&config, "tasks/lessons.md", "# Lessons\n");
        write_source(&config, "tasks/todo.md", "# Todo\n");

        let ctx = context_with(config, |s| {
            s.scope = Scope::Project;
            s.auto_read = true;
        });
        ConfigureProject.run(&ctx).unwrap();

        let labels: Vec<(EntryStatus, String)> = ctx
            .journal()
            .into_iter()
            .map(|e| (e.status, e.label))
            .collect();
        assert_eq!(
            labels,
            vec![
                (EntryStatus::Installed, "tasks/lessons.md".to_string()),
                (EntryStatus::Installed, "tasks/todo.md".to_string()),
                (
                    EntryStatus::Installed,
                    ".claude/settings.json (auto-approve read)".to_string()
                ),
            ]
        );
        assert!(ctx.config.project_tasks_dir().join("todo.md").exists());
    }
}
