// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed standards repository, home and
// project, plus a fluent builder so each integration test can set up an
// isolated environment without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dotai::catalog::Catalog;
use dotai::config::{Config, STANDARDS_DIR};
use dotai::logging::{EntryStatus, LogEntry, Logger};
use dotai::selection::{Scope, Selection};
use dotai::tasks::{self, Context};

/// An isolated source tree, home directory and project directory.
pub struct IntegrationTestContext {
    /// Temporary directory holding everything.
    pub root: tempfile::TempDir,
}

impl IntegrationTestContext {
    /// Standards repository root.
    pub fn source(&self) -> PathBuf {
        self.root.path().join("repo")
    }

    /// `standards/` inside the repository.
    pub fn standards(&self) -> PathBuf {
        self.source().join(STANDARDS_DIR)
    }

    /// Fake home directory.
    pub fn home(&self) -> PathBuf {
        self.root.path().join("home")
    }

    /// Installation root, `~/.claude`.
    pub fn target(&self) -> PathBuf {
        self.home().join(".claude")
    }

    /// Project directory.
    pub fn project(&self) -> PathBuf {
        self.root.path().join("project")
    }

    /// Load configuration for this environment.
    pub fn config(&self) -> Config {
        Config::load(&self.source(), &self.target(), &self.home(), &self.project())
            .expect("load config")
    }

    /// Build a context whose selection starts from "everything" in `scope`
    /// and is then adjusted by `adjust`.
    pub fn context(&self, scope: Scope, adjust: impl FnOnce(&mut Selection)) -> Context {
        let config = self.config();
        let catalog = Catalog::load(&config);
        let mut selection = Selection::everything(&catalog, &config.manifest);
        selection.scope = scope;
        adjust(&mut selection);
        Context::new(config, catalog, selection, Arc::new(Logger::ephemeral()))
            .expect("build context")
    }

    /// Run the tasks for the selection's scope and return the journal.
    pub fn run(&self, scope: Scope, adjust: impl FnOnce(&mut Selection)) -> Vec<LogEntry> {
        let ctx = self.context(scope, adjust);
        let tasks = tasks::tasks_for(ctx.selection.scope);
        tasks::run_all(tasks.iter().map(AsRef::as_ref), &ctx).expect("run tasks");
        ctx.journal()
    }

    /// Global install of everything.
    pub fn install(&self) -> Vec<LogEntry> {
        self.run(Scope::Global, |_| {})
    }

    /// Run the uninstall task list.
    pub fn uninstall(&self) -> Vec<LogEntry> {
        let ctx = self.context(Scope::Global, |_| {});
        let tasks = tasks::all_uninstall_tasks();
        tasks::run_all(tasks.iter().map(AsRef::as_ref), &ctx).expect("run uninstall");
        ctx.journal()
    }

    /// Installed file under the target root.
    pub fn installed(&self, rel: &str) -> PathBuf {
        self.target().join(rel)
    }

    /// Read an installed file as text.
    pub fn read_installed(&self, rel: &str) -> String {
        std::fs::read_to_string(self.installed(rel)).expect("read installed file")
    }
}

/// Render a journal as `status label` lines for snapshots.
pub fn render(entries: &[LogEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("{:<9} {}", e.status.as_str(), e.label))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Journal without snapshot entries, whose labels carry a timestamp.
pub fn without_snapshots(entries: &[LogEntry]) -> Vec<LogEntry> {
    entries
        .iter()
        .filter(|e| e.status != EntryStatus::Snapshot)
        .cloned()
        .collect()
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, content).expect("write file");
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
}

impl TestContextBuilder {
    /// Begin with an empty `standards/` tree holding only a primary document.
    pub fn new() -> Self {
        let ctx = IntegrationTestContext {
            root: tempfile::tempdir().expect("create temp dir"),
        };
        std::fs::create_dir_all(ctx.home()).expect("create home");
        std::fs::create_dir_all(ctx.project()).expect("create project");
        write(&ctx.standards().join("home/CLAUDE.md"), "# Standards\n");
        Self { ctx }
    }

    /// Write `standards/<rel>`.
    pub fn with_source_file(self, rel: &str, content: &str) -> Self {
        write(&self.ctx.standards().join(rel), content);
        self
    }

    /// Add a rule document.
    pub fn with_rule(self, name: &str, content: &str) -> Self {
        self.with_source_file(&format!("home/rules/{name}"), content)
    }

    /// Add an agent definition.
    pub fn with_agent(self, name: &str, content: &str) -> Self {
        self.with_source_file(&format!("agents/{name}"), content)
    }

    /// Add the settings template.
    pub fn with_settings_template(self, json: &str) -> Self {
        self.with_source_file("home/settings.json", json)
    }

    /// Add both default task templates.
    pub fn with_task_templates(self) -> Self {
        self.with_source_file("tasks/lessons.md", "# Lessons\n\n<!-- add lessons here -->\n")
            .with_source_file("tasks/todo.md", "# Todo\n")
    }

    /// Write `standards/dotai.toml`.
    pub fn with_manifest(self, toml: &str) -> Self {
        self.with_source_file("dotai.toml", toml)
    }

    /// Write a file directly under the installation root.
    pub fn with_installed(self, rel: &str, content: &str) -> Self {
        write(&self.ctx.target().join(rel), content);
        self
    }

    /// Finish building and return the configured context.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx
    }
}
