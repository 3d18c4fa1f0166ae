//! Shared state of a run: configuration, catalog, selection and journal.
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Result;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::logging::{Log, LogEntry};
use crate::repository;
use crate::selection::Selection;

/// Shared context for task execution.
///
/// Owns the run journal: every [`LogEntry`] produced by a task is appended
/// through [`Context::record`], which also presents it.
pub struct Context {
    /// Roots and manifest for this run.
    pub config: Config,
    /// Catalog scanned at startup.
    pub catalog: Catalog,
    /// Validated selection (mandatory items already enforced).
    pub selection: Selection,
    /// Model identifier resolved from the selection's token.
    pub model: Option<String>,
    /// Logger for output.
    pub log: Arc<dyn Log>,
    /// Git work tree containing the project directory, when one exists.
    pub work_tree: Option<PathBuf>,
    journal: Mutex<Vec<LogEntry>>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("selection", &self.selection)
            .field("model", &self.model)
            .field("log", &"<dyn Log>")
            .field("work_tree", &self.work_tree)
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Validate `selection` against `catalog` and build a context.
    ///
    /// Mandatory items missing from the selection are re-added here, before
    /// any task can act on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection's model token is unknown.
    pub fn new(
        config: Config,
        catalog: Catalog,
        mut selection: Selection,
        log: Arc<dyn Log>,
    ) -> Result<Self> {
        let model = config.manifest.models.resolve(&selection.model)?;
        for name in selection.enforce_mandatory(&catalog) {
            log.debug(&format!("{name} is mandatory, keeping it selected"));
        }
        let work_tree = if selection.scope.includes_project() {
            repository::find_work_tree(&config.project_dir)
        } else {
            None
        };
        Ok(Self {
            config,
            catalog,
            selection,
            model,
            log,
            work_tree,
            journal: Mutex::new(Vec::new()),
        })
    }

    fn journal_lock(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        self.journal.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an entry to the journal and present it.
    pub fn record(&self, entry: LogEntry) {
        self.log.entry(&entry);
        self.journal_lock().push(entry);
    }

    /// Append several entries in order.
    pub fn record_all(&self, entries: impl IntoIterator<Item = LogEntry>) {
        for entry in entries {
            self.record(entry);
        }
    }

    /// Copy of the journal so far.
    #[must_use]
    pub fn journal(&self) -> Vec<LogEntry> {
        self.journal_lock().clone()
    }

    /// Display label for `path`.
    #[must_use]
    pub fn label(&self, path: &Path) -> String {
        self.config.label(path)
    }
}
