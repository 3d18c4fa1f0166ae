//! Top-level subcommand orchestration.
pub mod install;
pub mod restore;
pub mod status;
pub mod uninstall;
pub mod version;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::cli::GlobalOpts;
use crate::config::{Config, STANDARDS_DIR};
use crate::error::ConfigError;
use crate::logging::{Log, Logger};
use crate::selection::SelectionSource;
use crate::tasks::{self, Context, Task};

/// Environment variable naming the standards repository.
pub const ROOT_ENV: &str = "DOTAI_ROOT";

/// Shared state produced by the common command setup sequence.
#[derive(Debug)]
pub struct CommandSetup {
    /// Run configuration.
    pub config: Config,
    /// Catalog scanned from the source tree.
    pub catalog: Catalog,
}

impl CommandSetup {
    /// Resolve roots, load the manifest, and scan the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if a root cannot be determined or the manifest
    /// fails to parse.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        let source = resolve_root(global)?;
        let (target, home, project) = local_roots(global)?;
        Self::from_roots(Some(&source), &target, &home, &project, log)
    }

    /// Like [`init`](Self::init), but a missing standards repository is not
    /// an error. Used by commands that only work on the installation root.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined or a
    /// found manifest fails to parse.
    pub fn init_target_only(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        let source = match resolve_root(global) {
            Ok(root) => Some(root),
            Err(e) => {
                log.debug(&format!("{e}, continuing without a catalog"));
                None
            }
        };
        let (target, home, project) = local_roots(global)?;
        Self::from_roots(source.as_deref(), &target, &home, &project, log)
    }

    /// Build the setup from explicit roots. Without a `source` the catalog
    /// is empty and the manifest holds its defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest exists but cannot be parsed.
    pub fn from_roots(
        source: Option<&Path>,
        target: &Path,
        home: &Path,
        project: &Path,
        log: &Logger,
    ) -> Result<Self> {
        log.stage("Loading configuration");
        let Some(source) = source else {
            let config = Config::target_only(target, home, project);
            log.info(&format!("target: {}", config.label(target)));
            return Ok(Self {
                config,
                catalog: Catalog::default(),
            });
        };

        let config = Config::load(source, target, home, project)?;
        log.info(&format!("source: {}", source.display()));
        log.info(&format!("target: {}", config.label(target)));

        let catalog = Catalog::load(&config);
        log.debug(&format!("{} rules", catalog.rules.len()));
        log.debug(&format!("{} agents", catalog.agents.len()));
        log.info(&format!(
            "found {} rules, {} agents",
            catalog.rules.len(),
            catalog.agents.len()
        ));
        Ok(Self { config, catalog })
    }

    /// Ask `source` for a selection and build the task context from it.
    ///
    /// # Errors
    ///
    /// Returns an error if the front-end fails or the model token is unknown.
    pub fn context(self, source: &dyn SelectionSource, log: &Arc<Logger>) -> Result<Context> {
        let selection = source.select(&self.catalog, &self.config.manifest)?;
        let log: Arc<dyn Log> = Arc::<Logger>::clone(log);
        Context::new(self.config, self.catalog, selection, log)
    }
}

/// Target root, home and project directories for this invocation.
fn local_roots(global: &GlobalOpts) -> Result<(PathBuf, PathBuf, PathBuf)> {
    let home = home_dir()?;
    let target = global
        .target
        .clone()
        .unwrap_or_else(|| home.join(".claude"));
    let project = std::env::current_dir()?;
    Ok((target, home, project))
}

/// User home directory.
///
/// # Errors
///
/// Returns an error if neither `HOME` nor (on Windows) `USERPROFILE` is set.
pub fn home_dir() -> Result<PathBuf> {
    let home = if cfg!(target_os = "windows") {
        std::env::var("USERPROFILE").or_else(|_| std::env::var("HOME"))
    } else {
        std::env::var("HOME")
    };
    home.map(PathBuf::from)
        .map_err(|_| anyhow::anyhow!("HOME environment variable is not set"))
}

fn is_source_root(dir: &Path) -> bool {
    dir.join(STANDARDS_DIR).is_dir()
}

/// Resolve the standards repository from CLI arguments or auto-detection.
///
/// Order: `--source`, `DOTAI_ROOT`, locations relative to the executable,
/// then the current directory.
///
/// # Errors
///
/// Returns [`ConfigError::RootNotFound`] if no candidate holds `standards/`.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf> {
    if let Some(ref root) = global.source {
        return Ok(root.clone());
    }

    if let Ok(root) = std::env::var(ROOT_ENV) {
        return Ok(PathBuf::from(root));
    }

    if let Ok(exe) = std::env::current_exe()
        && let Some(parent) = exe.parent()
    {
        let candidates = [
            parent.join("../.."), // target/release/ → repo root
            parent.join(".."),    // bin/ → repo root
        ];
        for candidate in &candidates {
            if is_source_root(candidate) {
                return Ok(dunce::canonicalize(candidate)?);
            }
        }
    }

    let cwd = std::env::current_dir()?;
    if is_source_root(&cwd) {
        return Ok(cwd);
    }

    Err(ConfigError::RootNotFound.into())
}

/// Execute `tasks`, then present the journal: the summary on the console,
/// or the entries as JSON on stdout.
///
/// The journal is presented even when a task fails.
///
/// # Errors
///
/// Returns the first task error.
pub fn run_to_completion<'a>(
    tasks: impl IntoIterator<Item = &'a dyn Task>,
    ctx: &Context,
    log: &Logger,
    json: bool,
) -> Result<()> {
    let result = tasks::run_all(tasks, ctx);
    let journal = ctx.journal();
    if json {
        println!("{}", serde_json::to_string_pretty(&journal)?);
    } else {
        log.print_summary(&journal);
    }
    result
}
