//! Run configuration: explicit roots and the optional standards manifest.
//!
//! A [`Config`] is built once by the command layer and passed down. Nothing
//! below it reads the current directory or `$HOME` on its own.
pub mod manifest;
pub mod toml_loader;

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

/// Directory under the source root holding every managed asset.
pub const STANDARDS_DIR: &str = "standards";
/// Manifest file name inside [`STANDARDS_DIR`].
pub const MANIFEST_FILE: &str = "dotai.toml";
/// Primary document name, both in the source and the target.
pub const PRIMARY_DOCUMENT: &str = "CLAUDE.md";
/// Settings document name, both in the source and the target.
pub const SETTINGS_DOCUMENT: &str = "settings.json";
/// Helper script name, both in the source and the target.
pub const STATUSLINE_SCRIPT: &str = "statusline.sh";
/// Managed sub-directories of the target root.
pub const MANAGED_DIRS: [&str; 3] = ["rules", "agents", "tasks"];
/// Top-level files of the target root captured by snapshots.
pub const MANAGED_FILES: [&str; 3] = [SETTINGS_DOCUMENT, PRIMARY_DOCUMENT, STATUSLINE_SCRIPT];
/// Snapshot directory under the target root.
pub const BACKUPS_DIR: &str = "backups";

/// All roots and options for a single run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Repository containing `standards/`. Never written to.
    pub source_root: PathBuf,
    /// Installation root, usually `~/.claude`.
    pub target_root: PathBuf,
    /// User home directory, used for labels and `~/.aws/config`.
    pub home: PathBuf,
    /// Directory for project-scope installs.
    pub project_dir: PathBuf,
    /// Parsed `standards/dotai.toml`, or defaults.
    pub manifest: manifest::Manifest,
}

impl Config {
    /// Build a configuration from explicit roots, loading the manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest exists but cannot be read or parsed.
    pub fn load(
        source_root: &Path,
        target_root: &Path,
        home: &Path,
        project_dir: &Path,
    ) -> Result<Self> {
        let manifest_path = source_root.join(STANDARDS_DIR).join(MANIFEST_FILE);
        let manifest = toml_loader::load_config(&manifest_path)
            .with_context(|| format!("loading {}", manifest_path.display()))?;
        Ok(Self {
            source_root: source_root.to_path_buf(),
            target_root: target_root.to_path_buf(),
            home: home.to_path_buf(),
            project_dir: project_dir.to_path_buf(),
            manifest,
        })
    }

    /// Configuration without a standards repository, for commands that
    /// only touch the installation root.
    ///
    /// `source_root` is empty and the manifest holds its defaults.
    #[must_use]
    pub fn target_only(target_root: &Path, home: &Path, project_dir: &Path) -> Self {
        Self {
            source_root: PathBuf::new(),
            target_root: target_root.to_path_buf(),
            home: home.to_path_buf(),
            project_dir: project_dir.to_path_buf(),
            manifest: manifest::Manifest::default(),
        }
    }

    fn standards(&self) -> PathBuf {
        self.source_root.join(STANDARDS_DIR)
    }

    /// `standards/home/`, the source of everything installed globally.
    #[must_use]
    pub fn home_source(&self) -> PathBuf {
        self.standards().join("home")
    }

    /// Source primary document.
    #[must_use]
    pub fn primary_source(&self) -> PathBuf {
        self.home_source().join(PRIMARY_DOCUMENT)
    }

    /// Source rule catalog.
    #[must_use]
    pub fn rules_source(&self) -> PathBuf {
        self.home_source().join("rules")
    }

    /// Source agent catalog.
    #[must_use]
    pub fn agents_source(&self) -> PathBuf {
        self.standards().join("agents")
    }

    /// Source task templates.
    #[must_use]
    pub fn templates_source(&self) -> PathBuf {
        self.standards().join("tasks")
    }

    /// Source settings template.
    #[must_use]
    pub fn settings_template(&self) -> PathBuf {
        self.home_source().join(SETTINGS_DOCUMENT)
    }

    /// Source helper script.
    #[must_use]
    pub fn statusline_source(&self) -> PathBuf {
        self.home_source().join(STATUSLINE_SCRIPT)
    }

    /// Installed primary document.
    #[must_use]
    pub fn primary_target(&self) -> PathBuf {
        self.target_root.join(PRIMARY_DOCUMENT)
    }

    /// Installed rules directory.
    #[must_use]
    pub fn rules_target(&self) -> PathBuf {
        self.target_root.join("rules")
    }

    /// Installed agents directory.
    #[must_use]
    pub fn agents_target(&self) -> PathBuf {
        self.target_root.join("agents")
    }

    /// Installed global task templates directory.
    #[must_use]
    pub fn tasks_target(&self) -> PathBuf {
        self.target_root.join("tasks")
    }

    /// Installed settings document.
    #[must_use]
    pub fn settings_target(&self) -> PathBuf {
        self.target_root.join(SETTINGS_DOCUMENT)
    }

    /// Installed helper script.
    #[must_use]
    pub fn statusline_target(&self) -> PathBuf {
        self.target_root.join(STATUSLINE_SCRIPT)
    }

    /// Snapshot root.
    #[must_use]
    pub fn backups_dir(&self) -> PathBuf {
        self.target_root.join(BACKUPS_DIR)
    }

    /// Project task templates directory.
    #[must_use]
    pub fn project_tasks_dir(&self) -> PathBuf {
        self.project_dir.join("tasks")
    }

    /// Project settings document.
    #[must_use]
    pub fn project_settings(&self) -> PathBuf {
        self.project_dir.join(".claude").join(SETTINGS_DOCUMENT)
    }

    /// AWS CLI config consulted for the credential-profile warning.
    #[must_use]
    pub fn aws_config(&self) -> PathBuf {
        self.home.join(".aws").join("config")
    }

    /// Human-readable label for a path.
    ///
    /// Paths under the target root are shown relative to it (itself shown
    /// as `~/...` when under home), project paths relative to the project
    /// directory, other home paths as `~/...`, anything else absolute.
    #[must_use]
    pub fn label(&self, path: &Path) -> String {
        if let Ok(rest) = path.strip_prefix(&self.target_root) {
            let root = self.home_label(&self.target_root);
            return if rest.as_os_str().is_empty() {
                root
            } else {
                format!("{root}/{}", slashed(rest))
            };
        }
        if let Ok(rest) = path.strip_prefix(&self.project_dir) {
            return slashed(rest);
        }
        self.home_label(path)
    }

    fn home_label(&self, path: &Path) -> String {
        match path.strip_prefix(&self.home) {
            Ok(rest) if !self.home.as_os_str().is_empty() => format!("~/{}", slashed(rest)),
            _ => path.display().to_string(),
        }
    }
}

/// Join path components with `/` regardless of platform.
fn slashed(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
