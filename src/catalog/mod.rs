//! Source catalog: the managed items available in the read-only source tree.
pub mod metadata;

use anyhow::Result;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::resources::{ItemStatus, classify_paths};

/// Extension of catalog documents.
pub const EXTENSION: &str = "md";

/// One managed item discovered in a catalog directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceItem {
    /// File name including extension; unique within its directory.
    pub name: String,
    /// Location of the immutable source bytes.
    pub path: PathBuf,
    /// First heading, or the file stem.
    pub heading: String,
    /// Front-matter description, or empty.
    pub description: String,
    /// Front-matter model tag.
    pub model: Option<String>,
    /// Whether the item can never be deselected.
    pub mandatory: bool,
}

/// Discover catalog items in `dir`, sorted by name.
///
/// Only regular `.md` files are considered; symlinks and other files are
/// ignored. A missing or unreadable directory yields an empty catalog.
#[must_use]
pub fn discover(dir: &Path, mandatory: &BTreeSet<String>) -> Vec<SourceItem> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        tracing::debug!("catalog {} not found", dir.display());
        return Vec::new();
    };
    let mut items: Vec<SourceItem> = entries
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_ok_and(|t| t.is_file()))
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == EXTENSION))
        .filter_map(|path| {
            let name = path.file_name()?.to_str()?.to_string();
            Some(item(path, name, mandatory))
        })
        .collect();
    items.sort_by(|a, b| a.name.cmp(&b.name));
    items
}

fn item(path: PathBuf, name: String, mandatory: &BTreeSet<String>) -> SourceItem {
    let meta = metadata::read(&path);
    let heading = meta.heading.unwrap_or_else(|| {
        path.file_stem()
            .map_or_else(|| name.clone(), |s| s.to_string_lossy().into_owned())
    });
    SourceItem {
        mandatory: mandatory.contains(&name),
        name,
        path,
        heading,
        description: meta.description,
        model: meta.model,
    }
}

/// Rule and agent catalogs for one source root.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Rule documents.
    pub rules: Vec<SourceItem>,
    /// Agent definitions.
    pub agents: Vec<SourceItem>,
}

impl Catalog {
    /// Scan both catalogs of `config`'s source tree.
    #[must_use]
    pub fn load(config: &Config) -> Self {
        Self {
            rules: discover(&config.rules_source(), &config.manifest.mandatory.rules),
            agents: discover(&config.agents_source(), &config.manifest.mandatory.agents),
        }
    }

    /// Names of every rule.
    #[must_use]
    pub fn rule_names(&self) -> BTreeSet<String> {
        names(&self.rules)
    }

    /// Names of every agent.
    #[must_use]
    pub fn agent_names(&self) -> BTreeSet<String> {
        names(&self.agents)
    }
}

fn names(items: &[SourceItem]) -> BTreeSet<String> {
    items.iter().map(|i| i.name.clone()).collect()
}

/// Classify each item against its counterpart in `install_dir`.
///
/// # Errors
///
/// Returns an error if a source item or its installed copy cannot be read.
pub fn statuses<'a>(
    items: &'a [SourceItem],
    install_dir: &Path,
) -> Result<Vec<(&'a SourceItem, ItemStatus)>> {
    items
        .iter()
        .map(|item| Ok((item, classify_paths(&item.path, &install_dir.join(&item.name))?)))
        .collect()
}
