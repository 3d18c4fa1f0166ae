//! What the user asked for: scope, items, model, and toggles.
//!
//! Front-ends (flags today) implement [`SelectionSource`] and hand a single
//! [`Selection`] to the engine. The engine re-validates mandatory items
//! itself before acting, whatever the front-end reports.
use anyhow::Result;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::catalog::{Catalog, SourceItem};
use crate::config::manifest::Manifest;

/// Where a run installs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// The per-user target root only.
    #[default]
    Global,
    /// The current project only.
    Project,
    /// Both global and project.
    Both,
    /// Restore a snapshot instead of installing.
    Restore,
}

impl Scope {
    /// Every scope token, in display order.
    pub const TOKENS: [&'static str; 4] = ["global", "project", "both", "restore"];

    /// Whether the run touches the per-user target root.
    #[must_use]
    pub const fn includes_global(self) -> bool {
        matches!(self, Self::Global | Self::Both)
    }

    /// Whether the run touches the current project.
    #[must_use]
    pub const fn includes_project(self) -> bool {
        matches!(self, Self::Project | Self::Both)
    }

    /// Scope token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Project => "project",
            Self::Both => "both",
            Self::Restore => "restore",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "global" => Ok(Self::Global),
            "project" => Ok(Self::Project),
            "both" => Ok(Self::Both),
            "restore" => Ok(Self::Restore),
            other => Err(format!(
                "unknown scope '{other}': expected one of {}",
                Self::TOKENS.join(", ")
            )),
        }
    }
}

/// A complete request handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Install target.
    pub scope: Scope,
    /// Selected rule file names.
    pub rules: BTreeSet<String>,
    /// Selected agent file names.
    pub agents: BTreeSet<String>,
    /// Default-model token, resolved through the manifest.
    pub model: String,
    /// Install task templates.
    pub create_tasks: bool,
    /// Install the project auto-approve read permissions.
    pub auto_read: bool,
    /// Snapshot id to restore; newest when `None`.
    pub snapshot: Option<String>,
}

impl Selection {
    /// Everything in `catalog`, global scope, default model, task templates on.
    #[must_use]
    pub fn everything(catalog: &Catalog, manifest: &Manifest) -> Self {
        Self {
            scope: Scope::Global,
            rules: catalog.rule_names(),
            agents: catalog.agent_names(),
            model: manifest.models.default.clone(),
            create_tasks: true,
            auto_read: false,
            snapshot: None,
        }
    }

    /// Re-add every mandatory catalog item missing from the selection.
    ///
    /// Returns the names that had to be re-added.
    pub fn enforce_mandatory(&mut self, catalog: &Catalog) -> Vec<String> {
        let mut restored = enforce_mandatory(&mut self.rules, &mandatory_names(&catalog.rules));
        restored.extend(enforce_mandatory(
            &mut self.agents,
            &mandatory_names(&catalog.agents),
        ));
        restored
    }
}

fn mandatory_names(items: &[SourceItem]) -> BTreeSet<String> {
    items
        .iter()
        .filter(|i| i.mandatory)
        .map(|i| i.name.clone())
        .collect()
}

/// Insert every name of `mandatory` into `selected`, returning those that
/// were missing.
pub fn enforce_mandatory(selected: &mut BTreeSet<String>, mandatory: &BTreeSet<String>) -> Vec<String> {
    mandatory
        .iter()
        .filter(|name| selected.insert((*name).clone()))
        .cloned()
        .collect()
}

/// A front-end that produces a [`Selection`].
pub trait SelectionSource {
    /// Build the selection against the discovered catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the front-end cannot produce a selection.
    fn select(&self, catalog: &Catalog, manifest: &Manifest) -> Result<Selection>;
}

/// Selection taken from command-line flags.
///
/// `None` item lists select the whole catalog.
#[derive(Debug, Clone, Default)]
pub struct FlagSelection {
    /// Requested scope.
    pub scope: Scope,
    /// `--rules`, if given.
    pub rules: Option<Vec<String>>,
    /// `--agents`, if given.
    pub agents: Option<Vec<String>>,
    /// `--model`, if given.
    pub model: Option<String>,
    /// `--no-tasks` inverted.
    pub create_tasks: bool,
    /// `--auto-read`.
    pub auto_read: bool,
    /// Snapshot id for restore.
    pub snapshot: Option<String>,
}

impl SelectionSource for FlagSelection {
    fn select(&self, catalog: &Catalog, manifest: &Manifest) -> Result<Selection> {
        let everything = Selection::everything(catalog, manifest);
        Ok(Selection {
            scope: self.scope,
            rules: pick(self.rules.as_deref(), everything.rules),
            agents: pick(self.agents.as_deref(), everything.agents),
            model: self.model.clone().unwrap_or(everything.model),
            create_tasks: self.create_tasks,
            auto_read: self.auto_read,
            snapshot: self.snapshot.clone(),
        })
    }
}

fn pick(requested: Option<&[String]>, all: BTreeSet<String>) -> BTreeSet<String> {
    requested.map_or(all, |names| {
        names
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .map(String::from)
            .collect()
    })
}
