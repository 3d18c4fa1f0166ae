//! Optional `standards/dotai.toml` manifest.
//!
//! Every section is optional; an absent file or section reproduces the
//! built-in defaults below.
//!
//! ```toml
//! [mandatory]
//! rules = ["security.md"]
//! agents = ["security-auditor.md", "compliance-reviewer.md"]
//!
//! [models]
//! default = "sonnet"
//! choices = { sonnet = "us.anthropic.claude-sonnet-4-6" }
//!
//! [tasks]
//! templates = ["lessons.md", "todo.md"]
//!
//! [settings]
//! merge_tables = ["env"]
//! permission_lists = ["allow", "deny", "ask"]
//! permission_scalars = ["defaultMode", "disableBypassPermissionsMode"]
//!
//! [project]
//! auto_read_allow = ["Read", "Glob", "Grep"]
//! ```
use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::settings::SettingsPolicy;

/// Model token meaning "leave the model key alone".
pub const NO_MODEL: &str = "none";

/// Parsed manifest.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Manifest {
    /// Items that can never be deselected.
    pub mandatory: Mandatory,
    /// Model tokens offered to the front-end.
    pub models: Models,
    /// Task template file names.
    pub tasks: Tasks,
    /// Authoritative keys of the settings merge.
    pub settings: SettingsPolicy,
    /// Project-scope options.
    pub project: Project,
}

/// `[mandatory]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Mandatory {
    /// Mandatory rule file names.
    pub rules: BTreeSet<String>,
    /// Mandatory agent file names.
    pub agents: BTreeSet<String>,
}

impl Default for Mandatory {
    fn default() -> Self {
        Self {
            rules: ["security.md"].into_iter().map(String::from).collect(),
            agents: ["security-auditor.md", "compliance-reviewer.md"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// `[models]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Models {
    /// Token used when the front-end does not choose one.
    pub default: String,
    /// Token to model identifier.
    pub choices: BTreeMap<String, String>,
}

impl Default for Models {
    fn default() -> Self {
        Self {
            default: "sonnet".to_string(),
            choices: [
                ("sonnet", "us.anthropic.claude-sonnet-4-6"),
                ("opus", "us.anthropic.claude-opus-4-6-v1"),
                ("haiku", "us.anthropic.claude-haiku-4-5-20251001-v1:0"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        }
    }
}

impl Models {
    /// Resolve a model token to the identifier written into settings.
    ///
    /// [`NO_MODEL`] resolves to `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownModel`] for any other unknown token.
    pub fn resolve(&self, token: &str) -> Result<Option<String>, ConfigError> {
        if token == NO_MODEL {
            return Ok(None);
        }
        self.choices
            .get(token)
            .map(|id| Some(id.clone()))
            .ok_or_else(|| ConfigError::UnknownModel {
                token: token.to_string(),
                choices: self.tokens(),
            })
    }

    /// Every accepted token, including [`NO_MODEL`].
    #[must_use]
    pub fn tokens(&self) -> Vec<String> {
        self.choices
            .keys()
            .cloned()
            .chain(std::iter::once(NO_MODEL.to_string()))
            .collect()
    }
}

/// `[tasks]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tasks {
    /// Template file names under `standards/tasks/`.
    pub templates: Vec<String>,
}

impl Default for Tasks {
    fn default() -> Self {
        Self {
            templates: vec!["lessons.md".to_string(), "todo.md".to_string()],
        }
    }
}

/// `[project]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Project {
    /// Permissions granted by `--auto-read`.
    pub auto_read_allow: Vec<String>,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            auto_read_allow: [
                "Read",
                "Glob",
                "Grep",
                "Bash(ls:*)",
                "Bash(git diff:*)",
                "Bash(git log:*)",
                "Bash(git status:*)",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}
