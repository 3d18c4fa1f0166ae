//! Status command: read-only view of the catalog against the target tree.
use anyhow::Result;
use serde::Serialize;

use super::CommandSetup;
use crate::catalog::{self, Catalog, SourceItem};
use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::logging::Logger;
use crate::snapshot::SnapshotManager;

/// One catalog item and its install status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemReport {
    /// File name.
    pub name: String,
    /// Heading shown to the user.
    pub heading: String,
    /// Front-matter model tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Whether the item is mandatory.
    pub mandatory: bool,
    /// Status badge, e.g. `UP TO DATE`.
    pub status: String,
}

/// One snapshot on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotReport {
    /// Snapshot id.
    pub id: String,
    /// Number of files captured.
    pub files: usize,
}

/// Everything the status command shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    /// Rule catalog.
    pub rules: Vec<ItemReport>,
    /// Agent catalog.
    pub agents: Vec<ItemReport>,
    /// Snapshots, newest first.
    pub snapshots: Vec<SnapshotReport>,
}

fn items(items: &[SourceItem], install_dir: &std::path::Path) -> Result<Vec<ItemReport>> {
    Ok(catalog::statuses(items, install_dir)?
        .into_iter()
        .map(|(item, status)| ItemReport {
            name: item.name.clone(),
            heading: item.heading.clone(),
            model: item.model.clone(),
            mandatory: item.mandatory,
            status: status.badge().to_string(),
        })
        .collect())
}

/// Build the status report. Nothing is written.
///
/// # Errors
///
/// Returns an error if a source or installed file, or the backups
/// directory, cannot be read.
pub fn report(config: &Config, catalog: &Catalog) -> Result<StatusReport> {
    let manager = SnapshotManager::new(&config.target_root, config.label(&config.target_root));
    let snapshots = manager
        .discover()?
        .into_iter()
        .map(|s| {
            Ok(SnapshotReport {
                files: s.files()?.len(),
                id: s.id,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(StatusReport {
        rules: items(&catalog.rules, &config.rules_target())?,
        agents: items(&catalog.agents, &config.agents_target())?,
        snapshots,
    })
}

fn render_items(log: &Logger, title: &str, items: &[ItemReport]) {
    log.stage(title);
    if items.is_empty() {
        log.info("(none)");
    }
    for item in items {
        let model = item
            .model
            .as_ref()
            .map_or_else(String::new, |m| format!(" ({m})"));
        let mandatory = if item.mandatory { " [mandatory]" } else { "" };
        log.info(&format!(
            "[{:<10}] {}  {}{model}{mandatory}",
            item.status, item.name, item.heading
        ));
    }
}

/// Run the status command.
///
/// # Errors
///
/// Returns an error if configuration loading or the report fails.
pub fn run(global: &GlobalOpts, log: &Logger, json: bool) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let report = report(&setup.config, &setup.catalog)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    render_items(log, "Rules", &report.rules);
    render_items(log, "Agents", &report.agents);
    log.stage("Snapshots");
    if report.snapshots.is_empty() {
        log.info("(none)");
    }
    for snapshot in &report.snapshots {
        log.info(&format!("{}  {} files", snapshot.id, snapshot.files));
    }
    Ok(())
}
