//! Tasks that sync the primary document, rules, agents and helper script.
use anyhow::{Context as _, Result};
use std::collections::BTreeSet;
use std::path::Path;

use super::{Context, Task};
use crate::catalog::SourceItem;
use crate::error::{CatalogError, SyncError};
use crate::logging::LogEntry;
use crate::resources::helpers::fs::is_regular_file;
use crate::resources::managed_file::ManagedFile;
use crate::resources::Applicable;

/// Create the target root so later writes have somewhere to land.
#[derive(Debug)]
pub struct PrepareTargetRoot;

impl Task for PrepareTargetRoot {
    fn name(&self) -> &'static str {
        "Prepare target root"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.selection.scope.includes_global()
    }

    fn run(&self, ctx: &Context) -> Result<()> {
        let root = &ctx.config.target_root;
        std::fs::create_dir_all(root).map_err(|source| SyncError::TargetRoot {
            path: root.clone(),
            source,
        })?;
        ctx.log.debug(&format!("target root: {}", root.display()));
        Ok(())
    }
}

/// Install the primary document. Its absence in the source is fatal.
#[derive(Debug)]
pub struct InstallPrimaryDocument;

impl Task for InstallPrimaryDocument {
    fn name(&self) -> &'static str {
        "Install primary document"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.selection.scope.includes_global()
    }

    fn run(&self, ctx: &Context) -> Result<()> {
        let source = ctx.config.primary_source();
        if !is_regular_file(&source) {
            return Err(CatalogError::MissingPrimaryDocument { path: source }.into());
        }
        let dest = ctx.config.primary_target();
        let file = ManagedFile::new(source, dest.clone(), ctx.label(&dest));
        ctx.record(file.apply()?);
        Ok(())
    }
}

/// Install selected rules and remove deselected ones.
#[derive(Debug)]
pub struct SyncRules;

impl Task for SyncRules {
    fn name(&self) -> &'static str {
        "Sync rules"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.selection.scope.includes_global()
    }

    fn run(&self, ctx: &Context) -> Result<()> {
        sync_items(
            ctx,
            &ctx.catalog.rules,
            &ctx.selection.rules,
            &ctx.config.rules_target(),
        )
    }
}

/// Install selected agents and remove deselected ones.
#[derive(Debug)]
pub struct SyncAgents;

impl Task for SyncAgents {
    fn name(&self) -> &'static str {
        "Sync agents"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.selection.scope.includes_global()
    }

    fn run(&self, ctx: &Context) -> Result<()> {
        sync_items(
            ctx,
            &ctx.catalog.agents,
            &ctx.selection.agents,
            &ctx.config.agents_target(),
        )
    }
}

/// Mirror `selected` catalog items into `dest_dir`.
///
/// Deselected items that are installed are backed up and removed; selected
/// names the catalog does not know produce a `warning`.
fn sync_items(
    ctx: &Context,
    items: &[SourceItem],
    selected: &BTreeSet<String>,
    dest_dir: &Path,
) -> Result<()> {
    for item in items {
        let dest = dest_dir.join(&item.name);
        let file = ManagedFile::new(item.path.clone(), dest.clone(), ctx.label(&dest));
        if selected.contains(&item.name) {
            ctx.record(file.apply()?);
        } else if let Some(entry) = file.remove()? {
            ctx.record(entry);
        }
    }
    let known: BTreeSet<&str> = items.iter().map(|i| i.name.as_str()).collect();
    for name in selected.iter().filter(|n| !known.contains(n.as_str())) {
        ctx.record(LogEntry::warning(format!(
            "{} (not in catalog)",
            ctx.label(&dest_dir.join(name))
        )));
    }
    Ok(())
}

/// Install the status line helper script and mark it executable.
#[derive(Debug)]
pub struct InstallStatusline;

impl Task for InstallStatusline {
    fn name(&self) -> &'static str {
        "Install status line"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.selection.scope.includes_global() && is_regular_file(&ctx.config.statusline_source())
    }

    fn run(&self, ctx: &Context) -> Result<()> {
        let dest = ctx.config.statusline_target();
        let file = ManagedFile::new(ctx.config.statusline_source(), dest.clone(), ctx.label(&dest));
        let entry = file.apply()?;
        make_executable(&dest)?;
        ctx.record(entry);
        Ok(())
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt as _;
    let mut perms = std::fs::metadata(path)
        .with_context(|| format!("reading metadata: {}", path.display()))?
        .permissions();
    let mode = perms.mode();
    if mode & 0o111 != 0o111 {
        perms.set_mode(mode | 0o111);
        std::fs::set_permissions(path, perms)
            .with_context(|| format!("chmod {}", path.display()))?;
    }
    Ok(())
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
