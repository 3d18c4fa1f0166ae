//! Command-line surface.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::selection::Scope;

/// Top-level CLI entry point for the standards installer.
#[derive(Parser, Debug)]
#[command(
    name = "dotai",
    about = "Diff-aware installer for managed AI coding standards",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print the run journal as JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Standards repository (default: $DOTAI_ROOT or auto-detected)
    #[arg(long, global = true)]
    pub source: Option<PathBuf>,

    /// Installation root (default: ~/.claude)
    #[arg(long, global = true)]
    pub target: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install or update the managed standards
    Install(InstallOpts),
    /// Restore a snapshot taken by an earlier run
    Restore(RestoreOpts),
    /// Remove the primary document, rules, agents and task templates
    Uninstall,
    /// Show catalog items with their install status, and snapshots
    Status,
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Install(_) => "install",
            Self::Restore(_) => "restore",
            Self::Uninstall => "uninstall",
            Self::Status => "status",
            Self::Version => "version",
        }
    }
}

/// Options for the `install` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct InstallOpts {
    /// Install target: global, project, both (or restore)
    #[arg(long, default_value_t = Scope::Global)]
    pub scope: Scope,

    /// Rules to install (default: all); mandatory rules are always kept
    #[arg(long, value_delimiter = ',')]
    pub rules: Option<Vec<String>>,

    /// Agents to install (default: all); mandatory agents are always kept
    #[arg(long, value_delimiter = ',')]
    pub agents: Option<Vec<String>>,

    /// Default model token written to settings ("none" leaves it alone)
    #[arg(long)]
    pub model: Option<String>,

    /// Do not install task templates
    #[arg(long)]
    pub no_tasks: bool,

    /// Grant read-only auto-approve permissions in the project
    #[arg(long)]
    pub auto_read: bool,
}

/// Options for the `restore` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct RestoreOpts {
    /// Snapshot id (YYYYMMDD-HHMMSS[-N]); newest when omitted
    pub id: Option<String>,
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_install_defaults() {
        let cli = Cli::parse_from(["dotai", "install"]);
        let Command::Install(opts) = cli.command else {
            panic!("expected install");
        };
        assert_eq!(opts.scope, Scope::Global);
        assert_eq!(opts.rules, None);
        assert!(!opts.no_tasks);
        assert!(!opts.auto_read);
    }

    #[test]
    fn parse_install_selection() {
        let cli = Cli::parse_from([
            "dotai",
            "install",
            "--scope",
            "both",
            "--rules",
            "a.md,b.md",
            "--agents",
            "x.md",
            "--model",
            "opus",
            "--no-tasks",
            "--auto-read",
        ]);
        let Command::Install(opts) = cli.command else {
            panic!("expected install");
        };
        assert_eq!(opts.scope, Scope::Both);
        assert_eq!(opts.rules, Some(vec!["a.md".to_string(), "b.md".to_string()]));
        assert_eq!(opts.agents, Some(vec!["x.md".to_string()]));
        assert_eq!(opts.model.as_deref(), Some("opus"));
        assert!(opts.no_tasks);
        assert!(opts.auto_read);
    }

    #[test]
    fn parse_invalid_scope_fails() {
        assert!(Cli::try_parse_from(["dotai", "install", "--scope", "nowhere"]).is_err());
    }

    #[test]
    fn parse_restore_with_id() {
        let cli = Cli::parse_from(["dotai", "restore", "20250101-120000"]);
        let Command::Restore(opts) = cli.command else {
            panic!("expected restore");
        };
        assert_eq!(opts.id.as_deref(), Some("20250101-120000"));
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["dotai", "status", "--json", "-v", "--target", "/tmp/t"]);
        assert!(cli.json);
        assert!(cli.verbose);
        assert_eq!(cli.global.target, Some(PathBuf::from("/tmp/t")));
        assert_eq!(cli.command.name(), "status");
    }

    #[test]
    fn parse_source_override() {
        let cli = Cli::parse_from(["dotai", "--source", "/repo", "uninstall"]);
        assert_eq!(cli.global.source, Some(PathBuf::from("/repo")));
        assert!(matches!(cli.command, Command::Uninstall));
    }
}
