//! Command-line entry point for dotai.
use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use dotai::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    let command = args.command.name();
    logging::init_subscriber(args.verbose, args.json, command);
    let log = Arc::new(logging::Logger::new(command));

    match &args.command {
        cli::Command::Install(opts) => commands::install::run(&args.global, opts, &log, args.json),
        cli::Command::Restore(opts) => commands::restore::run(&args.global, opts, &log, args.json),
        cli::Command::Uninstall => commands::uninstall::run(&args.global, &log, args.json),
        cli::Command::Status => commands::status::run(&args.global, &log, args.json),
        cli::Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
