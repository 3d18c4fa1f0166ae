//! Diff-aware installer for managed AI coding standards.
//!
//! Reconciles a read-only standards tree (a primary document, rule and
//! agent documents, task templates, a settings template) against a per-user
//! installation root with the smallest reversible set of writes.
//!
//! The public API is organised into layers:
//!
//! - **[`catalog`]**: discover source items and their metadata
//! - **[`resources`]**: status classification and idempotent install/remove primitives
//! - **[`settings`]**: tolerant settings documents and the two-pass merge
//! - **[`snapshot`]**: timestamped snapshots and contained restore
//! - **[`selection`]**: front-end requests and mandatory-item enforcement
//! - **[`tasks`]**: named steps of a run over a shared journal
//! - **[`commands`]**: top-level subcommand orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod repository;
pub mod resources;
pub mod selection;
pub mod settings;
pub mod snapshot;
pub mod tasks;
