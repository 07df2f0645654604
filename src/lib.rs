//! Deployment-configuration engine.
//!
//! Operators describe which bottles (installable units) run on which hosts in
//! small text artifacts: reusable **recipes** of hosts, **profiles** that
//! activate recipes, and environment settings that override both. This crate
//! writes those artifacts, reads them back and resolves them into one merged
//! deployment plan.
//!
//! The public API is organised into these layers:
//!
//! - **[`settings`]**: typed directive shapes and the property accessor table
//! - **[`deployment`]**: data model, writer, reader, merge and plan
//! - **[`runner`]**: the boundary to the external installation runner
//! - **[`commands`]**: top-level subcommand orchestration (`init`, `plan`, `recipes`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod deployment;
pub mod error;
pub mod logging;
pub mod runner;
pub mod settings;

/// Version string: `MILKMAN_VERSION` at build time, else the package version.
#[must_use]
pub fn version() -> &'static str {
    option_env!("MILKMAN_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}
