//! Command: create an empty deployment layout.
use anyhow::{Context as _, Result};
use std::fs;

use crate::cli::{GlobalOpts, InitOpts};
use crate::deployment::DeploymentSettings;
use crate::error::{self, DeploymentError};
use crate::logging::Logger;

/// Create the deployment root with its `recipes/`, `bottles/` and
/// `profiles/` directories.
///
/// Returns `false` without touching anything when the root already exists
/// and `force` is not set; with `force` the existing root is deleted first.
///
/// # Errors
///
/// Returns [`DeploymentError::DestructiveOperation`] if a forced removal
/// fails and [`DeploymentError::Io`] if a directory cannot be created.
pub fn initialize(settings: &DeploymentSettings, force: bool) -> error::Result<bool> {
    let root = settings.root();
    if root.is_dir() {
        if !force {
            tracing::debug!("{} already exists", root.display());
            return Ok(false);
        }
        fs::remove_dir_all(root).map_err(|source| DeploymentError::DestructiveOperation {
            path: root.to_path_buf(),
            source,
        })?;
    }

    for dir in [
        root.to_path_buf(),
        settings.recipes_dir(),
        settings.bottles_dir(),
        settings.profiles_dir(),
    ] {
        fs::create_dir_all(&dir).map_err(|e| DeploymentError::io(&dir, e))?;
    }
    Ok(true)
}

/// Run the `init` command.
///
/// # Errors
///
/// Returns an error if the directory exists and `--force` was not given, or
/// if the layout cannot be created.
pub fn run(global: &GlobalOpts, opts: &InitOpts, log: &Logger) -> Result<()> {
    let settings = DeploymentSettings::new(&global.deployment);
    log.stage("Initializing deployment");
    let created = initialize(&settings, opts.force)
        .with_context(|| format!("initializing {}", settings.root().display()))?;
    if !created {
        anyhow::bail!(
            "{} already exists, use --force to replace it",
            settings.root().display()
        );
    }
    log.info(&format!("created {}", settings.root().display()));
    Ok(())
}
