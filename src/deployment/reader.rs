//! Reading persisted deployments back into memory.
use std::fs;
use std::path::Path;

use super::environment::EnvironmentSettings;
use super::graph::DeploymentGraph;
use super::profile::Profile;
use super::recipe::Recipe;
use super::tokens::TokenScope;
use super::{DeploymentOptions, DeploymentSettings};
use crate::error::{DeploymentError, Result};

/// Reads a profile and its recipes from disk and resolves them into a
/// [`DeploymentGraph`].
///
/// Every call re-reads the files; nothing is cached between reads and the
/// persisted artifacts are never modified.
#[derive(Debug, Clone)]
pub struct DeploymentGraphReader {
    settings: DeploymentSettings,
}

impl DeploymentGraphReader {
    /// A reader for the deployment described by `settings`.
    #[must_use]
    pub const fn new(settings: DeploymentSettings) -> Self {
        Self { settings }
    }

    /// Load the profile named in `options`, the environment and every
    /// activated recipe, then resolve them.
    ///
    /// A recipe activated more than once is loaded once, at its first
    /// position.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentError::NotFound`] for a missing profile or recipe,
    /// [`DeploymentError::Format`] for malformed artifacts, and any error of
    /// [`DeploymentGraph::resolve`].
    pub fn read(&self, options: &DeploymentOptions) -> Result<DeploymentGraph> {
        let profile = Profile::load(&self.settings, &options.profile_name)?;
        let environment = EnvironmentSettings::load(&self.settings.environment_file())?;

        let mut recipes: Vec<Recipe> = Vec::with_capacity(profile.recipes.len());
        for name in &profile.recipes {
            if recipes.iter().any(|r| r.name() == name) {
                tracing::debug!("recipe {name} already activated, skipping repeat");
                continue;
            }
            recipes.push(Recipe::load(&self.settings.recipe_dir(name))?);
        }

        DeploymentGraph::resolve(profile, environment, recipes)
    }
}

/// Enumerate and load every recipe under `recipes_dir`, ordered by name,
/// without any profile or environment layering.
///
/// # Errors
///
/// Returns [`DeploymentError::Io`] if the directory cannot be listed and
/// any error of [`Recipe::load`].
pub fn read_recipes(recipes_dir: &Path) -> Result<Vec<Recipe>> {
    let entries = fs::read_dir(recipes_dir).map_err(|e| DeploymentError::io(recipes_dir, e))?;
    let mut dirs = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| DeploymentError::io(recipes_dir, e))?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    dirs.iter().map(|dir| Recipe::load(dir)).collect()
}

/// Like [`read_recipes`], then substitute placeholders in every host using
/// only the caller-supplied `scope`.
///
/// # Errors
///
/// Returns any error of [`read_recipes`], plus
/// [`DeploymentError::UnresolvedToken`] for placeholders `scope` cannot fill.
pub fn read_recipes_with(recipes_dir: &Path, scope: &TokenScope<'_>) -> Result<Vec<Recipe>> {
    let mut recipes = read_recipes(recipes_dir)?;
    for recipe in &mut recipes {
        recipe.substitute_tokens(scope)?;
    }
    Ok(recipes)
}
