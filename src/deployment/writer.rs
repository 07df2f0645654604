//! Building deployments in memory and flushing them to the persisted layout.
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::DeploymentSettings;
use super::environment::EnvironmentSettings;
use super::profile::Profile;
use super::recipe::Recipe;
use crate::error::{DeploymentError, Result};
use crate::settings::PropertyKey;

/// How [`DeploymentWriter::flush`] treats an existing deployment root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushMode {
    /// Write into the existing layout; recipes and profiles not held by the
    /// writer are left alone.
    Merge,
    /// Delete the root and recreate it before writing.
    Wipeout,
}

/// In-memory builder for recipes, profiles and environment settings.
///
/// Recipes and profiles are kept in name-keyed registries: asking for the
/// same name twice returns the same builder.
///
/// ```no_run
/// use milkman::deployment::{BottleReference, DeploymentWriter, FlushMode};
///
/// let mut writer = DeploymentWriter::new("clonewars");
/// writer
///     .recipe_for("r1")
///     .host_for("h1")
///     .add_reference(BottleReference::new("bottle1"));
/// writer.profile_for("default").add_recipe("r1");
/// writer.flush(FlushMode::Wipeout)?;
/// # Ok::<(), milkman::error::DeploymentError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DeploymentWriter {
    settings: DeploymentSettings,
    recipes: BTreeMap<String, Recipe>,
    profiles: BTreeMap<String, Profile>,
    environment: EnvironmentSettings,
}

impl DeploymentWriter {
    /// A writer targeting the deployment rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            settings: DeploymentSettings::new(root),
            recipes: BTreeMap::new(),
            profiles: BTreeMap::new(),
            environment: EnvironmentSettings::default(),
        }
    }

    /// Layout this writer flushes into.
    #[must_use]
    pub const fn settings(&self) -> &DeploymentSettings {
        &self.settings
    }

    /// Get or create the recipe called `name`.
    pub fn recipe_for(&mut self, name: &str) -> &mut Recipe {
        self.recipes
            .entry(name.to_string())
            .or_insert_with(|| Recipe::new(name))
    }

    /// Get or create the profile called `name`.
    pub fn profile_for(&mut self, name: &str) -> &mut Profile {
        self.profiles
            .entry(name.to_string())
            .or_insert_with(|| Profile::new(name))
    }

    /// Register an environment data value.
    pub fn add_environment_setting(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.environment.add_setting(key, value);
        self
    }

    /// Register an environment override of one property on `host`.
    pub fn add_environment_property(
        &mut self,
        key: PropertyKey,
        host: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.environment.add_property(key, host, value);
        self
    }

    /// Serialize everything held by the writer.
    ///
    /// All names and values are validated before anything touches the disk.
    /// Each recipe directory is replaced as a whole; profiles and the
    /// environment file are overwritten. An empty environment removes any
    /// environment file left by an earlier flush.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentError::InvalidName`] or
    /// [`DeploymentError::InvalidValue`] for content that would not read back
    /// identically, [`DeploymentError::DestructiveOperation`] if
    /// [`FlushMode::Wipeout`] cannot remove or recreate the root, and
    /// [`DeploymentError::Io`] for any other write failure.
    pub fn flush(&self, mode: FlushMode) -> Result<()> {
        self.validate()?;

        let root = self.settings.root();
        if mode == FlushMode::Wipeout {
            wipeout(root)?;
        }

        let recipes_dir = self.settings.recipes_dir();
        let profiles_dir = self.settings.profiles_dir();
        create_dir(&recipes_dir)?;
        create_dir(&profiles_dir)?;

        for recipe in self.recipes.values() {
            recipe.write(&self.settings.recipe_dir(recipe.name()))?;
        }
        for profile in self.profiles.values() {
            let path = self.settings.profile_file(&profile.name);
            fs::write(&path, profile.to_text()).map_err(|e| DeploymentError::io(&path, e))?;
        }
        let path = self.settings.environment_file();
        if !self.environment.is_empty() {
            fs::write(&path, self.environment.to_text())
                .map_err(|e| DeploymentError::io(&path, e))?;
        } else if path.exists() {
            tracing::debug!("removing stale {}", path.display());
            fs::remove_file(&path).map_err(|e| DeploymentError::io(&path, e))?;
        }

        tracing::debug!(
            "flushed {} recipe(s) and {} profile(s) to {} ({mode:?})",
            self.recipes.len(),
            self.profiles.len(),
            root.display()
        );
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        self.recipes.values().try_for_each(Recipe::validate)?;
        self.profiles.values().try_for_each(Profile::validate)?;
        self.environment.validate()
    }
}

fn wipeout(root: &Path) -> Result<()> {
    let destructive = |source: std::io::Error| DeploymentError::DestructiveOperation {
        path: root.to_path_buf(),
        source,
    };
    if root.exists() {
        tracing::debug!("removing {}", root.display());
        fs::remove_dir_all(root).map_err(destructive)?;
    }
    fs::create_dir_all(root).map_err(destructive)
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| DeploymentError::io(path, e))
}
