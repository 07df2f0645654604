//! Profiles: named activations of recipes plus flat data and overrides.
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use super::grammar::{self, RECIPE_PREFIX, SettingsLine};
use super::overrides::PropertyOverride;
use super::{DeploymentSettings, PROFILE_EXTENSION};
use crate::error::{ArtifactKind, DeploymentError, Result};
use crate::settings::PropertyKey;

/// A named activation of an ordered list of recipes.
///
/// The text form is line oriented:
///
/// ```text
/// # comment
/// recipe:baseline
/// dbName=profile-db
/// h3.Website.site_name=profile-value
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    /// Profile name.
    pub name: String,
    /// Activated recipe names in declared order.
    pub recipes: Vec<String>,
    /// Flat key/value settings, also used as substitution input.
    pub data: BTreeMap<String, String>,
    /// Property overrides applied after recipe merging.
    pub overrides: Vec<PropertyOverride>,
}

impl Profile {
    /// An empty profile.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parse `text` into a fresh profile called `name`.
    ///
    /// # Errors
    ///
    /// See [`Profile::read_text`].
    pub fn parse(name: impl Into<String>, text: &str) -> Result<Self> {
        let mut profile = Self::new(name);
        profile.read_text(text)?;
        Ok(profile)
    }

    /// Parse `text` into this profile, appending to what it already holds.
    ///
    /// # Examples
    ///
    /// ```
    /// use milkman::deployment::Profile;
    ///
    /// let mut profile = Profile::new("something");
    /// profile.read_text("recipe:baseline").unwrap();
    /// profile.read_text("Key1=Value1").unwrap();
    /// profile.read_text("#a comment").unwrap();
    /// assert_eq!(profile.recipes, ["baseline"]);
    /// assert_eq!(profile.data["Key1"], "Value1");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentError::Format`] for a line that is neither a
    /// comment, a `recipe:` activation nor a `key=value` pair.
    pub fn read_text(&mut self, text: &str) -> Result<()> {
        let path = PathBuf::from(format!("{}.{PROFILE_EXTENSION}", self.name));
        self.read_from(text, &path)
    }

    fn read_from(&mut self, text: &str, path: &Path) -> Result<()> {
        for (line_num, line) in grammar::significant_lines(text) {
            match grammar::parse_settings_line(line, path, line_num)? {
                SettingsLine::Recipe(recipe) => self.recipes.push(recipe.to_string()),
                SettingsLine::Override(entry) => self.overrides.push(entry),
                SettingsLine::Data(key, value) => {
                    self.data.insert(key.to_string(), value.to_string());
                }
            }
        }
        Ok(())
    }

    /// Load `profiles/<name>.profile`.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentError::InvalidName`] if `name` cannot be a file
    /// stem, [`DeploymentError::NotFound`] if the file does not exist,
    /// [`DeploymentError::Io`] if it cannot be read and
    /// [`DeploymentError::Format`] if it cannot be parsed.
    pub fn load(settings: &DeploymentSettings, name: &str) -> Result<Self> {
        grammar::validate_name(name)?;
        let path = settings.profile_file(name);
        if !path.is_file() {
            return Err(DeploymentError::NotFound {
                kind: ArtifactKind::Profile,
                name: name.to_string(),
                path,
            });
        }
        let content = fs::read_to_string(&path).map_err(|e| DeploymentError::io(&path, e))?;
        let mut profile = Self::new(name);
        profile.read_from(&content, &path)?;
        tracing::debug!(
            "loaded profile {name}: {} recipe(s), {} data key(s), {} override(s)",
            profile.recipes.len(),
            profile.data.len(),
            profile.overrides.len()
        );
        Ok(profile)
    }

    /// Activate `recipe` after the ones already listed.
    pub fn add_recipe(&mut self, recipe: impl Into<String>) -> &mut Self {
        self.recipes.push(recipe.into());
        self
    }

    /// Override one property of `host`'s directive for this profile.
    pub fn add_property(
        &mut self,
        key: PropertyKey,
        host: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.overrides.push(PropertyOverride::new(host, key, value));
        self
    }

    /// Set a flat data value.
    pub fn set_data(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Render the profile artifact.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    pub(super) fn validate(&self) -> Result<()> {
        grammar::validate_name(&self.name)?;
        for recipe in &self.recipes {
            grammar::validate_name(recipe)?;
        }
        validate_data_and_overrides(&self.data, &self.overrides)
    }
}

/// Shared renderer for profile and environment artifacts.
pub(super) fn write_data_and_overrides(
    f: &mut fmt::Formatter<'_>,
    data: &BTreeMap<String, String>,
    overrides: &[PropertyOverride],
) -> fmt::Result {
    for (key, value) in data {
        writeln!(f, "{key}={value}")?;
    }
    for entry in overrides {
        writeln!(f, "{entry}")?;
    }
    Ok(())
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for recipe in &self.recipes {
            writeln!(f, "{RECIPE_PREFIX}{recipe}")?;
        }
        write_data_and_overrides(f, &self.data, &self.overrides)
    }
}

/// Reject data keys and values that would read back differently.
pub(super) fn validate_data_and_overrides(
    data: &BTreeMap<String, String>,
    overrides: &[PropertyOverride],
) -> Result<()> {
    for (key, value) in data {
        grammar::validate_name(key)?;
        if key.starts_with(RECIPE_PREFIX) || grammar::is_override_key(key) {
            return Err(DeploymentError::InvalidName {
                name: key.clone(),
                reason: "data key collides with recipe or override syntax",
            });
        }
        grammar::validate_value(value)?;
    }
    for entry in overrides {
        grammar::validate_name(&entry.host)?;
        grammar::validate_value(&entry.value)?;
    }
    Ok(())
}
