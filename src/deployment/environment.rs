//! Environment settings: the most specific scope, applied last.
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use super::grammar::{self, SettingsLine};
use super::overrides::PropertyOverride;
use super::profile::{validate_data_and_overrides, write_data_and_overrides};
use crate::error::{DeploymentError, Result};
use crate::settings::PropertyKey;

/// Deployment-target specific data and property overrides.
///
/// Shares the profile grammar except that `recipe:` lines are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentSettings {
    /// Flat key/value settings, consulted first during substitution.
    pub data: BTreeMap<String, String>,
    /// Property overrides applied after profile overrides.
    pub overrides: Vec<PropertyOverride>,
}

impl EnvironmentSettings {
    /// Whether the environment holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty() && self.overrides.is_empty()
    }

    /// Set a flat data value.
    pub fn add_setting(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Override one property of `host`'s directive.
    pub fn add_property(
        &mut self,
        key: PropertyKey,
        host: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.overrides.push(PropertyOverride::new(host, key, value));
        self
    }

    /// Parse environment text; `path` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentError::Format`] for unrecognized lines and for
    /// `recipe:` activations, which belong in a profile.
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let mut environment = Self::default();
        for (line_num, line) in grammar::significant_lines(text) {
            match grammar::parse_settings_line(line, path, line_num)? {
                SettingsLine::Recipe(_) => {
                    return Err(DeploymentError::format(
                        path,
                        line_num,
                        "recipe activations belong in a profile",
                    ));
                }
                SettingsLine::Override(entry) => environment.overrides.push(entry),
                SettingsLine::Data(key, value) => {
                    environment.data.insert(key.to_string(), value.to_string());
                }
            }
        }
        Ok(environment)
    }

    /// Load the environment artifact at `path`; a missing file yields empty
    /// settings.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentError::Io`] if the file exists but cannot be read
    /// and [`DeploymentError::Format`] if it cannot be parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("no environment settings at {}", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| DeploymentError::io(path, e))?;
        Self::parse(&content, path)
    }

    /// Render the environment artifact.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    pub(super) fn validate(&self) -> Result<()> {
        validate_data_and_overrides(&self.data, &self.overrides)
    }
}

impl fmt::Display for EnvironmentSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_data_and_overrides(f, &self.data, &self.overrides)
    }
}
