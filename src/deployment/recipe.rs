//! Recipes: named, reusable templates of hosts.
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::host::HostManifest;
use super::tokens::TokenScope;
use super::{HOST_EXTENSION, grammar};
use crate::error::{ArtifactKind, DeploymentError, Result};
use crate::settings::PropertyKey;

/// A named set of hosts, each host name unique within the recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    name: String,
    hosts: BTreeMap<String, HostManifest>,
}

impl Recipe {
    /// An empty recipe.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hosts: BTreeMap::new(),
        }
    }

    /// Recipe name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hosts ordered by name.
    pub fn hosts(&self) -> impl Iterator<Item = &HostManifest> {
        self.hosts.values()
    }

    /// The host called `name`, if defined here.
    #[must_use]
    pub fn host(&self, name: &str) -> Option<&HostManifest> {
        self.hosts.get(name)
    }

    /// Get or create the host called `name`.
    pub fn host_for(&mut self, name: &str) -> &mut HostManifest {
        self.hosts
            .entry(name.to_string())
            .or_insert_with(|| HostManifest::new(name))
    }

    /// Set one property on `host` within this recipe only, creating the host
    /// and a default directive of that type as needed.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentError::InvalidProperty`] if `value` does not fit
    /// the property's type.
    pub fn add_property(&mut self, key: PropertyKey, host: &str, value: &str) -> Result<&mut Self> {
        self.host_for(host).add_property(key, value)?;
        Ok(self)
    }

    /// Load the recipe persisted in `dir`; the directory name is the recipe
    /// name and every `<host>.host` file inside it is one host.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentError::NotFound`] if `dir` is not a directory,
    /// [`DeploymentError::Io`] on read failures and
    /// [`DeploymentError::Format`] for malformed host files.
    pub fn load(dir: &Path) -> Result<Self> {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !dir.is_dir() {
            return Err(DeploymentError::NotFound {
                kind: ArtifactKind::Recipe,
                name,
                path: dir.to_path_buf(),
            });
        }

        let mut recipe = Self::new(name);
        let entries = fs::read_dir(dir).map_err(|e| DeploymentError::io(dir, e))?;
        for entry in entries {
            let path = entry.map_err(|e| DeploymentError::io(dir, e))?.path();
            if path.extension().is_none_or(|ext| ext != HOST_EXTENSION) || !path.is_file() {
                tracing::debug!("skipping {}", path.display());
                continue;
            }
            let Some(host_name) = path.file_stem().map(|s| s.to_string_lossy().into_owned())
            else {
                continue;
            };
            let content =
                fs::read_to_string(&path).map_err(|e| DeploymentError::io(&path, e))?;
            let host = HostManifest::parse(host_name.clone(), &content, &path)?;
            recipe.hosts.insert(host_name, host);
        }
        tracing::debug!(
            "loaded recipe {} with {} host(s)",
            recipe.name,
            recipe.hosts.len()
        );
        Ok(recipe)
    }

    /// Write the recipe into `dir`, replacing whatever the directory held.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentError::Io`] if the directory cannot be replaced
    /// or a host file cannot be written.
    pub fn write(&self, dir: &Path) -> Result<()> {
        if dir.exists() {
            fs::remove_dir_all(dir).map_err(|e| DeploymentError::io(dir, e))?;
        }
        fs::create_dir_all(dir).map_err(|e| DeploymentError::io(dir, e))?;
        for host in self.hosts.values() {
            let path = dir.join(format!("{}.{HOST_EXTENSION}", host.name()));
            fs::write(&path, host.to_text()).map_err(|e| DeploymentError::io(&path, e))?;
        }
        Ok(())
    }

    /// Substitute placeholders in every host of this recipe.
    ///
    /// # Errors
    ///
    /// Returns the first error of [`HostManifest::substitute_tokens`].
    pub fn substitute_tokens(&mut self, scope: &TokenScope<'_>) -> Result<()> {
        self.hosts
            .values_mut()
            .try_for_each(|host| host.substitute_tokens(scope))
    }

    pub(super) fn validate(&self) -> Result<()> {
        grammar::validate_name(&self.name)?;
        self.hosts.values().try_for_each(HostManifest::validate)
    }
}
