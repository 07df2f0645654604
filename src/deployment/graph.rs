//! The resolved deployment graph and the merge algorithm that builds it.
use std::collections::BTreeMap;

use super::environment::EnvironmentSettings;
use super::host::HostManifest;
use super::overrides;
use super::profile::Profile;
use super::recipe::Recipe;
use super::tokens::TokenScope;
use crate::error::Result;

/// Fully merged hosts for one profile, after overrides and substitution.
///
/// Built once per read and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentGraph {
    profile: Profile,
    environment: EnvironmentSettings,
    recipes: Vec<Recipe>,
    hosts: BTreeMap<String, HostManifest>,
}

impl DeploymentGraph {
    /// Merge `recipes` (already in activation order) and layer the profile
    /// and environment on top.
    ///
    /// 1. Hosts are merged across recipes: references are unioned, a later
    ///    recipe's whole directive replaces an earlier one of the same type
    ///    and single properties a later recipe assigned overwrite only
    ///    those properties.
    /// 2. Profile overrides replace single properties.
    /// 3. Environment overrides replace single properties, so the
    ///    environment beats the profile, which beats the recipes.
    /// 4. `{token}` placeholders are substituted from environment data,
    ///    then profile data.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentError::ResolutionConflict`](crate::error::DeploymentError::ResolutionConflict)
    /// when an override names a host or directive no recipe established, and
    /// [`DeploymentError::UnresolvedToken`](crate::error::DeploymentError::UnresolvedToken)
    /// when a placeholder has no value.
    pub fn resolve(
        profile: Profile,
        environment: EnvironmentSettings,
        recipes: Vec<Recipe>,
    ) -> Result<Self> {
        let mut hosts: BTreeMap<String, HostManifest> = BTreeMap::new();
        for recipe in &recipes {
            for host in recipe.hosts() {
                match hosts.get_mut(host.name()) {
                    Some(existing) => existing.merge(host)?,
                    None => {
                        hosts.insert(host.name().to_string(), host.clone());
                    }
                }
            }
        }

        overrides::apply_all(&mut hosts, &profile.overrides)?;
        overrides::apply_all(&mut hosts, &environment.overrides)?;

        {
            let scope = TokenScope::new()
                .with_layer(&environment.data)
                .with_layer(&profile.data);
            for host in hosts.values_mut() {
                host.substitute_tokens(&scope)?;
            }
        }

        tracing::debug!(
            "resolved profile {} into {} host(s) from {} recipe(s)",
            profile.name,
            hosts.len(),
            recipes.len()
        );

        Ok(Self {
            profile,
            environment,
            recipes,
            hosts,
        })
    }

    /// The activated profile.
    #[must_use]
    pub const fn profile(&self) -> &Profile {
        &self.profile
    }

    /// The environment layered on top of the profile.
    #[must_use]
    pub const fn environment(&self) -> &EnvironmentSettings {
        &self.environment
    }

    /// Activated recipes in profile order, as persisted.
    #[must_use]
    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    /// Merged hosts ordered by name.
    pub fn hosts(&self) -> impl Iterator<Item = &HostManifest> {
        self.hosts.values()
    }

    /// The merged host called `name`.
    #[must_use]
    pub fn host(&self, name: &str) -> Option<&HostManifest> {
        self.hosts.get(name)
    }
}
