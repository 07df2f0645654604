//! Single-property overrides layered on top of recipe directives.
use std::collections::BTreeMap;
use std::fmt;

use super::host::HostManifest;
use crate::error::Result;
use crate::settings::PropertyKey;

/// Replace one property of one host's directive.
///
/// Persisted as `<host>.<Type>.<property>=<value>` in profile and
/// environment artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyOverride {
    /// Target host name.
    pub host: String,
    /// Target settings type and property.
    pub key: PropertyKey,
    /// Replacement value.
    pub value: String,
}

impl PropertyOverride {
    /// Build an override.
    pub fn new(host: impl Into<String>, key: PropertyKey, value: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            key,
            value: value.into(),
        }
    }
}

impl fmt::Display for PropertyOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}={}", self.host, self.key, self.value)
    }
}

/// Apply `overrides` in order to `hosts`.
///
/// # Errors
///
/// Returns [`DeploymentError::ResolutionConflict`](crate::error::DeploymentError::ResolutionConflict)
/// when the host or its directive of the named type does not exist, and
/// [`DeploymentError::InvalidProperty`](crate::error::DeploymentError::InvalidProperty)
/// when the value does not fit the property's type.
pub fn apply_all(
    hosts: &mut BTreeMap<String, HostManifest>,
    overrides: &[PropertyOverride],
) -> Result<()> {
    for entry in overrides {
        let host = hosts
            .get_mut(&entry.host)
            .ok_or_else(|| HostManifest::conflict(&entry.host, entry.key))?;
        host.override_property(entry.key, &entry.value)?;
        tracing::debug!("override {entry}");
    }
    Ok(())
}
