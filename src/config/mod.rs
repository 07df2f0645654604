//! Runtime configuration: CLI flags layered over the optional
//! `deployment.toml` at the deployment root.
pub mod toml_loader;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::deployment::{CONFIG_FILE, DEFAULT_PROFILE, DeploymentOptions, DeploymentSettings};

/// Contents of `deployment.toml`.
///
/// ```toml
/// [defaults]
/// profile = "staging"
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DeploymentConfig {
    /// Values used when the command line does not say otherwise.
    pub defaults: Defaults,
}

/// The `[defaults]` table.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Defaults {
    /// Profile activated when `--profile` is not given.
    pub profile: Option<String>,
}

/// Everything a command needs to locate and read a deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Layout of the deployment on disk.
    pub settings: DeploymentSettings,
    /// Read options, including the profile to activate.
    pub options: DeploymentOptions,
}

impl Config {
    /// Resolve configuration for the deployment at `root`.
    ///
    /// The profile is `profile` when given, else `[defaults] profile` from
    /// `deployment.toml`, else `"default"`.
    ///
    /// # Errors
    ///
    /// Returns an error if `deployment.toml` exists but cannot be read or
    /// parsed.
    pub fn load(root: &Path, profile: Option<&str>) -> Result<Self> {
        let settings = DeploymentSettings::new(root);
        let file: DeploymentConfig = toml_loader::load_config(&settings.config_file())
            .with_context(|| format!("loading {CONFIG_FILE}"))?;

        let profile_name = profile
            .map(str::to_string)
            .or(file.defaults.profile)
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string());
        tracing::debug!("using profile {profile_name} from {}", root.display());

        Ok(Self {
            settings,
            options: DeploymentOptions::new(profile_name),
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn profile_falls_back_to_default() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load(tmp.path(), None).unwrap();
        assert_eq!(config.options.profile_name, "default");
        assert_eq!(config.settings.root(), tmp.path());
    }

    #[test]
    fn profile_from_deployment_toml() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "[defaults]\nprofile = \"staging\"\n",
        )
        .unwrap();
        let config = Config::load(tmp.path(), None).unwrap();
        assert_eq!(config.options.profile_name, "staging");
    }

    #[test]
    fn flag_beats_deployment_toml() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "[defaults]\nprofile = \"staging\"\n",
        )
        .unwrap();
        let config = Config::load(tmp.path(), Some("production")).unwrap();
        assert_eq!(config.options.profile_name, "production");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[defaults]\nprofil = \"x\"\n").unwrap();
        let err = Config::load(tmp.path(), None).unwrap_err();
        assert!(format!("{err:#}").contains(CONFIG_FILE));
    }
}
