//! Recipe/profile/host model, its persisted layout, and resolution into a
//! [`DeploymentPlan`].
//!
//! Layout of a deployment root:
//!
//! ```text
//! <root>/
//!   bottles/
//!   recipes/<recipe>/<host>.host
//!   profiles/<profile>.profile
//!   profiles/environment.settings
//!   deployment.toml
//! ```
pub mod environment;
mod grammar;
pub mod graph;
pub mod host;
pub mod overrides;
pub mod plan;
pub mod profile;
pub mod reader;
pub mod recipe;
pub mod tokens;
pub mod writer;

use std::path::{Path, PathBuf};

pub use environment::EnvironmentSettings;
pub use graph::DeploymentGraph;
pub use host::{BottleReference, HostManifest};
pub use overrides::PropertyOverride;
pub use plan::DeploymentPlan;
pub use profile::Profile;
pub use reader::{DeploymentGraphReader, read_recipes, read_recipes_with};
pub use recipe::Recipe;
pub use tokens::TokenScope;
pub use writer::{DeploymentWriter, FlushMode};

/// Directory holding one sub-directory per recipe.
pub const RECIPES_DIRECTORY: &str = "recipes";
/// Directory holding profile and environment artifacts.
pub const PROFILES_DIRECTORY: &str = "profiles";
/// Directory reserved for bottle payloads.
pub const BOTTLES_DIRECTORY: &str = "bottles";
/// Environment artifact inside [`PROFILES_DIRECTORY`].
pub const ENVIRONMENT_FILE: &str = "environment.settings";
/// Optional defaults file at the deployment root.
pub const CONFIG_FILE: &str = "deployment.toml";
/// Extension of profile artifacts.
pub const PROFILE_EXTENSION: &str = "profile";
/// Extension of host artifacts inside a recipe directory.
pub const HOST_EXTENSION: &str = "host";
/// Profile activated when none is requested.
pub const DEFAULT_PROFILE: &str = "default";

/// Location of a deployment on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentSettings {
    root: PathBuf,
}

impl DeploymentSettings {
    /// Settings rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The deployment root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/recipes`.
    #[must_use]
    pub fn recipes_dir(&self) -> PathBuf {
        self.root.join(RECIPES_DIRECTORY)
    }

    /// `<root>/profiles`.
    #[must_use]
    pub fn profiles_dir(&self) -> PathBuf {
        self.root.join(PROFILES_DIRECTORY)
    }

    /// `<root>/bottles`.
    #[must_use]
    pub fn bottles_dir(&self) -> PathBuf {
        self.root.join(BOTTLES_DIRECTORY)
    }

    /// `<root>/recipes/<name>`.
    #[must_use]
    pub fn recipe_dir(&self, name: &str) -> PathBuf {
        self.recipes_dir().join(name)
    }

    /// `<root>/profiles/<name>.profile`.
    #[must_use]
    pub fn profile_file(&self, name: &str) -> PathBuf {
        self.profiles_dir()
            .join(format!("{name}.{PROFILE_EXTENSION}"))
    }

    /// `<root>/profiles/environment.settings`.
    #[must_use]
    pub fn environment_file(&self) -> PathBuf {
        self.profiles_dir().join(ENVIRONMENT_FILE)
    }

    /// `<root>/deployment.toml`.
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }
}

/// Which profile a read should activate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentOptions {
    /// Name of the profile to resolve.
    pub profile_name: String,
}

impl DeploymentOptions {
    /// Options activating `profile_name`.
    pub fn new(profile_name: impl Into<String>) -> Self {
        Self {
            profile_name: profile_name.into(),
        }
    }
}

impl Default for DeploymentOptions {
    fn default() -> Self {
        Self::new(DEFAULT_PROFILE)
    }
}
