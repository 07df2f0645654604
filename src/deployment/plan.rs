//! The plan handed to an installation runner.
use super::DeploymentOptions;
use super::graph::DeploymentGraph;
use super::host::HostManifest;
use super::profile::Profile;
use super::recipe::Recipe;

/// Read-only view over a resolved [`DeploymentGraph`] for the options it was
/// read with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentPlan {
    options: DeploymentOptions,
    graph: DeploymentGraph,
}

impl DeploymentPlan {
    /// Wrap a resolved graph.
    #[must_use]
    pub const fn new(options: DeploymentOptions, graph: DeploymentGraph) -> Self {
        Self { options, graph }
    }

    /// Options the graph was read with.
    #[must_use]
    pub const fn options(&self) -> &DeploymentOptions {
        &self.options
    }

    /// The underlying graph.
    #[must_use]
    pub const fn graph(&self) -> &DeploymentGraph {
        &self.graph
    }

    /// The activated profile.
    #[must_use]
    pub const fn profile(&self) -> &Profile {
        self.graph.profile()
    }

    /// Every unique host across all activated recipes, fully resolved and
    /// ordered by name.
    pub fn hosts(&self) -> impl Iterator<Item = &HostManifest> {
        self.graph.hosts()
    }

    /// The resolved host called `name`.
    #[must_use]
    pub fn host(&self, name: &str) -> Option<&HostManifest> {
        self.graph.host(name)
    }

    /// Activated recipes in profile order, each with only the hosts it
    /// defines, as persisted.
    #[must_use]
    pub fn recipes(&self) -> &[Recipe] {
        self.graph.recipes()
    }

    /// Names of the activated recipes in profile order.
    pub fn recipe_names(&self) -> impl Iterator<Item = &str> {
        self.recipes().iter().map(Recipe::name)
    }
}
