//! Command: list every recipe and the hosts it defines.
use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::deployment::{DeploymentSettings, HostManifest, Recipe, read_recipes};
use crate::logging::Logger;

/// Run the `recipes` command.
///
/// # Errors
///
/// Returns an error if the recipes directory cannot be read or a recipe is
/// malformed.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let settings = DeploymentSettings::new(&global.deployment);
    let recipes_dir = settings.recipes_dir();

    log.stage("Reading recipes");
    let recipes = read_recipes(&recipes_dir)
        .with_context(|| format!("reading {}", recipes_dir.display()))?;
    log.info(&format!("found {} recipe(s)", recipes.len()));

    super::emit(&render(&recipes))
}

/// One line per recipe: its name followed by its hosts.
#[must_use]
pub fn render(recipes: &[Recipe]) -> String {
    recipes
        .iter()
        .map(|recipe| {
            let hosts: Vec<_> = recipe.hosts().map(HostManifest::name).collect();
            if hosts.is_empty() {
                format!("{}:\n", recipe.name())
            } else {
                format!("{}: {}\n", recipe.name(), hosts.join(", "))
            }
        })
        .collect()
}
