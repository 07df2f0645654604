//! Command: resolve the active profile and print the deployment plan.
use anyhow::{Context as _, Result};
use serde::Serialize;

use crate::cli::{GlobalOpts, PlanOpts};
use crate::config::Config;
use crate::deployment::{DeploymentGraphReader, DeploymentPlan, HostManifest};
use crate::logging::Logger;
use crate::settings::Directive;

/// Run the `plan` command.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or the deployment
/// cannot be resolved.
pub fn run(global: &GlobalOpts, opts: &PlanOpts, log: &Logger) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;

    log.stage("Resolving deployment");
    let plan = resolve(&setup.config)?;
    log.info(&format!(
        "{} host(s) from {} recipe(s)",
        plan.hosts().count(),
        plan.recipes().len()
    ));

    let output = if opts.json {
        render_json(&plan)?
    } else {
        render_text(&plan)
    };
    super::emit(&output)
}

/// Read and resolve the deployment described by `config`.
///
/// # Errors
///
/// Returns an error if any artifact is missing or malformed, or resolution
/// fails.
pub fn resolve(config: &Config) -> Result<DeploymentPlan> {
    let reader = DeploymentGraphReader::new(config.settings.clone());
    let graph = reader
        .read(&config.options)
        .with_context(|| format!("resolving profile {}", config.options.profile_name))?;
    Ok(DeploymentPlan::new(config.options.clone(), graph))
}

/// Human-readable plan: the profile, its recipes, then every host in the
/// host artifact syntax.
#[must_use]
pub fn render_text(plan: &DeploymentPlan) -> String {
    let mut out = format!(
        "profile: {}\nrecipes: {}\n",
        plan.profile().name,
        plan.recipe_names().collect::<Vec<_>>().join(", ")
    );
    for host in plan.hosts() {
        out.push_str(&format!("\n[{}]\n", host.name()));
        for line in host.to_text().lines() {
            out.push_str(&format!("  {line}\n"));
        }
    }
    out
}

#[derive(Serialize)]
struct PlanView<'a> {
    profile: &'a str,
    recipes: Vec<&'a str>,
    hosts: Vec<HostView<'a>>,
}

#[derive(Serialize)]
struct HostView<'a> {
    name: &'a str,
    directives: Vec<&'a Directive>,
    bottles: Vec<&'a str>,
}

impl<'a> From<&'a HostManifest> for HostView<'a> {
    fn from(host: &'a HostManifest) -> Self {
        Self {
            name: host.name(),
            directives: host.directives().collect(),
            bottles: host.references().map(|r| r.name.as_str()).collect(),
        }
    }
}

/// The plan as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(plan: &DeploymentPlan) -> Result<String> {
    let view = PlanView {
        profile: &plan.profile().name,
        recipes: plan.recipe_names().collect(),
        hosts: plan.hosts().map(HostView::from).collect(),
    };
    let mut json = serde_json::to_string_pretty(&view).context("serializing plan")?;
    json.push('\n');
    Ok(json)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::deployment::{
        BottleReference, DeploymentGraph, DeploymentOptions, EnvironmentSettings, Profile, Recipe,
    };
    use crate::settings::{Service, Settings, Website};

    fn sample_plan() -> DeploymentPlan {
        let mut r1 = Recipe::new("r1");
        r1.host_for("h1")
            .add_directive(Website {
                site_name: "one".to_string(),
                virtual_dir: "two".to_string(),
            })
            .add_reference(BottleReference::new("bottle1"));
        let mut r2 = Recipe::new("r2");
        r2.add_property(Service::key("instances").unwrap(), "h2", "3")
            .unwrap();
        let mut profile = Profile::new("default");
        profile.add_recipe("r1").add_recipe("r2");

        let graph =
            DeploymentGraph::resolve(profile, EnvironmentSettings::default(), vec![r1, r2])
                .unwrap();
        DeploymentPlan::new(DeploymentOptions::default(), graph)
    }

    #[test]
    fn text_rendering() {
        insta::assert_snapshot!(render_text(&sample_plan()), @r"
        profile: default
        recipes: r1, r2

        [h1]
          Website.site_name=one
          Website.virtual_dir=two
          bottle:bottle1

        [h2]
          Service.instances=3
        ");
    }

    #[test]
    fn json_rendering() {
        let json: serde_json::Value =
            serde_json::from_str(&render_json(&sample_plan()).unwrap()).unwrap();
        assert_eq!(json["profile"], "default");
        assert_eq!(json["recipes"], serde_json::json!(["r1", "r2"]));
        assert_eq!(json["hosts"][0]["name"], "h1");
        assert_eq!(json["hosts"][0]["bottles"], serde_json::json!(["bottle1"]));
        assert_eq!(
            json["hosts"][0]["directives"][0]["Website"]["site_name"],
            "one"
        );
        assert_eq!(json["hosts"][1]["directives"][0]["Service"]["instances"], 3);
    }
}
