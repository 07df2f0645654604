#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for writing a deployment and resolving it back.
//!
//! Every test writes the clonewars fixture (recipes r1..r4 over hosts
//! h1..h5) into a fresh temporary directory, optionally edits the persisted
//! artifacts, and reads the deployment through the public reader API.

mod common;

use std::collections::BTreeMap;
use std::fs;

use milkman::commands;
use milkman::config::Config;
use milkman::deployment::*;
use milkman::error::{ArtifactKind, DeploymentError};
use milkman::settings::{Database, Folder, Service, Website};

fn read_default(fixture: &common::Clonewars) -> Result<DeploymentPlan, DeploymentError> {
    let options = DeploymentOptions::new("default");
    let graph = DeploymentGraphReader::new(DeploymentSettings::new(fixture.root())).read(&options)?;
    Ok(DeploymentPlan::new(options, graph))
}

fn website<'a>(plan: &'a DeploymentPlan, host: &str) -> &'a Website {
    plan.host(host)
        .and_then(|h| h.directive::<Website>())
        .expect("host has a Website directive")
}

fn default_profile(fixture: &common::Clonewars) -> std::path::PathBuf {
    DeploymentSettings::new(fixture.root()).profile_file("default")
}

// ---------------------------------------------------------------------------
// End-to-end resolution
// ---------------------------------------------------------------------------

#[test]
fn got_all_the_unique_hosts() {
    let fixture = common::write_clonewars();
    let plan = read_default(&fixture).unwrap();
    let names: Vec<_> = plan.hosts().map(HostManifest::name).collect();
    assert_eq!(names, ["h1", "h2", "h3", "h4", "h5"]);
}

#[test]
fn recipes_are_listed_in_profile_order() {
    let fixture = common::write_clonewars();
    let plan = read_default(&fixture).unwrap();
    assert_eq!(plan.recipe_names().collect::<Vec<_>>(), ["r1", "r2", "r3", "r4"]);
    assert_eq!(plan.options().profile_name, "default");
}

#[test]
fn environment_settings_are_applied_to_a_host() {
    let fixture = common::write_clonewars();
    let plan = read_default(&fixture).unwrap();
    assert_eq!(website(&plan, "h4").virtual_dir, "env-value");
}

#[test]
fn tokens_are_substituted_from_environment_data() {
    let fixture = common::write_clonewars();
    let plan = read_default(&fixture).unwrap();
    let h5 = website(&plan, "h5");
    assert_eq!(h5.site_name, "*blue*");
    assert_eq!(h5.virtual_dir, "ten");
}

#[test]
fn first_recipe_host_keeps_directives_and_references() {
    let fixture = common::write_clonewars();
    let plan = read_default(&fixture).unwrap();
    let h1 = plan.host("h1").unwrap();

    assert_eq!(
        h1.directive::<Website>(),
        Some(&Website {
            site_name: "one".to_string(),
            virtual_dir: "two".to_string(),
        })
    );
    assert_eq!(
        h1.directive::<Service>(),
        Some(&Service {
            name: "Jeremy".to_string(),
            instances: 37,
        })
    );
    let bottles: Vec<_> = h1.references().map(|r| r.name.as_str()).collect();
    assert_eq!(bottles, ["bottle1", "bottle2"]);
    assert_eq!(plan.host("h2").unwrap().directive::<Folder>().unwrap().path, "North");
}

#[test]
fn recipes_sharing_a_host_merge_single_properties() {
    let fixture = common::write_clonewars();
    let plan = read_default(&fixture).unwrap();
    let h3 = plan.host("h3").unwrap();

    // r2 assigned site_name and r3 assigned virtual_dir; both survive.
    let site = h3.directive::<Website>().unwrap();
    assert_eq!(site.site_name, "one");
    assert_eq!(site.virtual_dir, "two");
    assert_eq!(h3.directive::<Database>().unwrap().server, "Austin");
}

#[test]
fn later_whole_directive_replaces_earlier_properties() {
    let fixture = common::write_clonewars();
    let settings = DeploymentSettings::new(fixture.root());
    fs::write(
        settings.recipe_dir("r3").join("h3.host"),
        "Website.site_name=\nWebsite.virtual_dir=three\n",
    )
    .unwrap();

    let plan = read_default(&fixture).unwrap();
    let site = website(&plan, "h3");
    assert_eq!(site.site_name, "");
    assert_eq!(site.virtual_dir, "three");
}

#[test]
fn shared_host_references_are_unioned_across_recipes() {
    let fixture = common::write_clonewars();
    let settings = DeploymentSettings::new(fixture.root());
    common::append(&settings.recipe_dir("r2").join("h1.host"), "bottle:bottle3\nbottle:bottle1\n");

    let plan = read_default(&fixture).unwrap();
    let bottles: Vec<_> = plan
        .host("h1")
        .unwrap()
        .references()
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(bottles, ["bottle1", "bottle2", "bottle3"]);
}

#[test]
fn reading_is_idempotent() {
    let fixture = common::write_clonewars();
    let before = fs::read_to_string(default_profile(&fixture)).unwrap();

    let first = read_default(&fixture).unwrap();
    let second = read_default(&fixture).unwrap();

    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(default_profile(&fixture)).unwrap(), before);
}

// ---------------------------------------------------------------------------
// Override precedence
// ---------------------------------------------------------------------------

#[test]
fn profile_override_beats_recipe() {
    let fixture = common::write_clonewars();
    common::append(&default_profile(&fixture), "h3.Website.site_name=profile-value\n");

    let plan = read_default(&fixture).unwrap();
    let h3 = website(&plan, "h3");
    assert_eq!(h3.site_name, "profile-value");
    assert_eq!(h3.virtual_dir, "two");
}

#[test]
fn environment_override_beats_profile() {
    let fixture = common::write_clonewars();
    common::append(&default_profile(&fixture), "h4.Website.virtual_dir=profile-value\n");

    let plan = read_default(&fixture).unwrap();
    assert_eq!(website(&plan, "h4").virtual_dir, "env-value");
}

#[test]
fn profile_data_fills_tokens_without_environment() {
    let fixture = common::write_clonewars();
    let settings = DeploymentSettings::new(fixture.root());
    fs::remove_file(settings.environment_file()).unwrap();
    common::append(&default_profile(&fixture), "dbName=profile-db\n");

    let plan = read_default(&fixture).unwrap();
    assert_eq!(website(&plan, "h5").site_name, "*profile-db*");
    assert_eq!(website(&plan, "h4").virtual_dir, "ten");
}

#[test]
fn environment_data_shadows_profile_data() {
    let fixture = common::write_clonewars();
    common::append(&default_profile(&fixture), "dbName=profile-db\n");

    let plan = read_default(&fixture).unwrap();
    assert_eq!(website(&plan, "h5").site_name, "*blue*");
}

// ---------------------------------------------------------------------------
// Failure paths
// ---------------------------------------------------------------------------

#[test]
fn override_of_missing_directive_is_a_conflict() {
    let fixture = common::write_clonewars();
    common::append(&default_profile(&fixture), "h2.Website.site_name=x\n");

    let err = read_default(&fixture).unwrap_err();
    assert!(matches!(
        err,
        DeploymentError::ResolutionConflict { ref host, ref settings, ref property }
            if host == "h2" && settings == "Website" && property == "site_name"
    ));
}

#[test]
fn override_of_unknown_host_is_a_conflict() {
    let fixture = common::write_clonewars();
    common::append(&default_profile(&fixture), "h9.Folder.path=/srv\n");

    let err = read_default(&fixture).unwrap_err();
    assert!(matches!(err, DeploymentError::ResolutionConflict { ref host, .. } if host == "h9"));
}

#[test]
fn unresolved_token_fails() {
    let fixture = common::write_clonewars();
    let settings = DeploymentSettings::new(fixture.root());
    fs::remove_file(settings.environment_file()).unwrap();

    let err = read_default(&fixture).unwrap_err();
    assert!(matches!(err, DeploymentError::UnresolvedToken { ref token, .. } if token == "dbName"));
}

#[test]
fn malformed_profile_line_reports_its_position() {
    let fixture = common::write_clonewars();
    common::append(&default_profile(&fixture), "this is not a setting\n");

    let err = read_default(&fixture).unwrap_err();
    assert!(matches!(err, DeploymentError::Format { line: 5, .. }), "{err}");
}

#[test]
fn missing_profile_is_not_found() {
    let fixture = common::write_clonewars();
    let options = DeploymentOptions::new("staging");
    let err = DeploymentGraphReader::new(DeploymentSettings::new(fixture.root()))
        .read(&options)
        .unwrap_err();
    assert!(matches!(
        err,
        DeploymentError::NotFound { kind: ArtifactKind::Profile, ref name, .. } if name == "staging"
    ));
}

#[test]
fn missing_recipe_is_not_found() {
    let fixture = common::write_clonewars();
    common::append(&default_profile(&fixture), "recipe:r9\n");

    let err = read_default(&fixture).unwrap_err();
    assert!(matches!(
        err,
        DeploymentError::NotFound { kind: ArtifactKind::Recipe, ref name, .. } if name == "r9"
    ));
}

#[test]
fn path_like_recipe_activation_is_rejected() {
    let fixture = common::write_clonewars();
    common::append(&default_profile(&fixture), "recipe:./r1\n");

    let err = read_default(&fixture).unwrap_err();
    assert!(matches!(err, DeploymentError::Format { line: 5, .. }), "{err}");
}

#[test]
fn profile_name_escaping_profiles_dir_is_rejected() {
    let fixture = common::write_clonewars();
    let options = DeploymentOptions::new("../profiles/default");
    let err = DeploymentGraphReader::new(DeploymentSettings::new(fixture.root()))
        .read(&options)
        .unwrap_err();
    assert!(matches!(err, DeploymentError::InvalidName { .. }), "{err}");
}

#[test]
fn repeated_recipe_is_loaded_once() {
    let fixture = common::write_clonewars();
    common::append(&default_profile(&fixture), "recipe:r1\n");

    let plan = read_default(&fixture).unwrap();
    assert_eq!(plan.recipe_names().collect::<Vec<_>>(), ["r1", "r2", "r3", "r4"]);
}

// ---------------------------------------------------------------------------
// Persisted form
// ---------------------------------------------------------------------------

#[test]
fn persisted_artifacts_match_the_grammar() {
    let fixture = common::write_clonewars();
    let settings = DeploymentSettings::new(fixture.root());

    assert_eq!(
        fs::read_to_string(settings.recipe_dir("r1").join("h1.host")).unwrap(),
        "Website.site_name=one\nWebsite.virtual_dir=two\n\
         Service.name=Jeremy\nService.instances=37\n\
         bottle:bottle1\nbottle:bottle2\n"
    );
    assert_eq!(
        fs::read_to_string(settings.profile_file("default")).unwrap(),
        "recipe:r1\nrecipe:r2\nrecipe:r3\nrecipe:r4\n"
    );
    assert_eq!(
        fs::read_to_string(settings.environment_file()).unwrap(),
        "dbName=blue\nh4.Website.virtual_dir=env-value\n"
    );
}

#[test]
fn recipes_round_trip_through_the_file_layout() {
    let fixture = common::write_clonewars();
    let recipes = read_recipes(&DeploymentSettings::new(fixture.root()).recipes_dir()).unwrap();

    let copy = tempfile::tempdir().unwrap();
    for recipe in &recipes {
        let dir = copy.path().join(recipe.name());
        recipe.write(&dir).unwrap();
        assert_eq!(&Recipe::load(&dir).unwrap(), recipe);
    }
}

#[test]
fn merge_flush_keeps_hand_written_recipes() {
    let fixture = common::write_clonewars();
    let settings = DeploymentSettings::new(fixture.root());
    let handmade = settings.recipe_dir("handmade");
    fs::create_dir_all(&handmade).unwrap();
    fs::write(handmade.join("h6.host"), "bottle:extra\n").unwrap();

    let mut writer = DeploymentWriter::new(fixture.root());
    common::define_clonewars(&mut writer);
    writer.flush(FlushMode::Merge).unwrap();

    let names: Vec<_> = read_recipes(&settings.recipes_dir())
        .unwrap()
        .iter()
        .map(|r| r.name().to_string())
        .collect();
    assert_eq!(names, ["handmade", "r1", "r2", "r3", "r4"]);
}

// ---------------------------------------------------------------------------
// Recipe reader
// ---------------------------------------------------------------------------

#[test]
fn recipe_reader_reads_all_the_recipes() {
    let fixture = common::write_clonewars();
    let recipes = read_recipes(&DeploymentSettings::new(fixture.root()).recipes_dir()).unwrap();

    let hosts: Vec<(&str, Vec<&str>)> = recipes
        .iter()
        .map(|r| (r.name(), r.hosts().map(HostManifest::name).collect()))
        .collect();
    assert_eq!(
        hosts,
        [
            ("r1", vec!["h1", "h2", "h3"]),
            ("r2", vec!["h3"]),
            ("r3", vec!["h3"]),
            ("r4", vec!["h4", "h5"]),
        ]
    );

    // No layering or substitution.
    let h5 = recipes[3].host("h5").unwrap().directive::<Website>().unwrap();
    assert_eq!(h5.site_name, "*{dbName}*");
}

#[test]
fn recipe_reader_substitutes_caller_data_only() {
    let fixture = common::write_clonewars();
    let data = BTreeMap::from([("dbName".to_string(), "green".to_string())]);
    let scope = TokenScope::new().with_layer(&data);

    let recipes =
        read_recipes_with(&DeploymentSettings::new(fixture.root()).recipes_dir(), &scope).unwrap();
    let h5 = recipes[3].host("h5").unwrap().directive::<Website>().unwrap();
    assert_eq!(h5.site_name, "*green*");
}

// ---------------------------------------------------------------------------
// Command-level resolution
// ---------------------------------------------------------------------------

#[test]
fn plan_command_uses_profile_from_deployment_toml() {
    let fixture = common::write_clonewars();
    let settings = DeploymentSettings::new(fixture.root());
    fs::write(settings.profile_file("staging"), "recipe:r4\n").unwrap();
    fs::write(settings.config_file(), "[defaults]\nprofile = \"staging\"\n").unwrap();

    let config = Config::load(&fixture.root(), None).unwrap();
    let plan = commands::plan::resolve(&config).unwrap();

    assert_eq!(plan.profile().name, "staging");
    let names: Vec<_> = plan.hosts().map(HostManifest::name).collect();
    assert_eq!(names, ["h4", "h5"]);
}

#[test]
fn plan_command_error_names_the_profile() {
    let fixture = common::write_clonewars();
    let config = Config::load(&fixture.root(), Some("missing")).unwrap();
    let err = commands::plan::resolve(&config).unwrap_err();
    assert!(format!("{err:#}").contains("resolving profile missing"));
}
