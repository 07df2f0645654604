// Shared helpers for integration tests.
//
// Writes the "clonewars" deployment used across the integration suites into
// a temporary directory, so each test reads a fresh, isolated layout.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use milkman::deployment::{BottleReference, DeploymentWriter, FlushMode};
use milkman::settings::{Database, Folder, Service, Settings, Website};

/// An isolated deployment root backed by a [`tempfile::TempDir`].
///
/// The directory is deleted when dropped.
pub struct Clonewars {
    /// Temporary directory holding the deployment root.
    pub dir: tempfile::TempDir,
}

impl Clonewars {
    /// Path of the deployment root inside the temporary directory.
    pub fn root(&self) -> PathBuf {
        self.dir.path().join("clonewars")
    }
}

/// Populate `writer` with four recipes over hosts h1..h5, the default
/// profile activating them in order, and environment settings for h4 and
/// the `dbName` token.
pub fn define_clonewars(writer: &mut DeploymentWriter) {
    let r1 = writer.recipe_for("r1");
    r1.host_for("h1")
        .add_directive(Website {
            site_name: "one".to_string(),
            virtual_dir: "two".to_string(),
        })
        .add_directive(Service {
            name: "Jeremy".to_string(),
            instances: 37,
        })
        .add_reference(BottleReference::new("bottle1"))
        .add_reference(BottleReference::new("bottle2"));
    r1.add_property(Folder::key("path").expect("key"), "h2", "North")
        .expect("r1 h2");
    r1.add_property(Database::key("server").expect("key"), "h3", "Austin")
        .expect("r1 h3");

    let site_name = Website::key("site_name").expect("key");
    let virtual_dir = Website::key("virtual_dir").expect("key");
    writer
        .recipe_for("r2")
        .add_property(site_name, "h3", "one")
        .expect("r2");
    writer
        .recipe_for("r3")
        .add_property(virtual_dir, "h3", "two")
        .expect("r3");
    let r4 = writer.recipe_for("r4");
    r4.add_property(virtual_dir, "h4", "ten").expect("r4 h4");
    r4.add_property(virtual_dir, "h5", "ten").expect("r4 h5");
    r4.add_property(site_name, "h5", "*{dbName}*").expect("r4 h5");

    writer
        .add_environment_property(virtual_dir, "h4", "env-value")
        .add_environment_setting("dbName", "blue");

    let profile = writer.profile_for("default");
    for recipe in ["r1", "r2", "r3", "r4"] {
        profile.add_recipe(recipe);
    }
}

/// Write the clonewars deployment with [`FlushMode::Wipeout`].
pub fn write_clonewars() -> Clonewars {
    let dir = tempfile::tempdir().expect("create temp dir");
    let fixture = Clonewars { dir };
    let mut writer = DeploymentWriter::new(fixture.root());
    define_clonewars(&mut writer);
    writer.flush(FlushMode::Wipeout).expect("flush clonewars");
    fixture
}

/// Append `text` to the file at `path`.
pub fn append(path: &Path, text: &str) {
    let mut content = std::fs::read_to_string(path).unwrap_or_default();
    content.push_str(text);
    std::fs::write(path, content).expect("append to file");
}
