//! Command-line interface definition.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the milkman deployment engine.
#[derive(Parser, Debug)]
#[command(
    name = "milkman",
    about = "Resolve recipes, profiles and hosts into a deployment plan",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Deployment root directory
    #[arg(long, global = true, default_value = "deployment")]
    pub deployment: PathBuf,

    /// Profile to activate (defaults to deployment.toml, then "default")
    #[arg(short, long, global = true)]
    pub profile: Option<String>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an empty deployment directory layout
    Init(InitOpts),
    /// Resolve the active profile and print the deployment plan
    Plan(PlanOpts),
    /// List every recipe and the hosts it defines
    Recipes,
    /// Print version information
    Version,
}

/// Options for the `init` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct InitOpts {
    /// Delete an existing deployment directory first
    #[arg(long)]
    pub force: bool,
}

/// Options for the `plan` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct PlanOpts {
    /// Print the resolved hosts as JSON
    #[arg(long)]
    pub json: bool,
}

impl Command {
    /// Name used for the per-command log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Init(_) => "init",
            Self::Plan(_) => "plan",
            Self::Recipes => "recipes",
            Self::Version => "version",
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn deployment_defaults_to_local_directory() {
        let cli = Cli::parse_from(["milkman", "plan"]);
        assert_eq!(cli.global.deployment, PathBuf::from("deployment"));
        assert_eq!(cli.global.profile, None);
    }

    #[test]
    fn parse_plan_with_profile_short() {
        let cli = Cli::parse_from(["milkman", "-p", "staging", "plan", "--json"]);
        assert_eq!(cli.global.profile, Some("staging".to_string()));
        assert!(matches!(cli.command, Command::Plan(PlanOpts { json: true })));
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = Cli::parse_from(["milkman", "recipes", "--deployment", "/srv/clonewars"]);
        assert_eq!(cli.global.deployment, PathBuf::from("/srv/clonewars"));
        assert!(matches!(cli.command, Command::Recipes));
    }

    #[test]
    fn parse_init_force() {
        let cli = Cli::parse_from(["milkman", "init", "--force"]);
        assert!(matches!(cli.command, Command::Init(InitOpts { force: true })));
        assert_eq!(cli.command.name(), "init");
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["milkman", "version"]);
        assert!(matches!(cli.command, Command::Version));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::parse_from(["milkman", "-v", "recipes"]);
        assert!(cli.verbose);
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["milkman", "install"]).is_err());
    }
}
