//! Top-level subcommand orchestration.
pub mod init;
pub mod plan;
pub mod recipes;
pub mod version;

use anyhow::Result;
use std::io::Write as _;

use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::logging::Logger;

/// Shared state produced by the common command setup sequence.
#[derive(Debug)]
pub struct CommandSetup {
    /// Resolved deployment location and read options.
    pub config: Config,
}

impl CommandSetup {
    /// Resolve the deployment root and the profile to activate.
    ///
    /// # Errors
    ///
    /// Returns an error if `deployment.toml` exists but cannot be parsed.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        log.stage("Loading configuration");
        let config = Config::load(&global.deployment, global.profile.as_deref())?;
        log.info(&format!(
            "deployment: {}",
            config.settings.root().display()
        ));
        log.info(&format!("profile: {}", config.options.profile_name));
        Ok(Self { config })
    }
}

/// Write command output to stdout, outside the log stream.
///
/// # Errors
///
/// Returns an error if stdout is closed.
pub fn emit(text: &str) -> Result<()> {
    let mut out = std::io::stdout().lock();
    out.write_all(text.as_bytes())?;
    out.flush()?;
    Ok(())
}
