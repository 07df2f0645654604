//! Boundary to the installation runner that consumes a deployment plan.
//!
//! The gateway that actually installs or verifies bottles lives outside this
//! crate; [`InstallationRunner`] only selects the gateway call for the
//! requested [`InstallMode`] and reports the resulting log entries.
use std::fs;
use std::path::PathBuf;

use crate::error::{DeploymentError, Result};
use crate::logging::{Log, StepStatus};

/// Default name of the installation log written next to the application.
pub const INSTALLATION_LOG: &str = "installation.log";

/// What the runner asks the environment gateway to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum InstallMode {
    /// Install every bottle.
    #[default]
    Install,
    /// Only verify the environment.
    Check,
    /// Install, then verify.
    All,
}

/// One line of gateway output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentLogEntry {
    /// Whether the step succeeded.
    pub success: bool,
    /// What the step did.
    pub description: String,
    /// Detail captured while running the step, empty when there is none.
    pub trace: String,
}

impl EnvironmentLogEntry {
    /// A successful entry.
    pub fn success(description: impl Into<String>) -> Self {
        Self {
            success: true,
            description: description.into(),
            trace: String::new(),
        }
    }

    /// A failed entry carrying `trace`.
    pub fn failure(description: impl Into<String>, trace: impl Into<String>) -> Self {
        Self {
            success: false,
            description: description.into(),
            trace: trace.into(),
        }
    }
}

/// Input of one installation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallInput {
    /// Folder of the application being installed.
    pub app_folder: PathBuf,
    /// Gateway call to make.
    pub mode: InstallMode,
    /// Write the entries to [`log_file`](Self::log_file) instead of the
    /// console.
    pub open: bool,
    /// Where file output goes.
    pub log_file: PathBuf,
}

impl InstallInput {
    /// Input for `app_folder` with default mode and the log file inside it.
    pub fn new(app_folder: impl Into<PathBuf>) -> Self {
        let app_folder = app_folder.into();
        let log_file = app_folder.join(INSTALLATION_LOG);
        Self {
            app_folder,
            mode: InstallMode::default(),
            open: false,
            log_file,
        }
    }
}

/// The environment capability that installs and verifies bottles.
#[cfg_attr(test, mockall::automock)]
pub trait EnvironmentGateway {
    /// Install every bottle of the plan.
    fn install(&self) -> Vec<EnvironmentLogEntry>;
    /// Verify the environment without changing it.
    fn check_environment(&self) -> Vec<EnvironmentLogEntry>;
    /// Install, then verify.
    fn install_and_check_environment(&self) -> Vec<EnvironmentLogEntry>;
}

/// Reporting side of an installation run.
#[cfg_attr(test, mockall::automock)]
pub trait InstallationLogger {
    /// Show every entry on the console.
    fn write_logs_to_console(&self, entries: &[EnvironmentLogEntry]);
    /// Write every entry to the log file named by `input`.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentError::Io`] if the file cannot be written.
    fn write_logs_to_file(&self, input: &InstallInput, entries: &[EnvironmentLogEntry])
    -> Result<()>;
    /// Report overall success.
    fn write_success_to_console(&self);
    /// Report overall failure.
    fn write_failure_to_console(&self);
}

/// Runs one installation against a gateway and reports through a logger.
#[derive(Debug)]
pub struct InstallationRunner<G, L> {
    gateway: G,
    logger: L,
}

impl<G: EnvironmentGateway, L: InstallationLogger> InstallationRunner<G, L> {
    /// A runner over `gateway` reporting through `logger`.
    pub const fn new(gateway: G, logger: L) -> Self {
        Self { gateway, logger }
    }

    /// Call the gateway for `input.mode`, report the entries and return
    /// whether every entry succeeded.
    ///
    /// # Errors
    ///
    /// Returns any error of [`InstallationLogger::write_logs_to_file`].
    pub fn run_the_installation(&self, input: &InstallInput) -> Result<bool> {
        let entries = match input.mode {
            InstallMode::Install => self.gateway.install(),
            InstallMode::Check => self.gateway.check_environment(),
            InstallMode::All => self.gateway.install_and_check_environment(),
        };

        if input.open {
            self.logger.write_logs_to_file(input, &entries)?;
        } else {
            self.logger.write_logs_to_console(&entries);
        }

        let success = entries.iter().all(|e| e.success);
        if success {
            self.logger.write_success_to_console();
        } else {
            self.logger.write_failure_to_console();
        }
        Ok(success)
    }
}

/// [`InstallationLogger`] reporting through a [`Log`] backend, normally the
/// CLI [`Logger`](crate::logging::Logger).
#[derive(Debug, Clone, Copy)]
pub struct ConsoleInstallationLogger<'a> {
    log: &'a dyn Log,
}

impl<'a> ConsoleInstallationLogger<'a> {
    /// Report through `log`.
    #[must_use]
    pub const fn new(log: &'a dyn Log) -> Self {
        Self { log }
    }
}

/// Plain-text rendering of `entries`, one line each with traces indented
/// below.
fn render_entries(entries: &[EnvironmentLogEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let tag = if entry.success { "ok" } else { "failed" };
        out.push_str(&format!("[{tag}] {}\n", entry.description));
        for line in entry.trace.lines() {
            out.push_str(&format!("    {line}\n"));
        }
    }
    out
}

impl InstallationLogger for ConsoleInstallationLogger<'_> {
    fn write_logs_to_console(&self, entries: &[EnvironmentLogEntry]) {
        for entry in entries {
            let trace = entry.trace.trim();
            self.log.record_step(
                &entry.description,
                StepStatus::from_success(entry.success),
                (!trace.is_empty()).then_some(trace),
            );
        }
        self.log.print_summary();
    }

    fn write_logs_to_file(
        &self,
        input: &InstallInput,
        entries: &[EnvironmentLogEntry],
    ) -> Result<()> {
        let path = &input.log_file;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| DeploymentError::io(parent, e))?;
        }
        fs::write(path, render_entries(entries)).map_err(|e| DeploymentError::io(path, e))?;
        self.log
            .info(&format!("installation log written to {}", path.display()));
        Ok(())
    }

    fn write_success_to_console(&self) {
        self.log.stage("Installation succeeded");
    }

    fn write_failure_to_console(&self) {
        self.log.error("Installation failed");
    }
}
