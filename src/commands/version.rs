//! Command: print version information.
use anyhow::Result;

/// Print the milkman version to stdout.
///
/// # Errors
///
/// Returns an error if stdout is closed.
pub fn run() -> Result<()> {
    super::emit(&format!("milkman {}\n", crate::version()))
}
