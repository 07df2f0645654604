//! Domain-specific error types for the deployment engine.
//!
//! Library modules return [`DeploymentError`] through the crate-wide
//! [`Result`] alias. Command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator and attach context there.
//!
//! # Error taxonomy
//!
//! ```text
//! DeploymentError
//! ├── NotFound              : profile or recipe missing on disk
//! ├── Format                : a persisted artifact cannot be parsed
//! ├── ResolutionConflict    : an override targets a directive never established
//! ├── UnresolvedToken       : a `{token}` placeholder has no value in scope
//! ├── InvalidProperty       : a value cannot be stored in a typed property
//! ├── UnknownSettingsType / UnknownProperty
//! ├── InvalidName / InvalidValue : writer input that would not round-trip
//! ├── DestructiveOperation  : a wipeout flush failed mid-way
//! └── Io                    : any other file-system failure
//! ```

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T, E = DeploymentError> = std::result::Result<T, E>;

/// The kind of artifact a [`DeploymentError::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// A profile file under `profiles/`.
    Profile,
    /// A recipe directory under `recipes/`.
    Recipe,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Profile => "profile",
            Self::Recipe => "recipe",
        })
    }
}

/// Errors raised while writing, reading or resolving a deployment.
#[derive(Error, Debug)]
pub enum DeploymentError {
    /// A referenced profile or recipe does not exist on disk.
    #[error("{kind} '{name}' not found at {}", .path.display())]
    NotFound {
        /// What was being looked up.
        kind: ArtifactKind,
        /// The name used as lookup key.
        name: String,
        /// Where it was expected.
        path: PathBuf,
    },

    /// A persisted artifact contains a line that cannot be parsed.
    #[error("invalid syntax in {} at line {line}: {message}", .path.display())]
    Format {
        /// File being parsed (empty for in-memory text).
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// Human-readable description of the problem.
        message: String,
    },

    /// A property override targets a host or directive type the recipes
    /// never established.
    #[error("cannot override {settings}.{property} on host '{host}': no {settings} directive")]
    ResolutionConflict {
        /// Target host.
        host: String,
        /// Settings type named by the override.
        settings: String,
        /// Property named by the override.
        property: String,
    },

    /// A `{token}` placeholder has no value in any scope.
    #[error("unresolved token '{{{token}}}' in value '{value}'")]
    UnresolvedToken {
        /// Token name without braces.
        token: String,
        /// The value containing the token.
        value: String,
    },

    /// A value cannot be parsed into the property's type.
    #[error("invalid value '{value}' for {settings}.{property}: {reason}")]
    InvalidProperty {
        /// Settings type.
        settings: String,
        /// Property name.
        property: String,
        /// The rejected value.
        value: String,
        /// Parser message.
        reason: String,
    },

    /// A settings type name is not registered.
    #[error("unknown settings type '{0}'")]
    UnknownSettingsType(String),

    /// A property name does not exist on the settings type.
    #[error("unknown property '{property}' on settings type {settings}")]
    UnknownProperty {
        /// Settings type.
        settings: String,
        /// The unknown property name.
        property: String,
    },

    /// A recipe, profile, host or key name cannot be persisted.
    #[error("invalid name '{name}': {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A value cannot be persisted without changing on read-back.
    #[error("invalid value '{value}': {reason}")]
    InvalidValue {
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Removing or recreating the deployment root during a wipeout failed.
    #[error("wipeout of {} failed: {source}", .path.display())]
    DestructiveOperation {
        /// The deployment root.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Any other I/O failure.
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl DeploymentError {
    /// Build an [`Io`](Self::Io) error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Build a [`Format`](Self::Format) error.
    pub fn format(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}
