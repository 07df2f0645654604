//! Line grammar shared by profile, environment and host artifacts.
//!
//! Every artifact is line oriented: lines are trimmed, blank lines and lines
//! starting with `#` are ignored. There is no quoting, escaping or
//! continuation.
use std::path::Path;

use super::overrides::PropertyOverride;
use crate::error::{DeploymentError, Result};
use crate::settings::{PropertyKey, SettingsTypeId};

/// Prefix of a recipe activation line in a profile.
pub(super) const RECIPE_PREFIX: &str = "recipe:";
/// Prefix of a bottle reference line in a host artifact.
pub(super) const BOTTLE_PREFIX: &str = "bottle:";

/// Iterate the significant lines of `content` as `(line number, trimmed line)`.
pub(super) fn significant_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

/// Split `key=value` on the first `=`, trimming both sides.
pub(super) fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim()))
}

/// One significant line of a profile or environment artifact.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum SettingsLine<'a> {
    /// `recipe:<name>`
    Recipe(&'a str),
    /// `<host>.<Type>.<property>=<value>`
    Override(PropertyOverride),
    /// Any other `<key>=<value>`.
    Data(&'a str, &'a str),
}

/// Classify one significant line of a profile or environment artifact.
///
/// A key is an override when its last two dot-separated segments name a
/// registered settings type and one of its properties; the host part may
/// itself contain dots.
pub(super) fn parse_settings_line<'a>(
    line: &'a str,
    path: &Path,
    line_num: usize,
) -> Result<SettingsLine<'a>> {
    if let Some(recipe) = line.strip_prefix(RECIPE_PREFIX) {
        let recipe = recipe.trim();
        validate_name(recipe)
            .map_err(|e| DeploymentError::format(path, line_num, format!("recipe: {e}")))?;
        return Ok(SettingsLine::Recipe(recipe));
    }

    let (key, value) = split_assignment(line).ok_or_else(|| {
        DeploymentError::format(
            path,
            line_num,
            format!("expected 'recipe:<name>' or '<key>=<value>', found '{line}'"),
        )
    })?;

    match override_target(key) {
        Some((host, settings, property)) => {
            let key = PropertyKey::new(settings, property)
                .map_err(|e| DeploymentError::format(path, line_num, e.to_string()))?;
            Ok(SettingsLine::Override(PropertyOverride::new(host, key, value)))
        }
        None => Ok(SettingsLine::Data(key, value)),
    }
}

/// Split `host.Type.property` when `Type` is a registered settings type.
fn override_target(key: &str) -> Option<(&str, SettingsTypeId, &str)> {
    let mut parts = key.rsplitn(3, '.');
    let property = parts.next()?;
    let settings = parts.next()?.parse().ok()?;
    let host = parts.next().filter(|h| !h.is_empty())?;
    Some((host, settings, property))
}

/// Whether `key` would be read back as an override rather than data.
pub(super) fn is_override_key(key: &str) -> bool {
    override_target(key).is_some()
}

/// Reject names that cannot be used as a file stem or lookup key.
pub(super) fn validate_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name != name.trim() {
        Some("name has surrounding whitespace")
    } else if name.contains(['/', '\\']) {
        Some("name contains a path separator")
    } else if name.contains(['=', '\n', '\r']) || name.starts_with('#') {
        Some("name contains a reserved character")
    } else if name == "." || name == ".." {
        Some("name is a relative path component")
    } else {
        None
    };
    reason.map_or(Ok(()), |reason| {
        Err(DeploymentError::InvalidName {
            name: name.to_string(),
            reason,
        })
    })
}

/// Reject values that would not read back identically.
pub(super) fn validate_value(value: &str) -> Result<()> {
    let reason = if value.contains(['\n', '\r']) {
        Some("value spans multiple lines")
    } else if value != value.trim() {
        Some("value has surrounding whitespace")
    } else {
        None
    };
    reason.map_or(Ok(()), |reason| {
        Err(DeploymentError::InvalidValue {
            value: value.to_string(),
            reason,
        })
    })
}
