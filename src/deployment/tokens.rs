//! `{token}` placeholder substitution against layered key/value scopes.
use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{DeploymentError, Result};

#[allow(clippy::expect_used)]
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z0-9_.\-]+)\}").expect("token pattern is valid"));

/// An ordered list of key/value layers consulted during substitution.
///
/// Layers are searched in the order they were added; the first layer
/// holding a key wins. The graph reader adds environment data first and
/// profile data second.
#[derive(Debug, Clone, Default)]
pub struct TokenScope<'a> {
    layers: Vec<&'a BTreeMap<String, String>>,
}

impl<'a> TokenScope<'a> {
    /// An empty scope.
    #[must_use]
    pub const fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Append a lower-precedence layer.
    #[must_use]
    pub fn with_layer(mut self, layer: &'a BTreeMap<String, String>) -> Self {
        self.layers.push(layer);
        self
    }

    /// Look `name` up through the layers.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&'a str> {
        self.layers
            .iter()
            .copied()
            .find_map(|layer| layer.get(name))
            .map(String::as_str)
    }

    /// Whether `value` contains at least one placeholder.
    #[must_use]
    pub fn has_tokens(value: &str) -> bool {
        TOKEN.is_match(value)
    }

    /// Replace every `{name}` in `value` with its scoped value.
    ///
    /// Braces that do not enclose a token name (letters, digits, `_`, `.`,
    /// `-`) are kept literally. Substituted text is not scanned again.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentError::UnresolvedToken`] for the first token
    /// missing from every layer.
    pub fn substitute(&self, value: &str) -> Result<String> {
        let mut out = String::with_capacity(value.len());
        let mut last = 0;
        for caps in TOKEN.captures_iter(value) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let replacement =
                self.lookup(name.as_str())
                    .ok_or_else(|| DeploymentError::UnresolvedToken {
                        token: name.as_str().to_string(),
                        value: value.to_string(),
                    })?;
            out.push_str(value.get(last..whole.start()).unwrap_or_default());
            out.push_str(replacement);
            last = whole.end();
        }
        out.push_str(value.get(last..).unwrap_or_default());
        Ok(out)
    }
}
