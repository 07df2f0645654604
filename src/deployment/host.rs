//! Hosts: named deployment targets carrying directives and bottle references.
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use super::grammar::{self, BOTTLE_PREFIX};
use super::tokens::TokenScope;
use crate::error::{DeploymentError, Result};
use crate::settings::{Directive, PropertyKey, Settings, SettingsTypeId};

/// An installable unit a host requires, identified by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BottleReference {
    /// Bottle name.
    pub name: String,
}

impl BottleReference {
    /// Reference the bottle called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A directive and the names of the properties explicitly assigned on it.
///
/// Whole directives assign every property; directives built one property at
/// a time only assign what was set, and only those are persisted and merged.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    directive: Directive,
    assigned: BTreeSet<&'static str>,
}

impl Entry {
    fn whole(directive: Directive) -> Self {
        let assigned = directive
            .settings_type()
            .property_names()
            .iter()
            .copied()
            .collect();
        Self {
            directive,
            assigned,
        }
    }

    fn empty(settings: SettingsTypeId) -> Self {
        Self {
            directive: settings.default_directive(),
            assigned: BTreeSet::new(),
        }
    }

    fn assign(&mut self, property: &'static str, value: &str) -> Result<()> {
        self.directive.set(property, value)?;
        self.assigned.insert(property);
        Ok(())
    }

    fn is_whole(&self) -> bool {
        self.assigned.len() == self.directive.settings_type().property_names().len()
    }

    /// Assigned properties in declared field order.
    fn assigned_properties(&self) -> impl Iterator<Item = (&'static str, String)> + '_ {
        self.directive
            .properties()
            .into_iter()
            .filter(|(property, _)| self.assigned.contains(property))
    }
}

/// A host with at most one directive per settings type and a set of
/// bottle references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostManifest {
    name: String,
    directives: BTreeMap<SettingsTypeId, Entry>,
    references: BTreeSet<BottleReference>,
}

impl HostManifest {
    /// An empty host called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            directives: BTreeMap::new(),
            references: BTreeSet::new(),
        }
    }

    /// Host name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directives ordered by settings type.
    pub fn directives(&self) -> impl Iterator<Item = &Directive> {
        self.directives.values().map(|entry| &entry.directive)
    }

    /// References ordered by bottle name.
    pub fn references(&self) -> impl Iterator<Item = &BottleReference> {
        self.references.iter()
    }

    /// Whether the host references `bottle`.
    #[must_use]
    pub fn has_reference(&self, bottle: &str) -> bool {
        self.references.iter().any(|r| r.name == bottle)
    }

    /// The directive of type `T`, if any.
    #[must_use]
    pub fn directive<T: Settings>(&self) -> Option<&T> {
        self.directives
            .get(&T::TYPE)
            .and_then(|entry| T::from_directive(&entry.directive))
    }

    /// The directive of type `settings`, if any.
    #[must_use]
    pub fn directive_of(&self, settings: SettingsTypeId) -> Option<&Directive> {
        self.directives.get(&settings).map(|entry| &entry.directive)
    }

    /// Store `directive`, replacing any existing directive of the same type.
    /// Every property of a whole directive counts as assigned.
    pub fn add_directive(&mut self, directive: impl Into<Directive>) -> &mut Self {
        let directive = directive.into();
        self.directives
            .insert(directive.settings_type(), Entry::whole(directive));
        self
    }

    /// Assign one property, creating a default directive of that type first
    /// when the host has none. Other properties stay unassigned.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentError::InvalidProperty`] if `value` does not fit
    /// the property's type.
    pub fn add_property(&mut self, key: PropertyKey, value: &str) -> Result<&mut Self> {
        self.directives
            .entry(key.settings)
            .or_insert_with(|| Entry::empty(key.settings))
            .assign(key.property, value)?;
        Ok(self)
    }

    /// Add a bottle reference; adding a name twice has no effect.
    pub fn add_reference(&mut self, reference: BottleReference) -> &mut Self {
        self.references.insert(reference);
        self
    }

    /// Replace one property of an existing directive.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentError::ResolutionConflict`] if the host has no
    /// directive of that type.
    pub fn override_property(&mut self, key: PropertyKey, value: &str) -> Result<()> {
        let entry = self
            .directives
            .get_mut(&key.settings)
            .ok_or_else(|| Self::conflict(&self.name, key))?;
        entry.assign(key.property, value)
    }

    pub(super) fn conflict(host: &str, key: PropertyKey) -> DeploymentError {
        DeploymentError::ResolutionConflict {
            host: host.to_string(),
            settings: key.settings.to_string(),
            property: key.property.to_string(),
        }
    }

    /// Fold `other` into this host: references are unioned, whole
    /// directives in `other` replace ours, and directives `other` built
    /// property by property only overwrite the properties it assigned.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentError::InvalidProperty`] if a copied value does
    /// not fit its property, which cannot happen for values `other` holds.
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        self.references.extend(other.references.iter().cloned());
        for (settings, incoming) in &other.directives {
            match self.directives.get_mut(settings) {
                Some(existing) if !incoming.is_whole() => {
                    for (property, value) in incoming.assigned_properties() {
                        existing.assign(property, &value)?;
                    }
                }
                _ => {
                    self.directives.insert(*settings, incoming.clone());
                }
            }
        }
        Ok(())
    }

    /// Substitute placeholders in every property value.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentError::UnresolvedToken`] for a missing token or
    /// [`DeploymentError::InvalidProperty`] if the substituted text does not
    /// fit a typed property.
    pub fn substitute_tokens(&mut self, scope: &TokenScope<'_>) -> Result<()> {
        for entry in self.directives.values_mut() {
            let directive = &mut entry.directive;
            for (property, value) in directive.properties() {
                if TokenScope::has_tokens(&value) {
                    let resolved = scope.substitute(&value)?;
                    directive.set(property, &resolved)?;
                }
            }
        }
        Ok(())
    }

    /// Parse a host artifact.
    ///
    /// Lines are `bottle:<name>` or `<Type>.<property>=<value>`.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentError::Format`] for any other line, an unknown
    /// type or property, or a value that does not fit its property.
    pub fn parse(name: impl Into<String>, content: &str, path: &Path) -> Result<Self> {
        let mut host = Self::new(name);
        for (line_num, line) in grammar::significant_lines(content) {
            if let Some(bottle) = line.strip_prefix(BOTTLE_PREFIX) {
                let bottle = bottle.trim();
                if bottle.is_empty() {
                    return Err(DeploymentError::format(path, line_num, "empty bottle name"));
                }
                host.add_reference(BottleReference::new(bottle));
                continue;
            }

            let (key, value) = grammar::split_assignment(line).ok_or_else(|| {
                DeploymentError::format(
                    path,
                    line_num,
                    format!("expected 'bottle:<name>' or '<Type>.<property>=<value>', found '{line}'"),
                )
            })?;
            key.parse::<PropertyKey>()
                .and_then(|key| host.add_property(key, value).map(|_| ()))
                .map_err(|e| DeploymentError::format(path, line_num, e.to_string()))?;
        }
        Ok(host)
    }

    /// Render the host artifact: the assigned properties of every
    /// directive, then bottles sorted by name.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    pub(super) fn validate(&self) -> Result<()> {
        grammar::validate_name(&self.name)?;
        for entry in self.directives.values() {
            for (_, value) in entry.assigned_properties() {
                grammar::validate_value(&value)?;
            }
        }
        for reference in &self.references {
            grammar::validate_name(&reference.name)?;
        }
        Ok(())
    }
}

impl fmt::Display for HostManifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (settings, entry) in &self.directives {
            for (property, value) in entry.assigned_properties() {
                writeln!(f, "{settings}.{property}={value}")?;
            }
        }
        for reference in &self.references {
            writeln!(f, "{BOTTLE_PREFIX}{}", reference.name)?;
        }
        Ok(())
    }
}
