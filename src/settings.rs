//! Settings type registry: the typed directive shapes a host can carry.
//!
//! Every settings shape is a plain struct implementing [`Settings`], which
//! exposes a static accessor table ([`Settings::PROPERTIES`]) used to read and
//! write single properties by name. [`Directive`] is the tagged union over
//! all known shapes and [`SettingsTypeId`] the stable identifier used as the
//! merge key and on disk.
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{DeploymentError, Result};

/// Stable identifier of a settings shape.
///
/// The textual form (`Website`, `Service`, …) is what appears in persisted
/// artifacts, e.g. `Website.site_name=shop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SettingsTypeId {
    /// [`Website`] settings.
    Website,
    /// [`Service`] settings.
    Service,
    /// [`Database`] settings.
    Database,
    /// [`Folder`] settings.
    Folder,
}

impl SettingsTypeId {
    /// Every registered settings type, in declaration order.
    pub const ALL: [Self; 4] = [Self::Website, Self::Service, Self::Database, Self::Folder];

    /// Identifier as written to disk.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Website => "Website",
            Self::Service => "Service",
            Self::Database => "Database",
            Self::Folder => "Folder",
        }
    }

    /// Property names of this settings type, in declared field order.
    #[must_use]
    pub const fn property_names(self) -> &'static [&'static str] {
        match self {
            Self::Website => Website::PROPERTY_NAMES,
            Self::Service => Service::PROPERTY_NAMES,
            Self::Database => Database::PROPERTY_NAMES,
            Self::Folder => Folder::PROPERTY_NAMES,
        }
    }

    /// A directive of this type with every property at its default.
    #[must_use]
    pub fn default_directive(self) -> Directive {
        match self {
            Self::Website => Website::default().into(),
            Self::Service => Service::default().into(),
            Self::Database => Database::default().into(),
            Self::Folder => Folder::default().into(),
        }
    }

    /// Look up the static name of `property` on this type.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentError::UnknownProperty`] if the type has no such property.
    pub fn property(self, property: &str) -> Result<&'static str> {
        self.property_names()
            .iter()
            .copied()
            .find(|name| *name == property)
            .ok_or_else(|| DeploymentError::UnknownProperty {
                settings: self.to_string(),
                property: property.to_string(),
            })
    }
}

impl fmt::Display for SettingsTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingsTypeId {
    type Err = DeploymentError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| DeploymentError::UnknownSettingsType(s.to_string()))
    }
}

/// Accessor pair for one named property of a settings struct.
#[derive(Debug)]
pub struct Property<T> {
    /// Property name as used on disk and in overrides.
    pub name: &'static str,
    /// Render the current value.
    pub get: fn(&T) -> String,
    /// Parse and store a new value.
    pub set: fn(&mut T, &str) -> Result<(), String>,
}

/// A typed settings shape that can be stored as a host [`Directive`].
pub trait Settings: Default + Into<Directive> + 'static {
    /// Identifier used as merge key.
    const TYPE: SettingsTypeId;
    /// Property names in declared field order.
    const PROPERTY_NAMES: &'static [&'static str];
    /// Static accessor table, same order as [`Self::PROPERTY_NAMES`].
    const PROPERTIES: &'static [Property<Self>];

    /// Borrow the settings out of a directive of the matching variant.
    fn from_directive(directive: &Directive) -> Option<&Self>;

    /// Typed key for `property`, validated against the accessor table.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentError::UnknownProperty`] for an unknown name.
    fn key(property: &str) -> Result<PropertyKey> {
        PropertyKey::new(Self::TYPE, property)
    }
}

/// Implement [`Settings`] and the [`Directive`] conversion for a struct whose
/// listed fields all implement `Display + FromStr`.
macro_rules! settings_type {
    ($ty:ident { $($field:ident),+ $(,)? }) => {
        impl Settings for $ty {
            const TYPE: SettingsTypeId = SettingsTypeId::$ty;
            const PROPERTY_NAMES: &'static [&'static str] = &[$(stringify!($field)),+];
            const PROPERTIES: &'static [Property<Self>] = &[
                $(
                    Property {
                        name: stringify!($field),
                        get: |s| s.$field.to_string(),
                        set: |s, v| {
                            s.$field = v.parse().map_err(|e| format!("{e}"))?;
                            Ok(())
                        },
                    },
                )+
            ];

            fn from_directive(directive: &Directive) -> Option<&Self> {
                match directive {
                    Directive::$ty(settings) => Some(settings),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Directive {
            fn from(settings: $ty) -> Self {
                Self::$ty(settings)
            }
        }
    };
}

/// A web site hosted on the target machine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Website {
    /// Site name in the web server.
    pub site_name: String,
    /// Virtual directory the bottle is mounted under.
    pub virtual_dir: String,
}

/// A long-running service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Service {
    /// Registered service name.
    pub name: String,
    /// Number of instances to run.
    pub instances: u32,
}

/// A database the host's bottles connect to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Database {
    /// Server address.
    pub server: String,
    /// Catalog (database) name.
    pub catalog: String,
}

/// A directory that must exist on the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Folder {
    /// Absolute or deployment-relative path.
    pub path: String,
    /// Owning account.
    pub owner: String,
}

settings_type!(Website { site_name, virtual_dir });
settings_type!(Service { name, instances });
settings_type!(Database { server, catalog });
settings_type!(Folder { path, owner });

/// A typed configuration record attached to a host, one variant per
/// settings shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Directive {
    /// See [`Website`].
    Website(Website),
    /// See [`Service`].
    Service(Service),
    /// See [`Database`].
    Database(Database),
    /// See [`Folder`].
    Folder(Folder),
}

/// Run `$body` with `$s` bound to the inner settings struct of `$directive`.
macro_rules! with_settings {
    ($directive:expr, $s:ident => $body:expr) => {
        match $directive {
            Directive::Website($s) => $body,
            Directive::Service($s) => $body,
            Directive::Database($s) => $body,
            Directive::Folder($s) => $body,
        }
    };
}

fn get_property<T: Settings>(settings: &T, property: &str) -> Option<String> {
    T::PROPERTIES
        .iter()
        .find(|p| p.name == property)
        .map(|p| (p.get)(settings))
}

fn set_property<T: Settings>(settings: &mut T, property: &str, value: &str) -> Result<()> {
    let accessor = T::PROPERTIES
        .iter()
        .find(|p| p.name == property)
        .ok_or_else(|| DeploymentError::UnknownProperty {
            settings: T::TYPE.to_string(),
            property: property.to_string(),
        })?;
    (accessor.set)(settings, value).map_err(|reason| DeploymentError::InvalidProperty {
        settings: T::TYPE.to_string(),
        property: property.to_string(),
        value: value.to_string(),
        reason,
    })
}

fn list_properties<T: Settings>(settings: &T) -> Vec<(&'static str, String)> {
    T::PROPERTIES
        .iter()
        .map(|p| (p.name, (p.get)(settings)))
        .collect()
}

impl Directive {
    /// The settings type of this directive.
    #[must_use]
    pub const fn settings_type(&self) -> SettingsTypeId {
        match self {
            Self::Website(_) => SettingsTypeId::Website,
            Self::Service(_) => SettingsTypeId::Service,
            Self::Database(_) => SettingsTypeId::Database,
            Self::Folder(_) => SettingsTypeId::Folder,
        }
    }

    /// Render the value of `property`, or `None` if the type has no such property.
    #[must_use]
    pub fn get(&self, property: &str) -> Option<String> {
        with_settings!(self, s => get_property(s, property))
    }

    /// Replace the value of a single property.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentError::UnknownProperty`] for an unknown name or
    /// [`DeploymentError::InvalidProperty`] if `value` does not parse into
    /// the property's type.
    pub fn set(&mut self, property: &str, value: &str) -> Result<()> {
        with_settings!(self, s => set_property(s, property, value))
    }

    /// Every property as `(name, rendered value)`, in declared field order.
    #[must_use]
    pub fn properties(&self) -> Vec<(&'static str, String)> {
        with_settings!(self, s => list_properties(s))
    }

    /// Borrow the inner settings struct if it is of type `T`.
    #[must_use]
    pub fn as_settings<T: Settings>(&self) -> Option<&T> {
        T::from_directive(self)
    }
}

/// A `(settings type, property)` pair naming one typed property.
///
/// Replaces selector expressions: the pair is supplied directly and
/// validated against the accessor table when built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyKey {
    /// Settings type owning the property.
    pub settings: SettingsTypeId,
    /// Property name.
    pub property: &'static str,
}

impl PropertyKey {
    /// Build a key, validating that `settings` has `property`.
    ///
    /// # Errors
    ///
    /// Returns [`DeploymentError::UnknownProperty`] for an unknown name.
    pub fn new(settings: SettingsTypeId, property: &str) -> Result<Self> {
        Ok(Self {
            settings,
            property: settings.property(property)?,
        })
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.settings, self.property)
    }
}

impl FromStr for PropertyKey {
    type Err = DeploymentError;

    /// Parse `Type.property`.
    fn from_str(s: &str) -> Result<Self> {
        let (settings, property) = s
            .split_once('.')
            .ok_or_else(|| DeploymentError::UnknownSettingsType(s.to_string()))?;
        Self::new(settings.parse()?, property)
    }
}
