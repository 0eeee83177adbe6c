//! Strongly-typed resource identifiers.
//!
//! Organizations, projects, and secrets are stored as labeled Kubernetes
//! objects, so a resource is addressed by its kind plus a DNS-label name.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Maximum length of a DNS label (RFC 1123).
const MAX_NAME_LEN: usize = 63;

/// The kinds of resource that carry sharing grants.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Organization,
    Project,
    Secret,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [Self::Organization, Self::Project, Self::Secret];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Organization => "organization",
            ResourceKind::Project => "project",
            ResourceKind::Secret => "secret",
        }
    }
}

impl core::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "organization" | "org" => Ok(Self::Organization),
            "project" => Ok(Self::Project),
            "secret" => Ok(Self::Secret),
            other => Err(DomainError::invalid_id(format!("ResourceKind: unknown kind '{other}'"))),
        }
    }
}

/// Name of a resource (a DNS label: lowercase alphanumerics and `-`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceName(String);

impl ResourceName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.is_empty() {
        return Err(DomainError::invalid_id("ResourceName: must not be empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(DomainError::invalid_id(format!(
            "ResourceName: '{name}' exceeds {MAX_NAME_LEN} characters"
        )));
    }
    if name.starts_with('-') || name.ends_with('-') {
        return Err(DomainError::invalid_id(format!(
            "ResourceName: '{name}' must start and end with an alphanumeric character"
        )));
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
    {
        return Err(DomainError::invalid_id(format!(
            "ResourceName: '{name}' contains invalid character '{bad}'"
        )));
    }
    Ok(())
}

impl FromStr for ResourceName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_name(s)?;
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for ResourceName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_name(&value)?;
        Ok(Self(value))
    }
}

impl From<ResourceName> for String {
    fn from(value: ResourceName) -> Self {
        value.0
    }
}

impl core::fmt::Display for ResourceName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to one shareable resource (the id a sharing state is attached to).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub name: ResourceName,
}

impl ResourceRef {
    pub fn new(kind: ResourceKind, name: &str) -> Result<Self, DomainError> {
        Ok(Self {
            kind,
            name: name.parse()?,
        })
    }

    pub fn organization(name: &str) -> Result<Self, DomainError> {
        Self::new(ResourceKind::Organization, name)
    }

    pub fn project(name: &str) -> Result<Self, DomainError> {
        Self::new(ResourceKind::Project, name)
    }

    pub fn secret(name: &str) -> Result<Self, DomainError> {
        Self::new(ResourceKind::Secret, name)
    }
}

impl core::fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

impl FromStr for ResourceRef {
    type Err = DomainError;

    /// Parses `kind/name`, e.g. `project/payments`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, name) = s
            .split_once('/')
            .ok_or_else(|| DomainError::invalid_id(format!("ResourceRef: expected kind/name, got '{s}'")))?;
        Self::new(kind.parse()?, name)
    }
}
