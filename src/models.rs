//! Core data models for netscore
//!
//! These identify what is being scored (a GitHub repository) and what is
//! being stored (a package version in the registry).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A GitHub repository, derived once per scoring pass from a URL
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A package version in the registry's flat key space.
///
/// `(name, version)` pairs are unique; the storage prefix of a package
/// version is `"{name}/{version}/"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageVersionKey {
    pub name: String,
    pub version: String,
}

impl PackageVersionKey {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Object-store prefix holding this version's objects
    pub fn prefix(&self) -> String {
        format!("{}/{}/", self.name, self.version)
    }

    /// Parse the first two segments of an object key, if both are non-empty
    pub fn from_object_key(key: &str) -> Option<Self> {
        let mut parts = key.split('/');
        let name = parts.next().filter(|s| !s.is_empty())?;
        let version = parts.next().filter(|s| !s.is_empty())?;
        Some(Self::new(name, version))
    }
}

impl fmt::Display for PackageVersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}
