//! Package listing and `{Name, Version}` queries over stored keys

use super::store::{ObjectStore, StoreResult};
use super::version::{latest_version, matches_range};
use crate::models::PackageVersionKey;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// One requested package: a name (or `*`) and a version range (or `*`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageQuery {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Version")]
    pub version: String,
}

impl PackageQuery {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// A matched package version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "ID")]
    pub id: String,
}

/// Lower-cased ASCII alphanumerics of `raw`
pub fn package_id(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Unique stored `(name, version)` pairs, skipping `.json` metadata objects
pub fn list_packages(store: &dyn ObjectStore) -> StoreResult<Vec<PackageVersionKey>> {
    let packages: BTreeSet<PackageVersionKey> = store
        .list("")?
        .iter()
        .filter_map(|o| PackageVersionKey::from_object_key(&o.key))
        .filter(|k| !k.version.ends_with(".json"))
        .collect();
    Ok(packages.into_iter().collect())
}

/// Stored versions of `name`, newest first by numeric order
pub fn stored_versions(store: &dyn ObjectStore, name: &str) -> StoreResult<Vec<String>> {
    let mut versions = list_packages_under(store, name)?;
    versions.sort_by(|a, b| super::version::compare_versions(b, a));
    Ok(versions)
}

fn list_packages_under(store: &dyn ObjectStore, name: &str) -> StoreResult<Vec<String>> {
    let versions: BTreeSet<String> = store
        .list(&format!("{name}/"))?
        .iter()
        .filter_map(|o| PackageVersionKey::from_object_key(&o.key))
        .filter(|k| !k.version.ends_with(".json"))
        .map(|k| k.version)
        .collect();
    Ok(versions.into_iter().collect())
}

/// Newest stored version of `name`, if any
pub fn latest_stored_version(store: &dyn ObjectStore, name: &str) -> StoreResult<Option<String>> {
    let versions = list_packages_under(store, name)?;
    Ok(latest_version(versions.iter().map(String::as_str)).map(str::to_string))
}

/// Match `queries` against stored object `keys`.
///
/// Names compare case-insensitively and `*` matches every name. Results
/// keep query order and are unique per `name-version`. A query whose name
/// has no stored objects yields one record with version `unknown`.
pub fn match_packages<K: AsRef<str>>(queries: &[PackageQuery], keys: &[K]) -> Vec<PackageMetadata> {
    let mut seen = HashSet::new();
    let mut matched = Vec::new();

    for query in queries {
        let wanted = query.name.to_lowercase();
        let candidates: Vec<&str> = keys
            .iter()
            .map(|k| k.as_ref())
            .filter(|key| {
                let name = key.split('/').next().unwrap_or_default();
                query.name == "*" || name.to_lowercase() == wanted
            })
            .collect();

        for key in &candidates {
            let Some(found) = PackageVersionKey::from_object_key(key) else {
                continue;
            };
            if !matches_range(&query.version, &found.version) {
                continue;
            }
            let full_id = format!("{}-{}", found.name, found.version);
            if seen.insert(full_id.clone()) {
                matched.push(PackageMetadata {
                    id: package_id(&full_id),
                    name: found.name,
                    version: found.version,
                });
            }
        }

        if candidates.is_empty() && seen.insert(format!("{}-{}", query.name, query.version)) {
            matched.push(PackageMetadata {
                name: query.name.clone(),
                version: "unknown".to_string(),
                id: package_id(&query.name),
            });
        }
    }
    matched
}
