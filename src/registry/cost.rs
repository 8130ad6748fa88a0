//! Dependency size cost: bytes stored for a package version and everything
//! it depends on
//!
//! Each package version is counted once per walk, which also makes cycles
//! terminate. The visited set lives only for one [`CostWalker::total_size`]
//! call.
//!
//! Listing and summing are separate store reads with no snapshot between
//! them, so a store mutated mid-walk can yield a skewed total.

use super::store::{ObjectInfo, ObjectStore, StoreError, StoreResult};
use super::version::{latest_version, matches_range};
use crate::models::PackageVersionKey;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, warn};

/// How the walker discovers a package version's dependencies
#[derive(Debug, Clone, Default)]
pub enum DependencyEdges {
    /// First two segments of every stored key under the package prefix
    #[default]
    KeyLayout,
    /// Caller-provided adjacency list
    Explicit(BTreeMap<PackageVersionKey, Vec<PackageVersionKey>>),
    /// `dependencies` of the stored `package.json`, each range resolved to
    /// the newest stored version satisfying it
    Manifest,
}

#[derive(Deserialize)]
struct Manifest {
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
}

pub struct CostWalker<'a> {
    store: &'a dyn ObjectStore,
    edges: &'a DependencyEdges,
}

impl<'a> CostWalker<'a> {
    pub fn new(store: &'a dyn ObjectStore, edges: &'a DependencyEdges) -> Self {
        Self { store, edges }
    }

    /// Total bytes for `root` and its dependency closure.
    ///
    /// Store errors propagate; a package with no stored objects adds 0.
    pub fn total_size(&self, root: &PackageVersionKey) -> StoreResult<u64> {
        let mut visited = HashSet::new();
        let mut pending = vec![root.clone()];
        let mut total = 0u64;

        while let Some(package) = pending.pop() {
            if !visited.insert(package.prefix()) {
                continue;
            }
            let objects = self.store.list(&package.prefix())?;
            if objects.is_empty() {
                debug!("No objects stored for {}", package);
                continue;
            }
            let size: u64 = objects.iter().map(|o| o.size).sum();
            debug!("{}: {} bytes in {} object(s)", package, size, objects.len());
            total += size;

            for dep in self.dependencies(&package, &objects)? {
                if !visited.contains(&dep.prefix()) {
                    pending.push(dep);
                }
            }
        }
        Ok(total)
    }

    fn dependencies(
        &self,
        package: &PackageVersionKey,
        objects: &[ObjectInfo],
    ) -> StoreResult<Vec<PackageVersionKey>> {
        match self.edges {
            DependencyEdges::KeyLayout => Ok(objects
                .iter()
                .filter_map(|o| PackageVersionKey::from_object_key(&o.key))
                .collect()),
            DependencyEdges::Explicit(map) => Ok(map.get(package).cloned().unwrap_or_default()),
            DependencyEdges::Manifest => self.manifest_dependencies(package),
        }
    }

    fn manifest_dependencies(&self, package: &PackageVersionKey) -> StoreResult<Vec<PackageVersionKey>> {
        let key = format!("{}package.json", package.prefix());
        let bytes = match self.store.get(&key) {
            Ok(bytes) => bytes,
            Err(StoreError::NotFound { .. }) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        let manifest: Manifest = match serde_json::from_slice(&bytes) {
            Ok(m) => m,
            Err(e) => {
                warn!("Ignoring unreadable manifest {}: {}", key, e);
                return Ok(Vec::new());
            }
        };

        let mut deps = Vec::new();
        for (name, range) in &manifest.dependencies {
            match self.resolve(name, range)? {
                Some(version) => deps.push(PackageVersionKey::new(name.as_str(), version)),
                None => debug!("No stored version of {} satisfies {}", name, range),
            }
        }
        Ok(deps)
    }

    /// Newest stored version of `name` matching `range`
    fn resolve(&self, name: &str, range: &str) -> StoreResult<Option<String>> {
        let versions: BTreeSet<String> = self
            .store
            .list(&format!("{name}/"))?
            .iter()
            .filter_map(|o| PackageVersionKey::from_object_key(&o.key))
            .map(|k| k.version)
            .collect();
        Ok(latest_version(
            versions
                .iter()
                .map(String::as_str)
                .filter(|v| matches_range(range, v)),
        )
        .map(str::to_string))
    }
}

/// Size of `name@version` and its dependencies inferred from key layout
pub fn dependency_total_size(
    store: &dyn ObjectStore,
    name: &str,
    version: &str,
) -> StoreResult<u64> {
    CostWalker::new(store, &DependencyEdges::KeyLayout)
        .total_size(&PackageVersionKey::new(name, version))
}
