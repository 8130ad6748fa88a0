//! `netscore cost` and `netscore packages` over a local object store

use super::EdgeMode;
use anyhow::{bail, Context, Result};
use netscore::models::PackageVersionKey;
use netscore::registry::{
    list_packages, match_packages, CostWalker, DependencyEdges, LocalObjectStore, ObjectStore,
    PackageQuery,
};
use std::path::Path;
use tracing::debug;

fn open_store(dir: &Path) -> Result<LocalObjectStore> {
    if !dir.is_dir() {
        bail!("Object store directory not found: {}", dir.display());
    }
    Ok(LocalObjectStore::new(dir))
}

pub(super) fn cost(store_dir: &Path, name: &str, version: &str, mode: EdgeMode) -> Result<()> {
    let store = open_store(store_dir)?;
    let edges = match mode {
        EdgeMode::KeyLayout => DependencyEdges::KeyLayout,
        EdgeMode::Manifest => DependencyEdges::Manifest,
    };
    let root = PackageVersionKey::new(name, version);
    let total = CostWalker::new(&store, &edges)
        .total_size(&root)
        .with_context(|| format!("Failed to compute size of {}", root))?;
    debug!("Total size of {}: {} bytes", root, total);
    println!("{}", total);
    Ok(())
}

pub(super) fn packages(store_dir: &Path, name: Option<&str>, version: &str) -> Result<()> {
    let store = open_store(store_dir)?;
    let json = match name {
        None => {
            let listed: Vec<PackageQuery> = list_packages(&store)?
                .into_iter()
                .map(|k| PackageQuery::new(k.name, k.version))
                .collect();
            serde_json::to_string_pretty(&listed)?
        }
        Some(name) => {
            let keys: Vec<String> = store.list("")?.into_iter().map(|o| o.key).collect();
            let matched = match_packages(&[PackageQuery::new(name, version)], &keys);
            serde_json::to_string_pretty(&matched)?
        }
    };
    println!("{}", json);
    Ok(())
}
