//! Object store seam
//!
//! The registry keeps package artifacts in a flat key space:
//! `"{name}/{version}/{file}"`. Keys are `/`-separated and never start with
//! `/`. Two implementations ship: an in-memory map and a directory tree.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("object not found: {key}")]
    NotFound { key: String },

    #[error("invalid object key '{key}'")]
    InvalidKey { key: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A listed object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    pub key: String,
    pub size: u64,
}

pub trait ObjectStore: Send + Sync {
    /// Every object whose key starts with `prefix`, ordered by key
    fn list(&self, prefix: &str) -> StoreResult<Vec<ObjectInfo>>;

    fn get(&self, key: &str) -> StoreResult<Vec<u8>>;

    /// Create or replace the object at `key`
    fn put(&self, key: &str, bytes: &[u8]) -> StoreResult<()>;
}

/// Reject keys that are empty, absolute, or escape the store
fn validate_key(key: &str) -> StoreResult<()> {
    let bad = key.is_empty()
        || key.starts_with('/')
        || key.ends_with('/')
        || key.contains('\\')
        || key.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if bad {
        Err(StoreError::InvalidKey {
            key: key.to_string(),
        })
    } else {
        Ok(())
    }
}

/// Reject list prefixes that could address anything outside the store.
///
/// Same rules as object keys, except that the empty prefix and a trailing
/// `/` are allowed.
fn validate_prefix(prefix: &str) -> StoreResult<()> {
    if prefix.is_empty() {
        return Ok(());
    }
    let body = prefix.strip_suffix('/').unwrap_or(prefix);
    let bad = body.is_empty()
        || prefix.starts_with('/')
        || prefix.contains('\\')
        || body.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if bad {
        Err(StoreError::InvalidKey {
            key: prefix.to_string(),
        })
    } else {
        Ok(())
    }
}

/// Ordered in-memory store
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.read().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ObjectStore for MemoryObjectStore {
    fn list(&self, prefix: &str) -> StoreResult<Vec<ObjectInfo>> {
        validate_prefix(prefix)?;
        let objects = self.objects.read().unwrap_or_else(|e| e.into_inner());
        Ok(objects
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, bytes)| ObjectInfo {
                key: key.clone(),
                size: bytes.len() as u64,
            })
            .collect())
    }

    fn get(&self, key: &str) -> StoreResult<Vec<u8>> {
        let objects = self.objects.read().unwrap_or_else(|e| e.into_inner());
        objects.get(key).cloned().ok_or_else(|| StoreError::NotFound {
            key: key.to_string(),
        })
    }

    fn put(&self, key: &str, bytes: &[u8]) -> StoreResult<()> {
        validate_key(key)?;
        let mut objects = self.objects.write().unwrap_or_else(|e| e.into_inner());
        objects.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

/// Store backed by a directory; a key is the `/`-joined relative path
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        validate_key(key)?;
        Ok(key.split('/').fold(self.root.clone(), |path, seg| path.join(seg)))
    }

    fn key_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let segments: Option<Vec<&str>> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect();
        Some(segments?.join("/"))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl ObjectStore for LocalObjectStore {
    fn list(&self, prefix: &str) -> StoreResult<Vec<ObjectInfo>> {
        validate_prefix(prefix)?;
        // Only walk the directory the prefix pins down
        let dir = match prefix.rfind('/') {
            Some(idx) => prefix[..idx]
                .split('/')
                .fold(self.root.clone(), |path, seg| path.join(seg)),
            None => self.root.clone(),
        };
        if !dir.is_dir() {
            debug!("No objects under {}", dir.display());
            return Ok(Vec::new());
        }

        let walker = ignore::WalkBuilder::new(&dir)
            .standard_filters(false)
            .follow_links(false)
            .build();

        let mut objects = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| StoreError::Io {
                path: dir.clone(),
                source: std::io::Error::other(e.to_string()),
            })?;
            let path = entry.path();
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let Some(key) = self.key_for(path) else {
                debug!("Skipping non UTF-8 path {}", path.display());
                continue;
            };
            if !key.starts_with(prefix) {
                continue;
            }
            let size = entry.metadata().map_err(|e| StoreError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::other(e.to_string()),
            })?;
            objects.push(ObjectInfo {
                key,
                size: size.len(),
            });
        }
        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }

    fn get(&self, key: &str) -> StoreResult<Vec<u8>> {
        let path = self.path_for(key)?;
        std::fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound {
                    key: key.to_string(),
                }
            } else {
                io_error(&path, e)
            }
        })
    }

    fn put(&self, key: &str, bytes: &[u8]) -> StoreResult<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        std::fs::write(&path, bytes).map_err(|e| io_error(&path, e))
    }
}
