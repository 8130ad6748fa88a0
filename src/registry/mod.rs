//! Package registry utilities
//!
//! Everything the registry's route layer needs beyond scoring:
//!
//! - [`version`]: numeric version comparison and range matching
//! - [`store`]: the object store seam (`list` / `get` / `put`)
//! - [`cost`]: dependency size cost with a per-walk visited set
//! - [`query`]: package listing and `{Name, Version}` queries
//!
//! None of these touch the network.

pub mod cost;
pub mod query;
pub mod store;
pub mod version;

pub use cost::{dependency_total_size, CostWalker, DependencyEdges};
pub use query::{list_packages, match_packages, PackageMetadata, PackageQuery};
pub use store::{LocalObjectStore, MemoryObjectStore, ObjectInfo, ObjectStore, StoreError};
pub use version::{compare_versions, is_newer, latest_version, matches_range};
