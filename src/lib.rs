//! netscore - trust scoring for open-source packages
//!
//! Turns GitHub and npm URLs into a weighted NetScore built from
//! independently collected repository signals, and provides the version and
//! dependency-size utilities a package registry needs.
//!
//! The functions at the crate root are the narrow surface a registry's
//! route layer calls; the modules expose the pieces for finer control
//! (custom [`http::HttpClient`]s, [`registry::ObjectStore`]s, weights).
//!
//! Logging goes through `tracing`. This crate never installs a subscriber.

pub mod batch;
pub mod config;
pub mod http;
pub mod metrics;
pub mod models;
pub mod registry;
pub mod resolver;
pub mod scoring;

use config::{HttpConfig, ScoringConfig};
use http::GitHubHttp;
use models::RepositoryRef;
use registry::{ObjectStore, StoreError};
use scoring::{CompositeScore, Scorer};
use std::io::Write;
use tracing::warn;

/// Score `owner/repo` with default weights and HTTP settings
pub fn composite_score(owner: &str, repo: &str, token: &str) -> CompositeScore {
    let client = GitHubHttp::new(token, &HttpConfig::default());
    let scoring = ScoringConfig::default();
    let repo = RepositoryRef::new(owner, repo);
    let url = format!("https://github.com/{}", repo);
    Scorer::new(&client, client.endpoints(), &scoring).composite_score(&url, &repo)
}

/// Score `urls` in batches of 5, printing one JSON record per scored URL
/// to stdout. Returns the processed fraction of each batch.
pub fn run_batch<S: AsRef<str>>(urls: &[S], token: &str) -> Vec<f64> {
    let client = GitHubHttp::new(token, &HttpConfig::default());
    let config = config::NetScoreConfig::default();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let fractions = batch::BatchRunner::new(
        &client,
        client.endpoints(),
        &config.scoring,
        config.batch.size,
    )
    .run(urls, &mut out);
    flush_records(&mut out);
    fractions
}

/// Flush `out`, logging instead of failing; returns whether it succeeded
fn flush_records(out: &mut dyn Write) -> bool {
    match out.flush() {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to flush score records: {}", e);
            false
        }
    }
}

/// Whether `candidate` is a strictly newer version than `current`
pub fn is_version_newer(current: &str, candidate: &str) -> bool {
    registry::is_newer(current, candidate)
}

/// Whether `version` satisfies `range` (`^`, `~`, `a-b`, exact or `*`)
pub fn version_matches_range(range: &str, version: &str) -> bool {
    registry::matches_range(range, version)
}

/// Bytes stored for `name@version` and the dependencies inferred from the
/// store's key layout
pub fn dependency_total_size(
    store: &dyn ObjectStore,
    name: &str,
    version: &str,
) -> Result<u64, StoreError> {
    registry::dependency_total_size(store, name, version)
}
