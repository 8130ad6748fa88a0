//! PinningPractice: fraction of dependencies pinned to an exact version
//!
//! `1.2` and `1.2.3` are pinned; `^1.2.0`, `~1.2.0`, `*`, `>=1` and ranges
//! are not.

use super::{ApiContext, MetricResult};
use crate::http::{HttpError, HttpResult, ACCEPT_RAW};
use crate::models::RepositoryRef;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::{debug, info};

static PINNED: OnceLock<Regex> = OnceLock::new();

fn pinned_pattern() -> &'static Regex {
    PINNED.get_or_init(|| Regex::new(r"^\d+\.\d+(\.\d+)?$").expect("valid pin regex"))
}

#[derive(Debug, Default, Deserialize)]
struct PackageManifest {
    #[serde(default)]
    dependencies: BTreeMap<String, serde_json::Value>,
}

pub fn is_pinned(version: &str) -> bool {
    pinned_pattern().is_match(version)
}

/// Pinned / total; 1.0 when there are no dependencies.
///
/// Non-string version values (malformed manifests) count as unpinned.
pub fn pinned_fraction(dependencies: &BTreeMap<String, serde_json::Value>) -> f64 {
    if dependencies.is_empty() {
        return 1.0;
    }
    let pinned = dependencies
        .values()
        .filter(|v| v.as_str().is_some_and(is_pinned))
        .count();
    pinned as f64 / dependencies.len() as f64
}

/// `dependencies` of the repository's root package.json
pub fn fetch_dependencies(
    ctx: &ApiContext<'_>,
    repo: &RepositoryRef,
) -> HttpResult<BTreeMap<String, serde_json::Value>> {
    let url = ctx.repo_url(repo, "/contents/package.json");
    let text = ctx.http.get_text(&url, Some(ACCEPT_RAW))?;
    let manifest: PackageManifest = serde_json::from_str(&text).map_err(|e| HttpError::Decode {
        url,
        message: e.to_string(),
    })?;
    Ok(manifest.dependencies)
}

pub fn collect(ctx: &ApiContext<'_>, repo: &RepositoryRef) -> MetricResult {
    match fetch_dependencies(ctx, repo) {
        Ok(deps) => {
            let score = pinned_fraction(&deps);
            info!(
                "Pinning practice score for {}: {} ({} dependencies)",
                repo,
                score,
                deps.len()
            );
            MetricResult::Score(score)
        }
        Err(e) => {
            debug!("Error processing dependencies for {}: {}", repo, e);
            MetricResult::Score(0.0)
        }
    }
}
