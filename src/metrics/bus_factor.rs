//! BusFactor: contributor concentration risk
//!
//! Counts up to 100 contributors and maps the count linearly onto `[0, 1]`
//! between the configured bounds (10 and 100 by default).

use super::{ApiContext, MetricResult};
use crate::http::{get_json, HttpResult};
use crate::models::RepositoryRef;
use tracing::{debug, error, info};

/// Number of contributors listed on the first page (max 100)
pub fn fetch_contributor_count(ctx: &ApiContext<'_>, repo: &RepositoryRef) -> HttpResult<usize> {
    debug!("Fetching contributors for {}", repo);
    let url = ctx.repo_url(repo, "/contributors?per_page=100&page=1");
    let contributors: Vec<serde_json::Value> = get_json(ctx.http, &url)?;
    debug!("Fetched {} contributors", contributors.len());
    Ok(contributors.len())
}

/// `clamp((count - min) / (max - min), 0, 1)`.
///
/// Returns `None` for negative arguments or `min >= max`.
pub fn normalize_contributors(min: i64, max: i64, count: i64) -> Option<f64> {
    if min < 0 || max < 0 || count < 0 {
        debug!("Invalid arguments: contributor bounds and count must be non-negative");
        return None;
    }
    if min >= max {
        debug!("Invalid arguments: min ({}) must be less than max ({})", min, max);
        return None;
    }
    let ratio = (count - min) as f64 / (max - min) as f64;
    Some(ratio.clamp(0.0, 1.0))
}

pub fn collect(ctx: &ApiContext<'_>, repo: &RepositoryRef, min: i64, max: i64) -> MetricResult {
    let count = match fetch_contributor_count(ctx, repo) {
        Ok(n) => n,
        Err(e) => {
            error!("Error getting bus factor for {}: {}", repo, e);
            return MetricResult::Failed;
        }
    };
    let count = i64::try_from(count).unwrap_or(i64::MAX);
    match normalize_contributors(min, max, count) {
        Some(score) => {
            info!("Bus factor score for {}: {}", repo, score);
            MetricResult::Score(score)
        }
        None => {
            error!("Error getting bus factor for {}: invalid bounds", repo);
            MetricResult::Failed
        }
    }
}
