//! CodeReview: fraction of pull requests that were merged
//!
//! One GraphQL round trip fetches both counts. The score gets a 0.1 lift
//! (capped at 1) whenever the repository has any pull requests.

use super::{ApiContext, MetricResult};
use crate::http::{post_json, HttpResult};
use crate::models::RepositoryRef;
use crate::resolver;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

const PULL_REQUEST_QUERY: &str = r#"
query($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) {
    pullRequests { totalCount }
    mergedPullRequests: pullRequests(states: MERGED) { totalCount }
  }
}"#;

#[derive(Deserialize)]
struct GraphQlResponse {
    data: GraphQlData,
}

#[derive(Deserialize)]
struct GraphQlData {
    repository: PullRequestCounts,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestCounts {
    pull_requests: TotalCount,
    merged_pull_requests: TotalCount,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TotalCount {
    total_count: u64,
}

/// `(total, merged)` pull request counts
pub fn fetch_pull_request_counts(
    ctx: &ApiContext<'_>,
    repo: &RepositoryRef,
) -> HttpResult<(u64, u64)> {
    let body = json!({
        "query": PULL_REQUEST_QUERY,
        "variables": { "owner": repo.owner, "name": repo.name },
    });
    let response: GraphQlResponse = post_json(ctx.http, &ctx.endpoints.github_graphql, &body)?;
    let counts = response.data.repository;
    Ok((
        counts.pull_requests.total_count,
        counts.merged_pull_requests.total_count,
    ))
}

/// `min(merged / total + 0.1, 1)`, or 0 with no pull requests
pub fn review_score(total: u64, merged: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (merged as f64 / total as f64 + 0.1).min(1.0)
}

pub fn collect(ctx: &ApiContext<'_>, repo: &RepositoryRef) -> MetricResult {
    info!("Processing repository: {}", repo);
    match fetch_pull_request_counts(ctx, repo) {
        Ok((total, merged)) => {
            let score = review_score(total, merged);
            info!(
                "Code review score for {}: {} ({}/{} merged)",
                repo, score, merged, total
            );
            MetricResult::Score(score)
        }
        Err(e) => {
            debug!("Error in GraphQL request for {}: {}", repo, e);
            MetricResult::Failed
        }
    }
}

/// Resolve a GitHub or npm URL, then score it
pub fn collect_for_url(ctx: &ApiContext<'_>, url: &str) -> MetricResult {
    match resolver::handle_url(ctx, url) {
        Some(repo) => collect(ctx, &repo),
        None => {
            info!("Invalid or unsupported URL: {}", url);
            MetricResult::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::StubHttp;
    use crate::http::Endpoints;

    fn counts(total: u64, merged: u64) -> serde_json::Value {
        json!({ "data": { "repository": {
            "pullRequests": { "totalCount": total },
            "mergedPullRequests": { "totalCount": merged }
        }}})
    }

    #[test]
    fn test_review_score() {
        assert_eq!(review_score(0, 0), 0.0);
        assert!((review_score(10, 5) - 0.6).abs() < 1e-9);
        assert_eq!(review_score(10, 10), 1.0);
        assert_eq!(review_score(3, 3), 1.0);
    }

    #[test]
    fn test_collect_from_graphql() {
        let stub = StubHttp::new().with_json("https://api.github.com/graphql", counts(40, 30));
        let endpoints = Endpoints::default();
        let ctx = ApiContext::new(&stub, &endpoints);
        let score = collect(&ctx, &RepositoryRef::new("o", "r")).score().unwrap();
        assert!((score - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_graphql_errors_fail() {
        let stub = StubHttp::new().with_json(
            "https://api.github.com/graphql",
            json!({ "data": null, "errors": [{ "message": "Could not resolve to a Repository" }] }),
        );
        let endpoints = Endpoints::default();
        let ctx = ApiContext::new(&stub, &endpoints);
        assert!(collect(&ctx, &RepositoryRef::new("o", "r")).is_failed());
    }

    #[test]
    fn test_unresolvable_url_fails() {
        let stub = StubHttp::new();
        let endpoints = Endpoints::default();
        let ctx = ApiContext::new(&stub, &endpoints);
        assert!(collect_for_url(&ctx, "https://gitlab.com/o/r").is_failed());
        assert!(stub.requests().is_empty());
    }

    #[test]
    fn test_collect_for_github_url() {
        let stub = StubHttp::new().with_json("https://api.github.com/graphql", counts(4, 2));
        let endpoints = Endpoints::default();
        let ctx = ApiContext::new(&stub, &endpoints);
        let score = collect_for_url(&ctx, "https://github.com/o/r").score().unwrap();
        assert!((score - 0.6).abs() < 1e-9);
    }
}
