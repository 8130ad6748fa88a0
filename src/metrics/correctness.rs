//! Correctness: share of recently active issues that are closed

use super::{ApiContext, MetricResult};
use crate::http::{get_json, HttpResult};
use crate::models::RepositoryRef;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::Deserialize;
use tracing::{debug, info};

const PER_PAGE: usize = 100;
const WINDOW_DAYS: i64 = 30;

/// Fields of a GitHub issue (or pull request) this metric reads
#[derive(Debug, Clone, Deserialize)]
pub struct IssueState {
    pub state: String,
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

impl IssueState {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.as_ref().is_some_and(|v| !v.is_null())
    }
}

/// All issues updated since `since`, one page of 100 at a time until a
/// short page is returned
pub fn fetch_issues_since(
    ctx: &ApiContext<'_>,
    repo: &RepositoryRef,
    since: DateTime<Utc>,
) -> HttpResult<Vec<IssueState>> {
    let since = since.to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut all = Vec::new();
    let mut page = 1;
    loop {
        let url = ctx.repo_url(
            repo,
            &format!(
                "/issues?state=all&per_page={}&page={}&since={}",
                PER_PAGE, page, since
            ),
        );
        let issues: Vec<IssueState> = get_json(ctx.http, &url)?;
        let count = issues.len();
        all.extend(issues);
        if count < PER_PAGE {
            break;
        }
        page += 1;
    }
    debug!("Fetched {} issues in {} page(s)", all.len(), page);
    Ok(all)
}

/// closed / total among real issues; 0 when there are none
pub fn correctness_score(issues: &[IssueState]) -> f64 {
    let actual: Vec<_> = issues.iter().filter(|i| !i.is_pull_request()).collect();
    debug!(
        "Found {} issues after filtering out pull requests",
        actual.len()
    );
    if actual.is_empty() {
        return 0.0;
    }
    let closed = actual.iter().filter(|i| i.state == "closed").count();
    closed as f64 / actual.len() as f64
}

pub fn collect(ctx: &ApiContext<'_>, repo: &RepositoryRef) -> MetricResult {
    let since = Utc::now() - Duration::days(WINDOW_DAYS);
    match fetch_issues_since(ctx, repo, since) {
        Ok(issues) => {
            let score = correctness_score(&issues);
            info!("Correctness score for {}: {}", repo, score);
            MetricResult::Score(score)
        }
        Err(e) => {
            debug!("Error fetching issues for {}: {}", repo, e);
            MetricResult::Failed
        }
    }
}
