//! ResponsiveMaintainer: how quickly open issues get a first response
//!
//! ```text
//! response = first comment - created            (hours)
//!          = ceil(hours open / 24) * 24         (no comment yet)
//! score    = max(0, 1 - max(0, avg - 24) / 24 * 0.25)
//! ```
//!
//! A day of grace, then a quarter point lost per day of average delay.

use super::{ApiContext, MetricResult};
use crate::http::{get_json, HttpResult};
use crate::models::RepositoryRef;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Debug, Clone, Deserialize)]
struct OpenIssue {
    created_at: DateTime<Utc>,
    comments_url: String,
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct Comment {
    created_at: DateTime<Utc>,
}

/// An open issue with the time of its first comment, if any
#[derive(Debug, Clone, PartialEq)]
pub struct IssueActivity {
    pub created_at: DateTime<Utc>,
    pub first_comment_at: Option<DateTime<Utc>>,
}

fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    to.signed_duration_since(from).num_milliseconds() as f64 / 3_600_000.0
}

impl IssueActivity {
    /// Real or assumed response time in hours
    pub fn response_hours(&self, now: DateTime<Utc>) -> f64 {
        match self.first_comment_at {
            Some(first) => hours_between(self.created_at, first),
            None => (hours_between(self.created_at, now) / 24.0).ceil() * 24.0,
        }
    }
}

/// Open issues (pull requests excluded) with their first comment time
pub fn fetch_issue_activity(
    ctx: &ApiContext<'_>,
    repo: &RepositoryRef,
) -> HttpResult<Vec<IssueActivity>> {
    info!("Fetching issues for repo: {}", repo);
    let url = ctx.repo_url(repo, "/issues?state=open&per_page=100");
    let issues: Vec<OpenIssue> = get_json(ctx.http, &url)?;

    let mut activity = Vec::with_capacity(issues.len());
    for issue in issues {
        if issue.pull_request.as_ref().is_some_and(|v| !v.is_null()) {
            continue;
        }
        let comments: Vec<Comment> = get_json(ctx.http, &issue.comments_url)?;
        activity.push(IssueActivity {
            created_at: issue.created_at,
            first_comment_at: comments.first().map(|c| c.created_at),
        });
    }
    Ok(activity)
}

/// Score for the average response time across `issues`; 0 with no issues
pub fn responsiveness_score(issues: &[IssueActivity], now: DateTime<Utc>) -> f64 {
    if issues.is_empty() {
        debug!("No issues with response time found");
        return 0.0;
    }
    let total: f64 = issues.iter().map(|i| i.response_hours(now)).sum();
    let average = total / issues.len() as f64;
    debug!("Average response time: {:.2} hours", average);
    (1.0 - ((average - 24.0).max(0.0) / 24.0) * 0.25).max(0.0)
}

pub fn collect(ctx: &ApiContext<'_>, repo: &RepositoryRef) -> MetricResult {
    match fetch_issue_activity(ctx, repo) {
        Ok(issues) => {
            let score = responsiveness_score(&issues, Utc::now());
            info!("Responsive maintainer score for {}: {}", repo, score);
            MetricResult::Score(score)
        }
        Err(e) => {
            info!("Error fetching and calculating responsive maintainer");
            debug!("Error details for {}: {}", repo, e);
            MetricResult::Failed
        }
    }
}
