//! License: compatible open-source license in LICENSE or README.md
//!
//! Compatible: MIT, BSD 2/3-Clause, Apache 2.0, GPLv2, LGPLv2.1.

use super::{ApiContext, MetricResult};
use crate::http::{get_json, HttpResult};
use crate::models::RepositoryRef;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use tracing::debug;

static COMPATIBLE_LICENSES: OnceLock<Regex> = OnceLock::new();

fn compatible_licenses() -> &'static Regex {
    COMPATIBLE_LICENSES.get_or_init(|| {
        Regex::new(
            r"(?i)lgplv2\.1|lesser general public license v2\.1|gplv2|general public license v2|mit license|bsd 2-clause license|bsd 3-clause license|apache license 2\.0",
        )
        .expect("valid license regex")
    })
}

#[derive(Deserialize)]
struct RepoInfo {
    default_branch: String,
}

/// Whether `content` names a compatible license (case-insensitive)
pub fn is_compatible_license(content: &str) -> bool {
    let compatible = compatible_licenses().is_match(content);
    debug!(
        "License compatibility: {}",
        if compatible { "Compatible" } else { "Incompatible" }
    );
    compatible
}

pub fn fetch_default_branch(ctx: &ApiContext<'_>, repo: &RepositoryRef) -> HttpResult<String> {
    let info: RepoInfo = get_json(ctx.http, &ctx.repo_url(repo, ""))?;
    debug!("Default branch for {}: {}", repo, info.default_branch);
    Ok(info.default_branch)
}

/// Raw file from `branch`; `None` if it cannot be downloaded
fn download_file(
    ctx: &ApiContext<'_>,
    repo: &RepositoryRef,
    branch: &str,
    file_name: &str,
) -> Option<String> {
    let url = format!(
        "{}/{}/{}/{}/{}",
        ctx.endpoints.raw_content, repo.owner, repo.name, branch, file_name
    );
    match ctx.http.get_text(&url, None) {
        Ok(content) => {
            debug!("{} downloaded successfully", file_name);
            Some(content)
        }
        Err(e) => {
            debug!("Error downloading {}: {}", file_name, e);
            None
        }
    }
}

pub fn collect(ctx: &ApiContext<'_>, repo: &RepositoryRef) -> MetricResult {
    let branch = match fetch_default_branch(ctx, repo) {
        Ok(branch) => branch,
        Err(e) => {
            debug!("Error fetching default branch for {}: {}", repo, e);
            return MetricResult::Failed;
        }
    };

    for file_name in ["LICENSE", "README.md"] {
        if download_file(ctx, repo, &branch, file_name).is_some_and(|c| is_compatible_license(&c)) {
            debug!("Compatible license found in {}", file_name);
            return MetricResult::Score(1.0);
        }
    }

    debug!("No compatible license found for {}", repo);
    MetricResult::Score(0.0)
}
