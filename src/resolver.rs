//! Repository resolution: GitHub and npm URLs to `{owner, repo}`
//!
//! GitHub URLs are parsed directly. npm package URLs take one trip through
//! the npm registry to read the package's `repository` field, which must
//! point back at GitHub. Anything else does not resolve.

use crate::http::{get_json, HttpResult};
use crate::metrics::ApiContext;
use crate::models::RepositoryRef;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use tracing::{debug, info};

static GITHUB_URL: OnceLock<Regex> = OnceLock::new();
static NPM_URL: OnceLock<Regex> = OnceLock::new();
static SHORTHAND: OnceLock<Regex> = OnceLock::new();

fn github_url_pattern() -> &'static Regex {
    GITHUB_URL.get_or_init(|| {
        Regex::new(r"(?:^|//|@)(?:www\.)?github\.com[/:]([^/?#\s]+)/([^/?#\s]+)").expect("valid GitHub URL regex")
    })
}

fn npm_url_pattern() -> &'static Regex {
    NPM_URL.get_or_init(|| {
        Regex::new(r"npmjs\.com/package/((?:@[^/?#\s]+/)?[^/?#\s]+)").expect("valid npm URL regex")
    })
}

fn shorthand_pattern() -> &'static Regex {
    SHORTHAND.get_or_init(|| {
        Regex::new(r"^(?:github:)?([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+)$")
            .expect("valid shorthand regex")
    })
}

/// `repository` as published in npm metadata: `{ "type", "url" }` or a bare string
#[derive(Deserialize)]
#[serde(untagged)]
enum RepositoryField {
    Object { url: String },
    Text(String),
}

#[derive(Deserialize)]
struct NpmPackage {
    #[serde(default)]
    repository: Option<RepositoryField>,
}

/// `{owner, repo}` from a GitHub web or git URL
pub fn github_repo_from_url(url: &str) -> Option<RepositoryRef> {
    let caps = github_url_pattern().captures(url)?;
    let owner = &caps[1];
    let name = caps[2].strip_suffix(".git").unwrap_or(&caps[2]);
    if owner.is_empty() || name.is_empty() {
        return None;
    }
    Some(RepositoryRef::new(owner, name))
}

/// Package name from an `npmjs.com/package/<name>` URL, scope included
pub fn npm_package_name(url: &str) -> Option<String> {
    npm_url_pattern()
        .captures(url)
        .map(|caps| caps[1].to_string())
}

/// Rewrite an npm `repository` value to an `https://` GitHub URL.
///
/// Accepts `git+ssh://git@`, `git+https://`, `git://` and `ssh://git@`
/// forms as well as the `github:owner/repo` and `owner/repo` shorthands.
/// Returns `None` unless the result points at github.com.
pub fn normalize_repository_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Some(caps) = shorthand_pattern().captures(raw) {
        let name = caps[2].strip_suffix(".git").unwrap_or(&caps[2]);
        return Some(format!("https://github.com/{}/{}", &caps[1], name));
    }

    let mut url = raw.to_string();
    for (from, to) in [
        ("git+ssh://git@", "https://"),
        ("ssh://git@", "https://"),
        ("git://", "https://"),
        ("git@github.com:", "https://github.com/"),
    ] {
        if let Some(rest) = url.strip_prefix(from) {
            url = format!("{to}{rest}");
        }
    }
    if let Some(rest) = url.strip_prefix("git+") {
        url = rest.to_string();
    }
    let url = url.trim_end_matches('/');
    let url = url.strip_suffix(".git").unwrap_or(url);

    if url.contains("github.com") {
        Some(url.to_string())
    } else {
        debug!("Repository URL is not on GitHub: {}", raw);
        None
    }
}

/// Registry document URL for `name`; the scope separator is escaped
fn registry_url(ctx: &ApiContext<'_>, name: &str) -> String {
    format!("{}/{}", ctx.endpoints.npm_registry, name.replace('/', "%2f"))
}

/// The raw `repository` URL published for an npm package, if any
pub fn fetch_npm_repository_url(ctx: &ApiContext<'_>, name: &str) -> HttpResult<Option<String>> {
    let package: NpmPackage = get_json(ctx.http, &registry_url(ctx, name))?;
    Ok(package.repository.map(|repo| match repo {
        RepositoryField::Object { url } => url,
        RepositoryField::Text(url) => url,
    }))
}

fn resolve_npm(ctx: &ApiContext<'_>, name: &str) -> Option<RepositoryRef> {
    let raw = match fetch_npm_repository_url(ctx, name) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            info!("npm package {} publishes no repository", name);
            return None;
        }
        Err(e) => {
            info!("Failed to fetch npm metadata for {}", name);
            debug!("npm registry error: {}", e);
            return None;
        }
    };
    let url = normalize_repository_url(&raw)?;
    github_repo_from_url(&url)
}

/// Resolve a GitHub or npm URL to the repository it scores.
///
/// `None` means the URL is skipped; nothing here returns an error.
pub fn handle_url(ctx: &ApiContext<'_>, url: &str) -> Option<RepositoryRef> {
    let url = url.trim();
    if let Some(name) = npm_package_name(url) {
        debug!("Resolving npm package {}", name);
        let repo = resolve_npm(ctx, &name);
        if repo.is_none() {
            info!("No GitHub repository found for npm package {}", name);
        }
        return repo;
    }
    if let Some(repo) = github_repo_from_url(url) {
        return Some(repo);
    }
    info!("Invalid URL format: {}", url);
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::StubHttp;
    use crate::http::Endpoints;
    use serde_json::json;

    #[test]
    fn test_github_urls() {
        let expected = Some(RepositoryRef::new("lodash", "lodash"));
        assert_eq!(github_repo_from_url("https://github.com/lodash/lodash"), expected);
        assert_eq!(github_repo_from_url("https://github.com/lodash/lodash.git"), expected);
        assert_eq!(github_repo_from_url("https://github.com/lodash/lodash/"), expected);
        assert_eq!(
            github_repo_from_url("https://github.com/lodash/lodash?tab=readme#top"),
            expected
        );
        assert_eq!(github_repo_from_url("git@github.com:lodash/lodash.git"), expected);
        assert_eq!(
            github_repo_from_url("https://github.com/lodash/lodash/tree/main/src"),
            expected
        );
    }

    #[test]
    fn test_non_github_urls() {
        assert_eq!(github_repo_from_url("https://gitlab.com/o/r"), None);
        assert_eq!(github_repo_from_url("https://github.com/only-owner"), None);
        assert_eq!(github_repo_from_url("not a url"), None);
        assert_eq!(github_repo_from_url("https://gist.github.com/user/abc123"), None);
        assert_eq!(github_repo_from_url("https://notgithub.com/a/b"), None);
        assert_eq!(
            github_repo_from_url("https://www.github.com/a/b"),
            Some(RepositoryRef::new("a", "b"))
        );
        assert_eq!(
            github_repo_from_url("github.com/a/b"),
            Some(RepositoryRef::new("a", "b"))
        );
    }

    #[test]
    fn test_npm_package_names() {
        assert_eq!(
            npm_package_name("https://www.npmjs.com/package/express").as_deref(),
            Some("express")
        );
        assert_eq!(
            npm_package_name("https://www.npmjs.com/package/@babel/core?activeTab=code").as_deref(),
            Some("@babel/core")
        );
        assert_eq!(npm_package_name("https://github.com/o/r"), None);
    }

    #[test]
    fn test_normalize_repository_url() {
        assert_eq!(
            normalize_repository_url("git+https://github.com/expressjs/express.git").as_deref(),
            Some("https://github.com/expressjs/express")
        );
        assert_eq!(
            normalize_repository_url("git+ssh://git@github.com/o/r.git").as_deref(),
            Some("https://github.com/o/r")
        );
        assert_eq!(
            normalize_repository_url("git://github.com/o/r.git").as_deref(),
            Some("https://github.com/o/r")
        );
        assert_eq!(
            normalize_repository_url("github:o/r").as_deref(),
            Some("https://github.com/o/r")
        );
        assert_eq!(
            normalize_repository_url("o/r").as_deref(),
            Some("https://github.com/o/r")
        );
        assert_eq!(normalize_repository_url("git+https://gitlab.com/o/r.git"), None);
        assert_eq!(normalize_repository_url("bitbucket:o/r"), None);
    }

    #[test]
    fn test_handle_github_url_without_network() {
        let stub = StubHttp::new();
        let endpoints = Endpoints::default();
        let ctx = ApiContext::new(&stub, &endpoints);
        assert_eq!(
            handle_url(&ctx, " https://github.com/o/r \n"),
            Some(RepositoryRef::new("o", "r"))
        );
        assert!(stub.requests().is_empty());
    }

    #[test]
    fn test_handle_npm_url() {
        let stub = StubHttp::new().with_json(
            "https://registry.npmjs.org/express",
            json!({ "repository": { "type": "git", "url": "git+https://github.com/expressjs/express.git" } }),
        );
        let endpoints = Endpoints::default();
        let ctx = ApiContext::new(&stub, &endpoints);
        assert_eq!(
            handle_url(&ctx, "https://www.npmjs.com/package/express"),
            Some(RepositoryRef::new("expressjs", "express"))
        );
    }

    #[test]
    fn test_handle_scoped_npm_url_with_string_repository() {
        let stub = StubHttp::new().with_json(
            "https://registry.npmjs.org/@babel%2fcore",
            json!({ "repository": "github:babel/babel" }),
        );
        let endpoints = Endpoints::default();
        let ctx = ApiContext::new(&stub, &endpoints);
        assert_eq!(
            handle_url(&ctx, "https://www.npmjs.com/package/@babel/core"),
            Some(RepositoryRef::new("babel", "babel"))
        );
    }

    #[test]
    fn test_npm_package_off_github_fails() {
        let stub = StubHttp::new()
            .with_json(
                "https://registry.npmjs.org/a",
                json!({ "repository": { "url": "git+https://gitlab.com/o/a.git" } }),
            )
            .with_json("https://registry.npmjs.org/b", json!({ "name": "b" }));
        let endpoints = Endpoints::default();
        let ctx = ApiContext::new(&stub, &endpoints);
        assert_eq!(handle_url(&ctx, "https://www.npmjs.com/package/a"), None);
        assert_eq!(handle_url(&ctx, "https://www.npmjs.com/package/b"), None);
        assert_eq!(handle_url(&ctx, "https://www.npmjs.com/package/missing"), None);
    }

    #[test]
    fn test_other_urls_fail_immediately() {
        let stub = StubHttp::new();
        let endpoints = Endpoints::default();
        let ctx = ApiContext::new(&stub, &endpoints);
        assert_eq!(handle_url(&ctx, "https://pypi.org/project/requests"), None);
        assert_eq!(handle_url(&ctx, ""), None);
        assert!(stub.requests().is_empty());
    }
}
