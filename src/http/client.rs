//! ureq-backed HTTP client for GitHub REST, GitHub GraphQL and npm
//!
//! Uses ureq (sync HTTP), no async runtime needed. Status codes are handled
//! here rather than by ureq so that 4xx/5xx become typed [`HttpError`]s.

use super::{HttpClient, HttpError, HttpResult};
use crate::config::HttpConfig;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Base URLs of the remote services
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub github_api: String,
    pub github_graphql: String,
    pub raw_content: String,
    pub npm_registry: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            github_api: "https://api.github.com".to_string(),
            github_graphql: "https://api.github.com/graphql".to_string(),
            raw_content: "https://raw.githubusercontent.com".to_string(),
            npm_registry: "https://registry.npmjs.org".to_string(),
        }
    }
}

impl Endpoints {
    /// Whether requests to `url` should carry the GitHub token
    fn is_github(&self, url: &str) -> bool {
        url.starts_with(&self.github_api)
            || url.starts_with(&self.github_graphql)
            || url.starts_with(&self.raw_content)
    }
}

/// Bounded retry with exponential backoff
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (0-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Bearer-token client shared by all collectors
pub struct GitHubHttp {
    token: String,
    endpoints: Endpoints,
    retry: RetryPolicy,
    agent: ureq::Agent,
}

fn make_agent(timeout: Duration) -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false)
        .timeout_global(Some(timeout))
        .build()
        .new_agent()
}

impl GitHubHttp {
    pub fn new(token: impl Into<String>, config: &HttpConfig) -> Self {
        Self {
            token: token.into(),
            endpoints: config.endpoints(),
            retry: config.retry_policy(),
            agent: make_agent(Duration::from_secs(config.timeout_secs)),
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn with_retry<F>(&self, url: &str, mut send: F) -> HttpResult<String>
    where
        F: FnMut() -> HttpResult<String>,
    {
        let mut attempt = 0;
        loop {
            match send() {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt < self.retry.max_retries => {
                    let delay = self.retry.delay(attempt);
                    warn!(
                        "{} (attempt {}/{}), retrying in {:?}",
                        e,
                        attempt + 1,
                        self.retry.max_retries + 1,
                        delay
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => {
                    debug!("Giving up on {}: {}", url, e);
                    return Err(e);
                }
            }
        }
    }

    fn read_response(url: &str, response: ureq::http::Response<ureq::Body>) -> HttpResult<String> {
        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(HttpError::Status {
                url: url.to_string(),
                status,
            });
        }
        response
            .into_body()
            .read_to_string()
            .map_err(|e| HttpError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            })
    }

    fn transport(url: &str, e: ureq::Error) -> HttpError {
        HttpError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}

impl HttpClient for GitHubHttp {
    fn get_text(&self, url: &str, accept: Option<&str>) -> HttpResult<String> {
        let authorize = self.endpoints.is_github(url) && !self.token.is_empty();
        self.with_retry(url, || {
            let mut req = self
                .agent
                .get(url)
                .header("Accept", accept.unwrap_or("application/json"));
            if authorize {
                req = req.header("Authorization", &format!("Bearer {}", self.token));
            }
            let response = req.call().map_err(|e| Self::transport(url, e))?;
            Self::read_response(url, response)
        })
    }

    fn post_json(&self, url: &str, body: &serde_json::Value) -> HttpResult<String> {
        let authorize = self.endpoints.is_github(url) && !self.token.is_empty();
        self.with_retry(url, || {
            let mut req = self
                .agent
                .post(url)
                .header("Content-Type", "application/json");
            if authorize {
                req = req.header("Authorization", &format!("Bearer {}", self.token));
            }
            let response = req.send_json(body).map_err(|e| Self::transport(url, e))?;
            Self::read_response(url, response)
        })
    }
}
