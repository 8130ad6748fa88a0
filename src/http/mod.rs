//! HTTP access to GitHub and the npm registry
//!
//! Every collector talks to the network through the [`HttpClient`] trait so
//! the scoring pipeline can run against a stub in tests. The production
//! implementation is [`GitHubHttp`], a sync ureq client with a per-call
//! timeout and retry-with-backoff.
//!
//! Non-2xx responses surface as [`HttpError::Status`]; collectors catch
//! every `HttpError` at their boundary and turn it into a metric failure.

mod client;

pub use client::{Endpoints, GitHubHttp, RetryPolicy};

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Accept header that makes GitHub return raw file content instead of JSON.
pub const ACCEPT_RAW: &str = "application/vnd.github.v3.raw";

/// Errors that can occur while talking to a remote API
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl HttpError {
    /// HTTP status code, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            HttpError::Transport { .. } => true,
            HttpError::Status { status, .. } => *status == 429 || *status >= 500,
            HttpError::Decode { .. } => false,
        }
    }
}

pub type HttpResult<T> = Result<T, HttpError>;

/// Minimal GET/POST surface the collectors need.
///
/// Implementations decide which requests carry the bearer token.
pub trait HttpClient: Send + Sync {
    /// GET `url` and return the body as text. `accept` overrides the
    /// default `Accept` header.
    fn get_text(&self, url: &str, accept: Option<&str>) -> HttpResult<String>;

    /// POST a JSON body to `url` and return the response body as text.
    fn post_json(&self, url: &str, body: &serde_json::Value) -> HttpResult<String>;
}

/// GET `url` and decode the JSON body into `T`.
pub fn get_json<T: DeserializeOwned>(client: &dyn HttpClient, url: &str) -> HttpResult<T> {
    let text = client.get_text(url, None)?;
    decode(url, &text)
}

/// POST `body` to `url` and decode the JSON response into `T`.
pub fn post_json<T: DeserializeOwned>(
    client: &dyn HttpClient,
    url: &str,
    body: &serde_json::Value,
) -> HttpResult<T> {
    let text = client.post_json(url, body)?;
    decode(url, &text)
}

fn decode<T: DeserializeOwned>(url: &str, text: &str) -> HttpResult<T> {
    serde_json::from_str(text).map_err(|e| HttpError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
pub(crate) mod testing {
    //! Canned-response HTTP client for unit tests.

    use super::{HttpClient, HttpError, HttpResult};
    use std::collections::HashMap;
    use std::sync::Mutex;

    enum Canned {
        Body(String),
        Status(u16),
    }

    /// Serves registered responses by URL prefix; the longest matching
    /// prefix wins. Unregistered URLs answer 404.
    #[derive(Default)]
    pub struct StubHttp {
        routes: HashMap<String, Canned>,
        requests: Mutex<Vec<String>>,
    }

    impl StubHttp {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(mut self, prefix: &str, body: impl Into<String>) -> Self {
            self.routes
                .insert(prefix.to_string(), Canned::Body(body.into()));
            self
        }

        pub fn with_json(self, prefix: &str, value: serde_json::Value) -> Self {
            self.with(prefix, value.to_string())
        }

        pub fn with_status(mut self, prefix: &str, status: u16) -> Self {
            self.routes.insert(prefix.to_string(), Canned::Status(status));
            self
        }

        /// URLs requested so far, in order
        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().map(|r| r.clone()).unwrap_or_default()
        }

        fn respond(&self, url: &str) -> HttpResult<String> {
            if let Ok(mut log) = self.requests.lock() {
                log.push(url.to_string());
            }
            let hit = self
                .routes
                .iter()
                .filter(|(prefix, _)| {
                    url.starts_with(prefix.as_str())
                        && matches!(url[prefix.len()..].chars().next(), None | Some('&') | Some('?'))
                })
                .max_by_key(|(prefix, _)| prefix.len());
            match hit {
                Some((_, Canned::Body(body))) => Ok(body.clone()),
                Some((_, Canned::Status(status))) => Err(HttpError::Status {
                    url: url.to_string(),
                    status: *status,
                }),
                None => Err(HttpError::Status {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        }
    }

    impl HttpClient for StubHttp {
        fn get_text(&self, url: &str, _accept: Option<&str>) -> HttpResult<String> {
            self.respond(url)
        }

        fn post_json(&self, url: &str, _body: &serde_json::Value) -> HttpResult<String> {
            self.respond(url)
        }
    }
}
