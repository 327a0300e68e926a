//! GitHub Repository Fetcher
//!
//! Lists a user's public repositories through the GitHub REST API, following
//! `Link: rel="next"` pagination and normalizing each entry into a
//! [`RepositoryRecord`]. Forks are dropped.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, LINK};
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::models::{RawRepository, RepositoryRecord};

use super::link_header;

/// Default timeout for GitHub requests (30 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default GitHub REST API base URL
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// User agent sent with every request (GitHub rejects requests without one)
pub const USER_AGENT: &str = "portfolio-site";

/// Upper bound on pages followed in one listing
pub const MAX_PAGES: usize = 50;

/// Errors that can occur while fetching repositories
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request did not complete within the configured timeout
    #[error("GitHub request timed out")]
    Timeout,

    /// GitHub answered with a non-success status
    #[error("GitHub returned HTTP {status}")]
    HttpStatus { status: u16 },

    /// Connection or protocol failure
    #[error("GitHub request failed: {0}")]
    Network(#[source] reqwest::Error),

    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = err.status() {
            FetchError::HttpStatus {
                status: status.as_u16(),
            }
        } else {
            FetchError::Network(err)
        }
    }
}

/// Source of a user's repositories
#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// Fetch every non-fork repository of `username`, unranked
    async fn list_repositories(&self, username: &str) -> Result<Vec<RepositoryRecord>, FetchError>;
}

/// GitHub REST API client
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    api_base: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Create a client against `api_base` with the given request timeout
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the HTTP client cannot be built
    pub fn new(
        api_base: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    /// URL of the first page of `username`'s repositories, most recently pushed first
    pub fn user_repos_url(&self, username: &str) -> String {
        format!("{}/users/{}/repos?sort=pushed", self.api_base, username)
    }

    /// Fetch all pages starting at `url`.
    ///
    /// Each call starts from an empty accumulator. Pages are requested one after
    /// another since the next URL is only known once the previous response arrives.
    pub async fn fetch_repositories(&self, url: &str) -> Result<Vec<RepositoryRecord>, FetchError> {
        let mut repos = Vec::new();
        let mut next_url = Some(url.to_string());
        let mut pages = 0usize;

        while let Some(url) = next_url.take() {
            if pages == MAX_PAGES {
                warn!(url = %url, max_pages = MAX_PAGES, "Page limit reached, stopping pagination");
                break;
            }
            pages += 1;

            let page = self.fetch_page(&url).await?;
            let Some(entries) = page.entries else {
                break;
            };

            let before = repos.len();
            repos.extend(normalize(entries));
            debug!(url = %url, page = pages, kept = repos.len() - before, "Fetched repository page");

            next_url = page.next;
        }

        Ok(repos)
    }

    async fn fetch_page(&self, url: &str) -> Result<Page, FetchError> {
        let mut request = self
            .client
            .get(url)
            .header(ACCEPT, "application/vnd.github+json");

        if let Some(token) = &self.token {
            if self.is_api_origin(url) {
                request = request.header(AUTHORIZATION, format!("token {token}"));
            } else {
                debug!(url = %url, "Not sending token outside the API origin");
            }
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let next = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .map(link_header::parse)
            .and_then(|mut links| links.remove("next"))
            .and_then(|rel| resolve_next(url, &rel.url));

        let body = response.text().await?;

        let entries = match serde_json::from_str::<Value>(&body) {
            Ok(Value::Array(entries)) => Some(entries),
            Ok(other) => {
                warn!(url = %url, kind = json_kind(&other), "Unexpected GitHub payload, expected an array");
                None
            }
            Err(e) => {
                warn!(url = %url, error = %e, "GitHub payload is not valid JSON");
                None
            }
        };

        Ok(Page { entries, next })
    }
}

impl GitHubClient {
    /// Whether `url` shares scheme, host and port with the configured API base
    fn is_api_origin(&self, url: &str) -> bool {
        match (Url::parse(&self.api_base), Url::parse(url)) {
            (Ok(base), Ok(target)) => base.origin() == target.origin(),
            _ => false,
        }
    }
}

/// Resolve a `next` link, which may be relative, against the page it came from
fn resolve_next(current: &str, next: &str) -> Option<String> {
    match Url::parse(current).and_then(|base| base.join(next)) {
        Ok(resolved) => Some(resolved.into()),
        Err(e) => {
            warn!(current = %current, next = %next, error = %e, "Ignoring unusable next link");
            None
        }
    }
}

#[async_trait]
impl RepositorySource for GitHubClient {
    async fn list_repositories(&self, username: &str) -> Result<Vec<RepositoryRecord>, FetchError> {
        self.fetch_repositories(&self.user_repos_url(username)).await
    }
}

/// One fetched page: its entries (`None` if the body was unusable) and the next URL
struct Page {
    entries: Option<Vec<Value>>,
    next: Option<String>,
}

/// Decode raw entries, dropping forks and anything that is not a repository object
fn normalize(entries: Vec<Value>) -> impl Iterator<Item = RepositoryRecord> {
    entries.into_iter().filter_map(|entry| {
        match serde_json::from_value::<RawRepository>(entry) {
            Ok(raw) if raw.is_fork() => None,
            Ok(raw) => Some(RepositoryRecord::from(raw)),
            Err(e) => {
                warn!(error = %e, "Skipping malformed repository entry");
                None
            }
        }
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
