//! GitHub REST implementation of [`StatsClient`].
//!
//! Blocking and sequential: each call issues one request at a time and
//! follows `Link: rel="next"` pagination until exhausted. Counts that the
//! search API can answer are read from `total_count` with a single
//! one-item page. There is no retry or backoff here.

use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace};

use crate::client::{ClientError, ClientResult, ItemState, Repo, StatsClient};
use crate::credentials::Credentials;
use crate::month::DateRange;

const PAGE_SIZE: &str = "100";
const API_VERSION: &str = "2022-11-28";

/// Connection settings for [`GithubClient`].
#[derive(Debug, Clone)]
pub struct GithubSettings {
    /// Base URL without trailing slash.
    pub api_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for GithubSettings {
    fn default() -> Self {
        Self {
            api_url: crate::config::DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(crate::config::DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl From<&crate::config::Config> for GithubSettings {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            api_url: config.api_url().to_string(),
            timeout: config.timeout(),
        }
    }
}

/// Blocking GitHub API client.
pub struct GithubClient {
    agent: ureq::Agent,
    api_url: String,
    token: String,
}

impl std::fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    total_count: u64,
}

#[derive(Deserialize)]
struct ApiMessage {
    message: String,
}

impl GithubClient {
    /// Build a client authenticated with `credentials`.
    pub fn new(credentials: &Credentials, settings: GithubSettings) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(settings.timeout)
            .user_agent(concat!("ghtrack/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            token: credentials.access_token().to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    fn request(&self, url: &str) -> ureq::Request {
        let request = self
            .agent
            .get(url)
            .set("Accept", "application/vnd.github+json")
            .set("X-GitHub-Api-Version", API_VERSION);
        if self.token.is_empty() {
            request
        } else {
            request.set("Authorization", &format!("Bearer {}", self.token))
        }
    }

    fn send(&self, request: ureq::Request, url: &str) -> ClientResult<ureq::Response> {
        trace!(%url, "GET");
        match request.call() {
            Ok(response) => Ok(response),
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                Err(ClientError::Status {
                    status,
                    url: url.to_string(),
                    message: api_message(&body),
                })
            }
            Err(ureq::Error::Transport(transport)) => Err(ClientError::Transport {
                url: url.to_string(),
                message: transport.to_string(),
            }),
        }
    }

    /// Fetch every page of a list endpoint, decoding items as `T`.
    fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ClientResult<Vec<T>> {
        let first = self.url(path);
        let mut request = self.request(&first).query("per_page", PAGE_SIZE);
        for (key, value) in query {
            request = request.query(key, value);
        }

        let mut items = Vec::new();
        let mut url = first;
        let mut page = 1usize;
        loop {
            let response = self.send(request, &url)?;
            let next = response.header("link").and_then(next_link);
            let batch: Vec<T> = response
                .into_json()
                .map_err(|source| ClientError::Decode {
                    url: url.clone(),
                    source,
                })?;
            debug!(%url, page, items = batch.len(), "fetched page");
            items.extend(batch);

            match next {
                Some(next_url) => {
                    request = self.request(&next_url);
                    url = next_url;
                    page += 1;
                }
                None => break,
            }
        }
        Ok(items)
    }

    /// Run an issue search and return its `total_count`.
    fn search_count(&self, query: &str) -> ClientResult<u64> {
        let url = self.url("search/issues");
        let request = self
            .request(&url)
            .query("q", query)
            .query("per_page", "1");
        let response = self.send(request, &url)?;
        let body: SearchResponse = response
            .into_json()
            .map_err(|source| ClientError::Decode {
                url: url.clone(),
                source,
            })?;
        debug!(query, total = body.total_count, "search count");
        Ok(body.total_count)
    }
}

impl StatsClient for GithubClient {
    #[instrument(skip(self))]
    fn list_repos(&self, org: &str) -> ClientResult<Vec<Repo>> {
        self.get_all(&format!("orgs/{org}/repos"), &[("type", "all")])
    }

    #[instrument(skip(self, repo, range), fields(repo = %repo.full_name))]
    fn count_commits(&self, repo: &Repo, user: &str, range: &DateRange) -> ClientResult<u64> {
        let since = range.since_timestamp();
        let until = range.until_timestamp();
        let commits: Vec<serde_json::Value> = self.get_all(
            &format!("repos/{}/commits", repo.full_name),
            &[("author", user), ("since", since.as_str()), ("until", until.as_str())],
        )?;
        Ok(commits.len() as u64)
    }

    #[instrument(skip(self, repo, range), fields(repo = %repo.full_name))]
    fn count_reviews(&self, repo: &Repo, user: &str, range: &DateRange) -> ClientResult<u64> {
        let query = search_query(&[
            "is:pr".to_string(),
            format!("repo:{}", repo.full_name),
            format!("reviewed-by:{user}"),
            format!("updated:{}", range.search_span()),
        ]);
        self.search_count(&query)
    }

    #[instrument(skip(self, repo, range), fields(repo = %repo.full_name))]
    fn count_prs(
        &self,
        repo: &Repo,
        user: &str,
        range: &DateRange,
        state: ItemState,
    ) -> ClientResult<u64> {
        self.search_count(&authored_query("is:pr", repo, user, range, state))
    }

    #[instrument(skip(self, repo, range), fields(repo = %repo.full_name))]
    fn count_issues(
        &self,
        repo: &Repo,
        user: &str,
        range: &DateRange,
        state: ItemState,
    ) -> ClientResult<u64> {
        self.search_count(&authored_query("is:issue", repo, user, range, state))
    }
}

fn authored_query(kind: &str, repo: &Repo, user: &str, range: &DateRange, state: ItemState) -> String {
    let mut terms = vec![
        kind.to_string(),
        format!("repo:{}", repo.full_name),
        format!("author:{user}"),
    ];
    if state != ItemState::All {
        terms.push(format!("state:{state}"));
    }
    terms.push(format!("created:{}", range.search_span()));
    search_query(&terms)
}

/// Join search qualifiers with spaces (ureq handles URL encoding).
pub fn search_query(terms: &[String]) -> String {
    terms.join(" ")
}

/// Extract the `rel="next"` target from a `Link` header.
pub fn next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim();
        let is_next = pieces.any(|param| {
            let param = param.trim();
            param == r#"rel="next""# || param == "rel=next"
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}

/// Best-effort extraction of the API's `message` field from an error body.
fn api_message(body: &str) -> String {
    serde_json::from_str::<ApiMessage>(body)
        .map(|m| m.message)
        .unwrap_or_else(|_| body.trim().to_string())
}
