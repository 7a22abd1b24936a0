//! The remote client seam.
//!
//! Aggregation only talks to the platform through [`StatsClient`]. The
//! production implementation is [`GithubClient`](crate::github::GithubClient);
//! tests substitute in-memory fakes.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::month::DateRange;

/// A repository belonging to an organization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Repo {
    /// Short name, e.g. `widgets`.
    pub name: String,
    /// Owner-qualified name, e.g. `acme/widgets`.
    pub full_name: String,
}

impl Repo {
    /// Build a repo from its owner and short name.
    pub fn new(owner: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            full_name: format!("{owner}/{name}"),
        }
    }
}

/// Issue/PR state filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    /// Only open items.
    Open,
    /// Any state.
    All,
}

impl ItemState {
    /// Lowercase API spelling.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::All => "all",
        }
    }
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures from the remote API.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The API answered with a non-success status.
    #[error("GitHub API returned {status} for {url}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
        /// API error message, or the raw body.
        message: String,
    },

    /// The request never produced a response (DNS, TLS, timeout...).
    #[error("request to {url} failed: {message}")]
    Transport {
        /// Requested URL.
        url: String,
        /// Transport failure description.
        message: String,
    },

    /// The response body was not the expected JSON.
    #[error("unexpected response from {url}")]
    Decode {
        /// Requested URL.
        url: String,
        /// Decoding failure.
        #[source]
        source: std::io::Error,
    },
}

/// Result alias for remote calls.
pub type ClientResult<T> = Result<T, ClientError>;

/// Listing and counting calls the aggregation needs from the platform.
pub trait StatsClient {
    /// Every repository owned by `org`, in listing order.
    fn list_repos(&self, org: &str) -> ClientResult<Vec<Repo>>;

    /// Commits authored by `user` in `repo` within `range`.
    fn count_commits(&self, repo: &Repo, user: &str, range: &DateRange) -> ClientResult<u64>;

    /// Pull requests in `repo` reviewed by `user` within `range`.
    fn count_reviews(&self, repo: &Repo, user: &str, range: &DateRange) -> ClientResult<u64>;

    /// Pull requests opened by `user` in `repo` within `range`, filtered by state.
    fn count_prs(
        &self,
        repo: &Repo,
        user: &str,
        range: &DateRange,
        state: ItemState,
    ) -> ClientResult<u64>;

    /// Issues opened by `user` in `repo` within `range`, filtered by state.
    fn count_issues(
        &self,
        repo: &Repo,
        user: &str,
        range: &DateRange,
        state: ItemState,
    ) -> ClientResult<u64>;
}

impl<T: StatsClient + ?Sized> StatsClient for &T {
    fn list_repos(&self, org: &str) -> ClientResult<Vec<Repo>> {
        (**self).list_repos(org)
    }

    fn count_commits(&self, repo: &Repo, user: &str, range: &DateRange) -> ClientResult<u64> {
        (**self).count_commits(repo, user, range)
    }

    fn count_reviews(&self, repo: &Repo, user: &str, range: &DateRange) -> ClientResult<u64> {
        (**self).count_reviews(repo, user, range)
    }

    fn count_prs(
        &self,
        repo: &Repo,
        user: &str,
        range: &DateRange,
        state: ItemState,
    ) -> ClientResult<u64> {
        (**self).count_prs(repo, user, range, state)
    }

    fn count_issues(
        &self,
        repo: &Repo,
        user: &str,
        range: &DateRange,
        state: ItemState,
    ) -> ClientResult<u64> {
        (**self).count_issues(repo, user, range, state)
    }
}
