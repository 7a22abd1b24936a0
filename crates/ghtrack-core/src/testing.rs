//! In-memory [`StatsClient`] used by unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::client::{ClientError, ClientResult, ItemState, Repo, StatsClient};
use crate::month::DateRange;

/// Serves a fixed org listing and per-(repo, user) counts, recording every call.
pub struct FakeClient {
    org: String,
    repos: Vec<Repo>,
    counts: HashMap<(String, String), u64>,
    fail_list: bool,
    fail_count: Option<(String, String)>,
    list_calls: Cell<usize>,
    count_calls: RefCell<Vec<String>>,
}

impl FakeClient {
    pub fn new(org: &str, repos: &[&str]) -> Self {
        Self {
            org: org.to_string(),
            repos: repos.iter().map(|name| Repo::new(org, name)).collect(),
            counts: HashMap::new(),
            fail_list: false,
            fail_count: None,
            list_calls: Cell::new(0),
            count_calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_count(mut self, repo: &str, user: &str, count: u64) -> Self {
        self.counts
            .insert((repo.to_string(), user.to_string()), count);
        self
    }

    pub const fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn failing_count(mut self, repo: &str, user: &str) -> Self {
        self.fail_count = Some((repo.to_string(), user.to_string()));
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.get()
    }

    /// Count calls as `"<kind>[:<state>] <repo> <user>"`.
    pub fn count_calls(&self) -> Vec<String> {
        self.count_calls.borrow().clone()
    }

    pub fn calls(&self) -> usize {
        self.list_calls() + self.count_calls.borrow().len()
    }

    fn count(&self, label: String, repo: &Repo, user: &str) -> ClientResult<u64> {
        self.count_calls
            .borrow_mut()
            .push(format!("{label} {} {user}", repo.name));
        let key = (repo.name.clone(), user.to_string());
        if self.fail_count.as_ref() == Some(&key) {
            return Err(ClientError::Status {
                status: 403,
                url: format!("https://api.test/repos/{}", repo.full_name),
                message: "API rate limit exceeded".to_string(),
            });
        }
        Ok(self.counts.get(&key).copied().unwrap_or(0))
    }
}

impl StatsClient for FakeClient {
    fn list_repos(&self, org: &str) -> ClientResult<Vec<Repo>> {
        self.list_calls.set(self.list_calls.get() + 1);
        if self.fail_list || org != self.org {
            return Err(ClientError::Status {
                status: 404,
                url: format!("https://api.test/orgs/{org}/repos"),
                message: "Not Found".to_string(),
            });
        }
        Ok(self.repos.clone())
    }

    fn count_commits(&self, repo: &Repo, user: &str, _range: &DateRange) -> ClientResult<u64> {
        self.count("commits".to_string(), repo, user)
    }

    fn count_reviews(&self, repo: &Repo, user: &str, _range: &DateRange) -> ClientResult<u64> {
        self.count("reviews".to_string(), repo, user)
    }

    fn count_prs(
        &self,
        repo: &Repo,
        user: &str,
        _range: &DateRange,
        state: ItemState,
    ) -> ClientResult<u64> {
        self.count(format!("prs:{state}"), repo, user)
    }

    fn count_issues(
        &self,
        repo: &Repo,
        user: &str,
        _range: &DateRange,
        state: ItemState,
    ) -> ClientResult<u64> {
        self.count(format!("issues:{state}"), repo, user)
    }
}
