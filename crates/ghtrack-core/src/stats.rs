//! Per-user, per-repository count accumulator.
//!
//! Every requested (user, repo) pair that is not skipped is seeded with
//! zero before any remote call, so the report always lists the full
//! requested grid even when the API never returns a count for a pair.

use std::collections::BTreeMap;

use serde::Serialize;

/// Two-level mapping `user -> repo -> count`.
///
/// Backed by ordered maps, so serialization emits sorted keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StatsAccumulator {
    counts: BTreeMap<String, BTreeMap<String, u64>>,
}

impl StatsAccumulator {
    /// Seed zero counts for every user and every repo not in `skip_repos`.
    pub fn init(users: &[String], repos: &[String], skip_repos: &[String]) -> Self {
        let mut counts = BTreeMap::new();
        for user in users {
            let per_repo: BTreeMap<String, u64> = repos
                .iter()
                .filter(|repo| !skip_repos.contains(*repo))
                .map(|repo| (repo.clone(), 0))
                .collect();
            counts.insert(user.clone(), per_repo);
        }
        Self { counts }
    }

    /// Store the count for one pair, replacing any earlier value.
    pub fn record(&mut self, user: &str, repo: &str, count: u64) {
        self.counts
            .entry(user.to_string())
            .or_default()
            .insert(repo.to_string(), count);
    }

    /// Count for one pair, if present.
    pub fn get(&self, user: &str, repo: &str) -> Option<u64> {
        self.counts.get(user)?.get(repo).copied()
    }

    /// Repository counts for one user.
    pub fn repos_for(&self, user: &str) -> Option<&BTreeMap<String, u64>> {
        self.counts.get(user)
    }

    /// Whether no user is present.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn init_seeds_zero_and_omits_skipped() {
        let acc = StatsAccumulator::init(
            &strings(&["alice", "bob"]),
            &strings(&["r1", "r2"]),
            &strings(&["r2"]),
        );

        let json = serde_json::to_value(&acc).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"alice": {"r1": 0}, "bob": {"r1": 0}})
        );
        assert_eq!(acc.get("alice", "r2"), None);
    }

    #[test]
    fn init_is_idempotent() {
        let users = strings(&["alice"]);
        let repos = strings(&["r1", "r2"]);
        let skip = strings(&[]);
        assert_eq!(
            StatsAccumulator::init(&users, &repos, &skip),
            StatsAccumulator::init(&users, &repos, &skip)
        );
    }

    #[test]
    fn users_without_repos_still_appear() {
        let acc = StatsAccumulator::init(&strings(&["alice"]), &[], &[]);
        assert_eq!(serde_json::to_value(&acc).unwrap(), serde_json::json!({"alice": {}}));
        assert!(!acc.is_empty());
    }

    #[test]
    fn record_overwrites_earlier_counts() {
        let mut acc = StatsAccumulator::init(&strings(&["alice"]), &strings(&["r1", "r2"]), &[]);
        acc.record("alice", "r1", 5);
        acc.record("alice", "r2", 2);
        acc.record("alice", "r2", 3);
        assert_eq!(acc.get("alice", "r1"), Some(5));
        assert_eq!(acc.get("alice", "r2"), Some(3));
    }

    #[test]
    fn users_are_sorted() {
        let acc = StatsAccumulator::init(&strings(&["zed", "amy"]), &[], &[]);
        let json = serde_json::to_string(&acc).unwrap();
        assert_eq!(json, r#"{"amy":{},"zed":{}}"#);
    }
}
