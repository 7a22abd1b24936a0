//! Repository resolution: explicit names or the whole org.

use tracing::{debug, instrument};

use crate::client::{ClientResult, Repo, StatsClient};

/// The repository set a command will report on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRepos {
    /// Names to report on.
    pub names: Vec<String>,
    /// The org listing, when it had to be fetched to resolve the names.
    pub listing: Option<Vec<Repo>>,
    /// An explicit `--repos` list was discarded in favour of `--all-repos`.
    pub ignored_explicit: bool,
}

/// Resolve the effective repository names.
///
/// With `all_repos` unset the explicit list is returned unchanged and no
/// remote call is made. Otherwise the org is listed once and every
/// repository name replaces the explicit list.
#[instrument(skip(explicit, client), fields(explicit = explicit.len()))]
pub fn resolve_repos<C: StatsClient + ?Sized>(
    all_repos: bool,
    explicit: &[String],
    org: &str,
    client: &C,
) -> ClientResult<ResolvedRepos> {
    if !all_repos {
        return Ok(ResolvedRepos {
            names: explicit.to_vec(),
            listing: None,
            ignored_explicit: false,
        });
    }

    let listing = client.list_repos(org)?;
    let names: Vec<String> = listing.iter().map(|repo| repo.name.clone()).collect();
    debug!(count = names.len(), "resolved all repositories in org");

    Ok(ResolvedRepos {
        names,
        listing: Some(listing),
        ignored_explicit: !explicit.is_empty(),
    })
}
