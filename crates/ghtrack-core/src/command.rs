//! Command validation, dispatch and the per-user aggregation loop.
//!
//! A command runs in two steps. [`Plan::prepare`] validates the month and
//! org and computes the date range without touching the network.
//! [`Plan::execute`] resolves the repository set, lists the org once and
//! walks users × repositories, asking the client for one count per
//! requested pair. Progress is reported through [`CollectEvent`] callbacks.

use std::fmt;

use thiserror::Error;
use tracing::{debug, instrument};

use crate::client::{ClientError, ClientResult, ItemState, Repo, StatsClient};
use crate::error::ValidationError;
use crate::month::{DateRange, resolve_month};
use crate::options::Options;
use crate::repos::resolve_repos;
use crate::stats::StatsAccumulator;

// ──────────────────────────────────────────────
// Subcommands
// ──────────────────────────────────────────────

/// The closed set of subcommands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subcommand {
    /// Commits authored per user and repository.
    Commits,
    /// Pull requests reviewed per user and repository.
    Reviews,
    /// Open pull requests authored per user and repository.
    Prs,
    /// Open issues authored per user and repository.
    Issues,
    /// Accepted for compatibility; collects nothing.
    Stats,
}

impl Subcommand {
    /// Command-line spelling.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Commits => "commits",
            Self::Reviews => "reviews",
            Self::Prs => "prs",
            Self::Issues => "issues",
            Self::Stats => "stats",
        }
    }

    /// What this subcommand counts, or `None` for the no-op `stats`.
    pub const fn count_kind(self) -> Option<CountKind> {
        match self {
            Self::Commits => Some(CountKind::Commits),
            Self::Reviews => Some(CountKind::Reviews),
            Self::Prs => Some(CountKind::Prs),
            Self::Issues => Some(CountKind::Issues),
            Self::Stats => None,
        }
    }
}

impl fmt::Display for Subcommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The metric a handler counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountKind {
    /// Commits.
    Commits,
    /// Reviews.
    Reviews,
    /// Pull requests.
    Prs,
    /// Issues.
    Issues,
}

impl CountKind {
    /// Plural noun used in messages.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Commits => "commits",
            Self::Reviews => "reviews",
            Self::Prs => "pull requests",
            Self::Issues => "issues",
        }
    }
}

impl fmt::Display for CountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ──────────────────────────────────────────────
// Validation
// ──────────────────────────────────────────────

/// Check the required positional values and return the month number.
///
/// The month is checked first, so a command with both values invalid
/// reports the month.
///
/// # Errors
///
/// [`ValidationError::InvalidMonth`] or [`ValidationError::InvalidOrg`].
pub fn validate(month: &str, org: &str) -> Result<u32, ValidationError> {
    let number = resolve_month(month).ok_or_else(|| ValidationError::InvalidMonth(month.to_string()))?;
    if org.trim().is_empty() {
        return Err(ValidationError::InvalidOrg(org.to_string()));
    }
    Ok(number)
}

// ──────────────────────────────────────────────
// Events, outcome, errors
// ──────────────────────────────────────────────

/// Progress notifications emitted while collecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectEvent {
    /// `--all-repos` replaced a non-empty explicit repository list.
    ExplicitReposIgnored {
        /// The discarded names.
        repos: Vec<String>,
    },
    /// Collection is about to start.
    Started {
        /// What is being counted.
        kind: CountKind,
        /// Number of users.
        users: usize,
        /// Number of requested repositories.
        requested: usize,
        /// Number of repositories in the org listing.
        listed: usize,
    },
    /// Collection for one user is starting.
    UserStarted {
        /// The user.
        user: String,
        /// Repositories that will be visited.
        total: usize,
    },
    /// One repository of the org listing was visited.
    RepoVisited {
        /// The user.
        user: String,
        /// Repository name.
        repo: String,
        /// One-based position in the listing.
        index: usize,
        /// Length of the listing.
        total: usize,
        /// The count, when the repository was requested and not skipped.
        count: Option<u64>,
    },
    /// Collection for one user finished.
    UserFinished {
        /// The user.
        user: String,
        /// Sum of this user's counts.
        total: u64,
    },
}

/// Result of a successful command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Collected counts.
    Counts {
        /// What was counted.
        kind: CountKind,
        /// The filled accumulator.
        stats: StatsAccumulator,
    },
    /// The command collects nothing.
    NoOp,
}

/// Failures while collecting.
#[derive(Error, Debug)]
pub enum CollectError {
    /// Listing the org's repositories failed.
    #[error("failed to list repositories for {org}")]
    ListRepos {
        /// The org being listed.
        org: String,
        /// Underlying client failure.
        #[source]
        source: ClientError,
    },

    /// A count call failed; nothing further was collected.
    #[error("failed to count {kind} for {user} in {repo}")]
    Remote {
        /// What was being counted.
        kind: CountKind,
        /// User being processed.
        user: String,
        /// Repository being processed.
        repo: String,
        /// Underlying client failure.
        #[source]
        source: Box<ClientError>,
        /// Counts collected before the failure.
        partial: StatsAccumulator,
    },
}

// ──────────────────────────────────────────────
// Handlers
// ──────────────────────────────────────────────

/// One handler per counting subcommand, each owning its accumulator.
#[derive(Debug)]
enum Handler {
    Commits(StatsAccumulator),
    Reviews(StatsAccumulator),
    Prs(StatsAccumulator),
    Issues(StatsAccumulator),
}

impl Handler {
    fn new(kind: CountKind, stats: StatsAccumulator) -> Self {
        match kind {
            CountKind::Commits => Self::Commits(stats),
            CountKind::Reviews => Self::Reviews(stats),
            CountKind::Prs => Self::Prs(stats),
            CountKind::Issues => Self::Issues(stats),
        }
    }

    const fn kind(&self) -> CountKind {
        match self {
            Self::Commits(_) => CountKind::Commits,
            Self::Reviews(_) => CountKind::Reviews,
            Self::Prs(_) => CountKind::Prs,
            Self::Issues(_) => CountKind::Issues,
        }
    }

    // PR and issue counts only ever look at open items.
    fn count<C: StatsClient + ?Sized>(
        &self,
        client: &C,
        repo: &Repo,
        user: &str,
        range: &DateRange,
    ) -> ClientResult<u64> {
        match self {
            Self::Commits(_) => client.count_commits(repo, user, range),
            Self::Reviews(_) => client.count_reviews(repo, user, range),
            Self::Prs(_) => client.count_prs(repo, user, range, ItemState::Open),
            Self::Issues(_) => client.count_issues(repo, user, range, ItemState::Open),
        }
    }

    fn stats(&self) -> &StatsAccumulator {
        match self {
            Self::Commits(s) | Self::Reviews(s) | Self::Prs(s) | Self::Issues(s) => s,
        }
    }

    fn stats_mut(&mut self) -> &mut StatsAccumulator {
        match self {
            Self::Commits(s) | Self::Reviews(s) | Self::Prs(s) | Self::Issues(s) => s,
        }
    }

    fn into_stats(self) -> StatsAccumulator {
        match self {
            Self::Commits(s) | Self::Reviews(s) | Self::Prs(s) | Self::Issues(s) => s,
        }
    }
}

// ──────────────────────────────────────────────
// Plan
// ──────────────────────────────────────────────

/// A validated command, ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// Which subcommand runs.
    pub subcommand: Subcommand,
    /// Month number, 1-12.
    pub month: u32,
    /// Organization to query.
    pub org: String,
    /// Normalized options.
    pub options: Options,
    /// Inclusive date range of the month.
    pub range: DateRange,
}

impl Plan {
    /// Validate `month` and `org` and compute the date range for `year`.
    ///
    /// Performs no I/O.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the month or org is invalid.
    pub fn prepare(
        subcommand: Subcommand,
        month: &str,
        org: &str,
        options: Options,
        year: i32,
    ) -> Result<Self, ValidationError> {
        let number = validate(month, org)?;
        let range = DateRange::for_month(year, number)
            .ok_or_else(|| ValidationError::InvalidMonth(month.to_string()))?;
        Ok(Self {
            subcommand,
            month: number,
            org: org.trim().to_string(),
            options,
            range,
        })
    }

    /// Run the command against `client`.
    ///
    /// The org is listed at most once. Every listed repository whose name
    /// was requested and not skipped gets one count call per user; the
    /// rest are visited without a call. Requested repositories missing
    /// from the listing keep their zero.
    ///
    /// # Errors
    ///
    /// [`CollectError::ListRepos`] when the listing fails, and
    /// [`CollectError::Remote`] (carrying the partial counts) when a count
    /// call fails. No further calls are made after a failure.
    #[instrument(skip(self, client, on_event), fields(subcommand = %self.subcommand, org = %self.org))]
    pub fn execute<C: StatsClient + ?Sized>(
        self,
        client: &C,
        mut on_event: impl FnMut(CollectEvent),
    ) -> Result<Outcome, CollectError> {
        let Some(kind) = self.subcommand.count_kind() else {
            debug!("stats collects nothing");
            return Ok(Outcome::NoOp);
        };
        let Self {
            org,
            options,
            range,
            ..
        } = self;

        let resolved = resolve_repos(options.all_repos, &options.repos, &org, client).map_err(
            |source| CollectError::ListRepos {
                org: org.clone(),
                source,
            },
        )?;
        if resolved.ignored_explicit {
            on_event(CollectEvent::ExplicitReposIgnored {
                repos: options.repos.clone(),
            });
        }

        let mut handler = Handler::new(
            kind,
            StatsAccumulator::init(&options.users, &resolved.names, &options.skip_repos),
        );

        let listing = match resolved.listing {
            Some(listing) => listing,
            None if options.users.is_empty() => Vec::new(),
            None => client
                .list_repos(&org)
                .map_err(|source| CollectError::ListRepos {
                    org: org.clone(),
                    source,
                })?,
        };
        let total = listing.len();

        debug!(%kind, users = options.users.len(), listed = total, "collecting");
        on_event(CollectEvent::Started {
            kind,
            users: options.users.len(),
            requested: resolved.names.len(),
            listed: total,
        });

        for user in &options.users {
            on_event(CollectEvent::UserStarted {
                user: user.clone(),
                total,
            });
            for (index, repo) in listing.iter().enumerate() {
                let wanted = resolved.names.contains(&repo.name) && !options.is_skipped(&repo.name);
                let count = if wanted {
                    match handler.count(client, repo, user, &range) {
                        Ok(count) => {
                            debug!(%user, repo = %repo.name, count, "counted");
                            handler.stats_mut().record(user, &repo.name, count);
                            Some(count)
                        }
                        Err(source) => {
                            return Err(CollectError::Remote {
                                kind: handler.kind(),
                                user: user.clone(),
                                repo: repo.name.clone(),
                                source: Box::new(source),
                                partial: handler.into_stats(),
                            });
                        }
                    }
                } else {
                    None
                };
                on_event(CollectEvent::RepoVisited {
                    user: user.clone(),
                    repo: repo.name.clone(),
                    index: index + 1,
                    total,
                    count,
                });
            }
            let user_total = handler
                .stats()
                .repos_for(user)
                .map_or(0, |repos| repos.values().sum());
            on_event(CollectEvent::UserFinished {
                user: user.clone(),
                total: user_total,
            });
        }

        Ok(Outcome::Counts {
            kind,
            stats: handler.into_stats(),
        })
    }
}
