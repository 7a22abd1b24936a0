//! Normalization of the list-valued command options.
//!
//! `--users`, `--repos` and `--skip-repos` arrive as nothing, a single
//! token, or a comma separated string. Handlers only accept [`Options`],
//! whose list fields are always explicit lists, so normalization happens
//! exactly once, in [`RawOptions::normalize`].

const SEPARATOR: char = ',';

/// A list option as it arrives from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListOption {
    /// Flag not given.
    #[default]
    Unset,
    /// One raw value, possibly comma separated.
    Single(String),
    /// Already a list; left untouched.
    List(Vec<String>),
}

impl ListOption {
    /// Turn the option into an explicit list of tokens.
    ///
    /// Single values are split on `,` and trimmed; empty tokens are
    /// dropped, so `""` and `" , "` both yield `[]`.
    pub fn normalize(self) -> Vec<String> {
        match self {
            Self::Unset => Vec::new(),
            Self::Single(value) => split_tokens(&value),
            Self::List(values) => values,
        }
    }
}

impl From<Option<String>> for ListOption {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Unset, Self::Single)
    }
}

impl From<Vec<String>> for ListOption {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

fn split_tokens(value: &str) -> Vec<String> {
    value
        .split(SEPARATOR)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Options before normalization.
#[derive(Debug, Clone, Default)]
pub struct RawOptions {
    /// Accounts to report on.
    pub users: ListOption,
    /// Explicit repository names.
    pub repos: ListOption,
    /// Repository names to exclude.
    pub skip_repos: ListOption,
    /// Replace `repos` with every repository in the org.
    pub all_repos: bool,
}

impl RawOptions {
    /// Normalize every list field.
    pub fn normalize(self) -> Options {
        Options {
            users: self.users.normalize(),
            repos: self.repos.normalize(),
            skip_repos: self.skip_repos.normalize(),
            all_repos: self.all_repos,
        }
    }
}

/// Normalized options consulted by the handlers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Accounts to report on, in input order.
    pub users: Vec<String>,
    /// Explicit repository names.
    pub repos: Vec<String>,
    /// Repository names to exclude even when matched.
    pub skip_repos: Vec<String>,
    /// Replace `repos` with every repository in the org.
    pub all_repos: bool,
}

impl Options {
    /// Whether `repo` is on the skip list.
    pub fn is_skipped(&self, repo: &str) -> bool {
        self.skip_repos.iter().any(|skip| skip == repo)
    }
}
