//! Core library for ghtrack.
//!
//! Collects monthly per-user activity counts (commits, reviews, pull
//! requests, issues) for the repositories of a GitHub organization.
//!
//! # Modules
//!
//! - [`client`] - The remote client trait and its error type
//! - [`command`] - Validation, dispatch and the aggregation loop
//! - [`config`] - Configuration loading and management
//! - [`credentials`] - Access-token loading
//! - [`error`] - Error types and result aliases
//! - [`github`] - GitHub REST implementation of the client
//! - [`month`] - Month names and date ranges
//! - [`options`] - List-option normalization
//! - [`repos`] - Repository resolution
//! - [`report`] - JSON report rendering
//! - [`stats`] - The per-user, per-repository accumulator
//!
//! # Quick Start
//!
//! ```no_run
//! use ghtrack_core::{Credentials, GithubClient, Options, Plan, Subcommand};
//!
//! let options = Options {
//!     users: vec!["alice".into()],
//!     all_repos: true,
//!     ..Options::default()
//! };
//! let plan = Plan::prepare(Subcommand::Commits, "March", "acme", options, 2024)
//!     .expect("valid month and org");
//! let client = GithubClient::new(&Credentials::from_token("ghp_..."), Default::default());
//! let outcome = plan.execute(&client, |_| {}).expect("collection failed");
//! println!("{outcome:?}");
//! ```
#![deny(unsafe_code)]

pub mod client;

pub mod command;

pub mod config;

pub mod credentials;

pub mod error;

pub mod github;

pub mod month;

pub mod options;

pub mod repos;

pub mod report;

pub mod stats;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{ClientError, ItemState, Repo, StatsClient};
pub use command::{CollectError, CollectEvent, CountKind, Outcome, Plan, Subcommand, validate};
pub use config::{Config, ConfigLoader, LogLevel};
pub use credentials::{Credentials, CredentialsSource, load_credentials};
pub use error::{ConfigError, ConfigResult, CredentialsError, ValidationError};
pub use github::{GithubClient, GithubSettings};
pub use month::DateRange;
pub use options::{ListOption, Options, RawOptions};
pub use stats::StatsAccumulator;
