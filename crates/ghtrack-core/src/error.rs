//! Error types for ghtrack-core

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration")]
    Deserialize(#[from] Box<figment::Error>),
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading the access token.
#[derive(Error, Debug)]
pub enum CredentialsError {
    /// No credentials file exists and no override token was supplied.
    #[error("credentials file {path} not found (pass --access-token or --credentials)")]
    NotFound {
        /// Path that was looked up.
        path: Utf8PathBuf,
    },

    /// The credentials file exists but could not be parsed.
    #[error("credentials file {path} is malformed")]
    Malformed {
        /// Path of the offending file.
        path: Utf8PathBuf,
        /// Underlying parse failure.
        #[source]
        source: Box<figment::Error>,
    },

    /// The credentials file parsed but holds no usable token.
    #[error("credentials file {path} has no access_token")]
    MissingToken {
        /// Path of the file without a token.
        path: Utf8PathBuf,
    },
}

/// Errors raised while validating the required positional arguments.
///
/// These are always detected before any remote call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The month token matched none of the accepted spellings.
    #[error("Invalid month '{0}'")]
    InvalidMonth(String),

    /// The organization was empty.
    #[error("Invalid org value '{0}'")]
    InvalidOrg(String),
}
