//! Access-token loading.
//!
//! The token lives in a small YAML file (`.ghtrack.yml` by default) with
//! an `access_token` key, and can be overridden from the command line.
//! Outcomes are kept distinct: a missing file is fine when an override
//! is present, but a malformed file is always fatal.

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Format, Yaml};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::CredentialsError;

/// File name looked up when no credentials path is given.
pub const DEFAULT_CREDENTIALS_FILE: &str = ".ghtrack.yml";

/// Where the access token came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsSource {
    /// Read from this credentials file.
    File(Utf8PathBuf),
    /// Supplied on the command line or through the environment.
    Override,
}

/// A loaded access token. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_token: String,
    source: CredentialsSource,
}

impl Credentials {
    /// Credentials built directly from a token, bypassing any file.
    pub fn from_token(token: impl Into<String>) -> Self {
        Self {
            access_token: token.into(),
            source: CredentialsSource::Override,
        }
    }

    /// The bearer token sent to the API.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Where the token came from.
    pub const fn source(&self) -> &CredentialsSource {
        &self.source
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
struct CredentialsFile {
    #[serde(default)]
    access_token: Option<String>,
}

/// Load credentials from `path`, letting `override_token` win over the file.
///
/// # Errors
///
/// - [`CredentialsError::NotFound`] when the file is absent and no override is given
/// - [`CredentialsError::Malformed`] when the file exists but is not valid YAML
/// - [`CredentialsError::MissingToken`] when the file has no token and no override is given
#[instrument(skip(override_token), fields(has_override = override_token.is_some()))]
pub fn load_credentials(
    path: &Utf8Path,
    override_token: Option<&str>,
) -> Result<Credentials, CredentialsError> {
    let override_token = override_token
        .map(str::trim)
        .filter(|token| !token.is_empty());

    if !path.is_file() {
        return match override_token {
            Some(token) => {
                debug!("credentials file absent, using override token");
                Ok(Credentials {
                    access_token: token.to_string(),
                    source: CredentialsSource::Override,
                })
            }
            None => Err(CredentialsError::NotFound {
                path: path.to_path_buf(),
            }),
        };
    }

    let file: CredentialsFile = Figment::from(Yaml::file_exact(path.as_str()))
        .extract()
        .map_err(|e| CredentialsError::Malformed {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    if let Some(token) = override_token {
        debug!("override token takes precedence over credentials file");
        return Ok(Credentials {
            access_token: token.to_string(),
            source: CredentialsSource::Override,
        });
    }

    match file.access_token.filter(|token| !token.trim().is_empty()) {
        Some(token) => {
            debug!("loaded access token from credentials file");
            Ok(Credentials {
                access_token: token.trim().to_string(),
                source: CredentialsSource::File(path.to_path_buf()),
            })
        }
        None => Err(CredentialsError::MissingToken {
            path: path.to_path_buf(),
        }),
    }
}
