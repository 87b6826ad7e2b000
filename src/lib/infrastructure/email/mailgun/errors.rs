//! Mailgun configuration errors

use thiserror::Error;
use tracing::debug;

/// Raised while constructing a Mailgun mailer; no mailer is returned.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A required setting is missing or empty
    #[error("Config requires `{key}` key")]
    MissingKey {
        /// The name of the missing setting
        key: &'static str,
    },

    /// The HTTP client could not be created
    #[error("could not create the HTTP client: {0}")]
    HttpClient(reqwest::Error),
}

impl From<reqwest::Error> for ConfigurationError {
    fn from(err: reqwest::Error) -> Self {
        debug!("reqwest::Error -> ConfigurationError");

        ConfigurationError::HttpClient(err)
    }
}
