//! Mailer errors

use thiserror::Error;
use tracing::debug;

use crate::domain::communication::errors::MessageError;

/// Mailer errors
#[derive(Debug, Error)]
pub enum MailerError {
    /// The message could not be turned into a request payload
    #[error("could not encode the message: {0}")]
    Message(#[from] MessageError),

    /// The payload was rejected before anything was sent
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The request could not be delivered to the provider
    #[error("An error occurred while sending the email: {0}")]
    SendError(anyhow::Error),

    /// Unknown error
    #[error(transparent)]
    UnknownError(anyhow::Error),
}

impl From<anyhow::Error> for MailerError {
    fn from(err: anyhow::Error) -> Self {
        MailerError::UnknownError(err)
    }
}

impl From<serde_json::Error> for MailerError {
    fn from(err: serde_json::Error) -> Self {
        debug!("serde_json::Error -> MailerError");

        MailerError::UnknownError(err.into())
    }
}
