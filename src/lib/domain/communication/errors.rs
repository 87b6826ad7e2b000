//! Error types for composing and encoding messages

use lettre::address::AddressError;
use thiserror::Error;
use tracing::debug;

/// Message errors
#[derive(Debug, Error)]
pub enum MessageError {
    /// A header name contains characters that cannot appear in a header field name
    #[error("invalid header name: {0:?}")]
    InvalidHeaderName(String),

    /// A header value cannot be represented, e.g. an unparseable `Date`
    #[error("invalid value for header {0:?}")]
    InvalidHeaderValue(String),

    /// An attachment's MIME type cannot be parsed
    #[error("invalid content type: {0:?}")]
    InvalidContentType(String),

    /// Invalid email address
    #[error("Invalid email address")]
    InvalidEmail,

    /// The message lacks a sender or recipients, or has too many senders
    #[error("message cannot be encoded: {0}")]
    EncodingError(lettre::error::Error),

    /// Unknown error
    #[error(transparent)]
    UnknownError(anyhow::Error),
}

impl From<anyhow::Error> for MessageError {
    fn from(err: anyhow::Error) -> Self {
        MessageError::UnknownError(err)
    }
}

impl From<AddressError> for MessageError {
    fn from(err: AddressError) -> Self {
        debug!("AddressError -> MessageError: {:?}", err);

        MessageError::InvalidEmail
    }
}

impl From<lettre::error::Error> for MessageError {
    fn from(err: lettre::error::Error) -> Self {
        debug!("lettre::error::Error -> MessageError: {:?}", err);

        MessageError::EncodingError(err)
    }
}
