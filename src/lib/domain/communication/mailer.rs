//! Mailer module

mod encoding;
mod errors;
mod headers;
mod message;
mod response;

use async_trait::async_trait;

#[cfg(test)]
use mockall::mock;

pub use errors::MailerError;
pub use headers::{HeaderValue, Headers, RecipientField};
pub use message::{Attachment, Message, MessageBuilder};
pub use response::DeliveryResponse;

/// Delivers composed messages
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Delivers a message.
    ///
    /// # Arguments
    /// * `message` - The [`Message`] to send. On success the provider-assigned
    ///   id is written back to its `Message-ID`.
    ///
    /// # Returns
    /// The provider's [`DeliveryResponse`], whatever its status, or a
    /// [`MailerError`] when the message could not be encoded or sent.
    async fn deliver(&self, message: &mut Message) -> Result<DeliveryResponse, MailerError>;
}

#[cfg(test)]
mock! {
    pub Mailer {}

    #[async_trait]
    impl Mailer for Mailer {
        async fn deliver(&self, message: &mut Message) -> Result<DeliveryResponse, MailerError>;
    }
}
