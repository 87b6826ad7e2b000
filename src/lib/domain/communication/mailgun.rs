//! Mailgun request payloads
//!
//! Turns a composed [`Message`](crate::domain::communication::mailer::Message)
//! into the key/value payload accepted by Mailgun's `messages.mime` endpoint:
//!
//! - `message`: the encoded message, extension headers included
//! - `to`: every `To`, `Cc` and `Bcc` recipient, in that order
//! - `v:<name>`: each custom variable as JSON text
//! - `o:<name>`: each sending option, unchanged
//! - `recipient-variables`: batch substitutions as JSON text
//!
//! Blank values are dropped before the payload is returned.

mod payload;
mod transform;

pub use payload::RequestPayload;
pub use transform::{build_message_object, transform_for_mailgun};
