//! Message to payload transformation

use serde_json::Value;
use tracing::trace;

use crate::domain::communication::{
    errors::MessageError,
    mailer::{Message, RecipientField},
};

use super::RequestPayload;

/// Recipient headers, in the order their addresses are collected
const RECIPIENT_HEADERS: [&str; 3] = ["To", "Cc", "Bcc"];

/// Builds the Mailgun payload for `message`.
///
/// [`Message::mailgun_headers`] are first merged into the message's own
/// headers, overwriting fields of the same name, so they travel inside the
/// encoded message. Variables become `v:<name>` entries holding JSON text,
/// options become `o:<name>` entries holding the value as given, and blank
/// entries are dropped last.
///
/// # Errors
/// Returns a [`MessageError`] when the message cannot be encoded.
pub fn transform_for_mailgun(message: &mut Message) -> Result<RequestPayload, MessageError> {
    message.apply_mailgun_headers();

    let mut payload = build_message_object(message)?;

    for (name, value) in &message.mailgun_variables {
        payload.insert(format!("v:{name}"), value.to_string());
    }

    for (name, value) in &message.mailgun_options {
        payload.insert(format!("o:{name}"), value.clone());
    }

    if !message.mailgun_recipient_variables.is_empty() {
        payload.insert(
            "recipient-variables",
            Value::Object(message.mailgun_recipient_variables.clone()).to_string(),
        );
    }

    payload.reject_blank();

    trace!(keys = ?payload.keys().collect::<Vec<_>>(), "built mailgun payload");

    Ok(payload)
}

/// Builds the base payload: the encoded message and its flattened recipients.
///
/// Recipient headers the message does not set contribute nothing.
pub fn build_message_object(message: &Message) -> Result<RequestPayload, MessageError> {
    let mut to = Vec::new();

    for name in RECIPIENT_HEADERS {
        match message.headers().recipient_field(name) {
            RecipientField::Absent => {}
            RecipientField::Single(address) => to.push(Value::String(address)),
            RecipientField::Many(addresses) => {
                to.extend(addresses.into_iter().map(Value::String));
            }
        }
    }

    let mut payload = RequestPayload::new();
    payload.insert("message", message.encoded()?);
    payload.insert("to", to);

    Ok(payload)
}
