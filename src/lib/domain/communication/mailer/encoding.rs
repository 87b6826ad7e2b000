//! RFC 5322 / MIME serialization of a [`Message`]

use std::time::SystemTime;

use chrono::DateTime;
use lettre::message::{
    header::{ContentType, HeaderName, HeaderValue as RawHeaderValue},
    Attachment as AttachmentPart, Mailbox, Mailboxes, MessageBuilder, MultiPart, SinglePart,
};

use crate::domain::communication::errors::MessageError;

use super::{
    headers::{validate_header_name, HeaderValue},
    message::Message,
};

/// The body of a message, before it is attached to the headers
enum Content {
    Single(SinglePart),
    Multi(MultiPart),
}

pub(crate) fn encode(message: &Message) -> Result<String, MessageError> {
    let mut builder = lettre::Message::builder();

    for (name, value) in message.headers().iter() {
        validate_header_name(name)?;
        builder = with_header(builder, name, value)?;
    }

    let email = match content(message)? {
        Content::Single(part) => builder.singlepart(part)?,
        Content::Multi(part) => builder.multipart(part)?,
    };

    String::from_utf8(email.formatted()).map_err(|err| MessageError::UnknownError(err.into()))
}

/// Adds one header field; MIME framing headers are generated by `lettre` and skipped here
fn with_header(
    builder: MessageBuilder,
    name: &str,
    value: &HeaderValue,
) -> Result<MessageBuilder, MessageError> {
    let builder = match name.to_ascii_lowercase().as_str() {
        "mime-version" | "content-type" | "content-transfer-encoding" => builder,
        "from" | "to" | "cc" | "bcc" | "reply-to" => {
            let addresses = mailboxes(value)?;

            if addresses.is_empty() {
                builder
            } else {
                let text = addresses
                    .iter()
                    .map(address_text)
                    .collect::<Vec<_>>()
                    .join(", ");

                builder.raw_header(RawHeaderValue::new(header_name(name)?, text))
            }
        }
        "date" => builder.date(date(value)?),
        "subject" => builder.subject(single_line(value)),
        "message-id" => builder.message_id(Some(single_line(value))),
        _ => builder.raw_header(RawHeaderValue::new(header_name(name)?, single_line(value))),
    };

    Ok(builder)
}

fn header_name(name: &str) -> Result<HeaderName, MessageError> {
    HeaderName::new_from_ascii(name.to_string())
        .map_err(|_| MessageError::InvalidHeaderName(name.to_string()))
}

/// Parses an address field; blank entries are skipped
fn mailboxes(value: &HeaderValue) -> Result<Vec<Mailbox>, MessageError> {
    let entries = match value {
        HeaderValue::Address(mailbox) => return Ok(vec![mailbox.clone()]),
        HeaderValue::Text(text) => vec![text.as_str()],
        HeaderValue::List(items) => items.iter().map(String::as_str).collect(),
    };

    let mut mailboxes = Vec::new();

    for entry in entries.into_iter().filter(|entry| !entry.trim().is_empty()) {
        mailboxes.extend(entry.trim().parse::<Mailboxes>()?);
    }

    Ok(mailboxes)
}

/// Non-ASCII display names are left unquoted so they are written as encoded words
fn address_text(mailbox: &Mailbox) -> String {
    match &mailbox.name {
        Some(name) if !name.is_ascii() => {
            format!("{} <{}>", name.trim().replace('"', ""), mailbox.email)
        }
        _ => mailbox.to_string(),
    }
}

fn date(value: &HeaderValue) -> Result<SystemTime, MessageError> {
    DateTime::parse_from_rfc2822(value.to_string().trim())
        .map(SystemTime::from)
        .map_err(|_| MessageError::InvalidHeaderValue("Date".to_string()))
}

fn single_line(value: &HeaderValue) -> String {
    value.to_string().replace(['\r', '\n'], " ")
}

/// Text and/or HTML, wrapped with the attachments when there are any
fn content(message: &Message) -> Result<Content, MessageError> {
    let body = match (message.text(), message.html()) {
        (Some(text), Some(html)) => Content::Multi(
            MultiPart::alternative()
                .boundary(format!("{}_alt", message.boundary()))
                .singlepart(SinglePart::plain(text.to_string()))
                .singlepart(SinglePart::html(html.to_string())),
        ),
        (None, Some(html)) => Content::Single(SinglePart::html(html.to_string())),
        (Some(text), None) => Content::Single(SinglePart::plain(text.to_string())),
        (None, None) => Content::Single(SinglePart::plain(String::new())),
    };

    if message.attachments().is_empty() {
        return Ok(body);
    }

    let mixed = MultiPart::mixed().boundary(format!("{}_mixed", message.boundary()));
    let mut mixed = match body {
        Content::Single(part) => mixed.singlepart(part),
        Content::Multi(part) => mixed.multipart(part),
    };

    for attachment in message.attachments() {
        let content_type = ContentType::parse(&attachment.content_type)
            .map_err(|_| MessageError::InvalidContentType(attachment.content_type.clone()))?;

        mixed = mixed.singlepart(
            AttachmentPart::new(attachment.filename.clone())
                .body(attachment.content.clone(), content_type),
        );
    }

    Ok(Content::Multi(mixed))
}
