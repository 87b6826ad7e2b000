//! Email message

use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::communication::errors::MessageError;

use super::{
    encoding,
    headers::{HeaderValue, Headers},
};

/// A file attached to a message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    /// The file name presented to the recipient
    pub filename: String,

    /// The MIME type of the content, e.g. `text/plain`
    pub content_type: String,

    /// The raw content
    pub content: Vec<u8>,
}

impl Attachment {
    /// Creates a new attachment
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            content: content.into(),
        }
    }
}

/// A composed email message.
///
/// Besides the standard header set and body, a message carries the Mailgun
/// extension data that is relayed to the API alongside the encoded message.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Message {
    headers: Headers,
    text: Option<String>,
    html: Option<String>,
    attachments: Vec<Attachment>,
    boundary: String,

    /// Headers that overwrite the message's own headers when sent through Mailgun
    pub mailgun_headers: Headers,

    /// Custom variables, sent as `v:<name>`
    pub mailgun_variables: Map<String, Value>,

    /// Sending options, sent as `o:<name>`
    pub mailgun_options: Map<String, Value>,

    /// Per-recipient substitutions for batch sending
    pub mailgun_recipient_variables: Map<String, Value>,
}

impl Message {
    /// Starts composing a new message
    pub fn builder() -> MessageBuilder {
        MessageBuilder::default()
    }

    /// The message's header fields
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Mutable access to the message's header fields
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Returns the value of header `name`, if set
    pub fn header(&self, name: &str) -> Option<&HeaderValue> {
        self.headers.get(name)
    }

    /// The plain text body
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// The HTML body
    pub fn html(&self) -> Option<&str> {
        self.html.as_deref()
    }

    /// The attached files
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub(crate) fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Copies [`Message::mailgun_headers`] into the header set, overwriting
    /// fields of the same name.
    pub fn apply_mailgun_headers(&mut self) {
        self.headers.merge(self.mailgun_headers.clone());
    }

    /// Serializes the message to RFC 5322 text
    pub fn encoded(&self) -> Result<String, MessageError> {
        encoding::encode(self)
    }

    /// The `Message-ID` without angle brackets, once one has been assigned
    pub fn message_id(&self) -> Option<&str> {
        match self.headers.get("Message-ID")? {
            HeaderValue::Text(id) => Some(id.trim().trim_start_matches('<').trim_end_matches('>')),
            _ => None,
        }
    }

    /// Assigns the `Message-ID`
    pub fn set_message_id(&mut self, id: &str) {
        let id = id.trim();

        let id = if id.starts_with('<') && id.ends_with('>') {
            id.to_string()
        } else {
            format!("<{id}>")
        };

        self.headers.set("Message-ID", id);
    }
}

/// Builder for [`Message`]
#[derive(Debug, Default)]
pub struct MessageBuilder {
    headers: Headers,
    text: Option<String>,
    html: Option<String>,
    attachments: Vec<Attachment>,
    mailgun_headers: Headers,
    mailgun_variables: Map<String, Value>,
    mailgun_options: Map<String, Value>,
    mailgun_recipient_variables: Map<String, Value>,
}

impl MessageBuilder {
    /// Sets the `From` header
    pub fn from(self, from: impl Into<HeaderValue>) -> Self {
        self.header("From", from)
    }

    /// Sets the `To` header
    pub fn to(self, to: impl Into<HeaderValue>) -> Self {
        self.header("To", to)
    }

    /// Sets the `Cc` header
    pub fn cc(self, cc: impl Into<HeaderValue>) -> Self {
        self.header("Cc", cc)
    }

    /// Sets the `Bcc` header
    pub fn bcc(self, bcc: impl Into<HeaderValue>) -> Self {
        self.header("Bcc", bcc)
    }

    /// Sets the `Reply-To` header
    pub fn reply_to(self, reply_to: impl Into<HeaderValue>) -> Self {
        self.header("Reply-To", reply_to)
    }

    /// Sets the `Subject` header
    pub fn subject(self, subject: impl Into<String>) -> Self {
        self.header("Subject", subject.into())
    }

    /// Sets an arbitrary header, replacing any previous value of the same name
    pub fn header(mut self, name: impl Into<String>, value: impl Into<HeaderValue>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Sets every header in `headers`
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<HeaderValue>,
    {
        self.headers.merge(headers);
        self
    }

    /// Sets the plain text body
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.text = Some(body.into());
        self
    }

    /// Sets the HTML body
    pub fn html(mut self, body: impl Into<String>) -> Self {
        self.html = Some(body.into());
        self
    }

    /// Attaches a file
    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Adds a header that overwrites the message's own header when sent through Mailgun
    pub fn mailgun_header(mut self, name: impl Into<String>, value: impl Into<HeaderValue>) -> Self {
        self.mailgun_headers.set(name, value);
        self
    }

    /// Adds a custom variable
    pub fn mailgun_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.mailgun_variables.insert(name.into(), value.into());
        self
    }

    /// Adds a sending option
    pub fn mailgun_option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.mailgun_options.insert(name.into(), value.into());
        self
    }

    /// Adds substitutions for one recipient of a batch send
    pub fn mailgun_recipient_variables(
        mut self,
        recipient: impl Into<String>,
        variables: impl Into<Value>,
    ) -> Self {
        self.mailgun_recipient_variables
            .insert(recipient.into(), variables.into());
        self
    }

    /// Finishes the message, stamping the `Date` header when none was given
    pub fn build(self) -> Message {
        let headers = if self.headers.contains("Date") {
            self.headers
        } else {
            let mut headers = Headers::new();
            headers.set("Date", Utc::now().to_rfc2822());
            headers.merge(self.headers);
            headers
        };

        Message {
            headers,
            text: self.text,
            html: self.html,
            attachments: self.attachments,
            boundary: Uuid::now_v7().simple().to_string(),
            mailgun_headers: self.mailgun_headers,
            mailgun_variables: self.mailgun_variables,
            mailgun_options: self.mailgun_options,
            mailgun_recipient_variables: self.mailgun_recipient_variables,
        }
    }
}
