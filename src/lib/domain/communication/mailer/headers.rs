//! Message headers

use std::fmt;

use lazy_static::lazy_static;
use lettre::message::Mailbox;
use regex::Regex;

use crate::domain::communication::errors::MessageError;

lazy_static! {
    static ref HEADER_NAME_REGEX: Regex = Regex::new(r"^[!-9;-~]+$").unwrap();
}

/// The value held by a header field
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeaderValue {
    /// A single unstructured value
    Text(String),

    /// Several values for the same field, e.g. a list of addresses
    List(Vec<String>),

    /// A single structured address field
    Address(Mailbox),
}

impl HeaderValue {
    /// Parses `raw` into a structured address field.
    pub fn address(raw: &str) -> Result<Self, MessageError> {
        Ok(Self::Address(raw.trim().parse::<Mailbox>()?))
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{text}"),
            Self::List(values) => write!(f, "{}", values.join(", ")),
            Self::Address(mailbox) => write!(f, "{mailbox}"),
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for HeaderValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

impl From<Vec<&str>> for HeaderValue {
    fn from(values: Vec<&str>) -> Self {
        Self::List(values.into_iter().map(String::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for HeaderValue {
    fn from(values: [&str; N]) -> Self {
        Self::List(values.into_iter().map(String::from).collect())
    }
}

impl From<Mailbox> for HeaderValue {
    fn from(mailbox: Mailbox) -> Self {
        Self::Address(mailbox)
    }
}

/// A recipient header as seen by the payload transformer
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecipientField {
    /// The header is not set
    Absent,

    /// A single value, appended once
    Single(String),

    /// Several values, appended in order
    Many(Vec<String>),
}

impl From<Option<&HeaderValue>> for RecipientField {
    fn from(value: Option<&HeaderValue>) -> Self {
        match value {
            None => Self::Absent,
            Some(HeaderValue::Text(text)) => Self::Single(text.clone()),
            Some(HeaderValue::Address(mailbox)) => Self::Single(mailbox.to_string()),
            Some(HeaderValue::List(values)) => Self::Many(values.clone()),
        }
    }
}

/// Ordered header fields with case-insensitive names.
///
/// The first spelling of a name is kept when its value is replaced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, HeaderValue)>,
}

impl Headers {
    /// Creates an empty header set
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of `name`, if set
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// Returns true when `name` is set
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Sets `name`, replacing any existing value in place
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<HeaderValue>) {
        let name = name.into();
        let value = value.into();

        match self
            .entries
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(&name))
        {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Removes `name` and returns its value
    pub fn remove(&mut self, name: &str) -> Option<HeaderValue> {
        let position = self
            .entries
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))?;

        Some(self.entries.remove(position).1)
    }

    /// Sets every header in `headers`, overwriting fields that are already present
    pub fn merge<I, K, V>(&mut self, headers: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<HeaderValue>,
    {
        for (name, value) in headers {
            self.set(name, value);
        }
    }

    /// Reads `name` as a recipient field
    pub fn recipient_field(&self, name: &str) -> RecipientField {
        self.get(name).into()
    }

    /// Iterates over the headers in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Number of header fields
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no header is set
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Headers {
    type Item = (String, HeaderValue);
    type IntoIter = std::vec::IntoIter<(String, HeaderValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Checks that `name` can be used as a header field name.
pub(crate) fn validate_header_name(name: &str) -> Result<(), MessageError> {
    if HEADER_NAME_REGEX.is_match(name) {
        Ok(())
    } else {
        Err(MessageError::InvalidHeaderName(name.to_string()))
    }
}
