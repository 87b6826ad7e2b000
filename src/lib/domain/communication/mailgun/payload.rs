//! Request payload

use serde::Serialize;
use serde_json::{Map, Value};

/// The key/value payload handed to the Mailgun client for one send
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RequestPayload(Map<String, Value>);

impl RequestPayload {
    /// Creates an empty payload
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Stores `value` under `key`, replacing any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns true when `key` is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterates over the entries
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Iterates over the keys
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when the payload has no entries
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The encoded message
    pub fn message(&self) -> Option<&str> {
        self.get("message")?.as_str()
    }

    /// The recipient addresses
    pub fn recipients(&self) -> Vec<&str> {
        match self.get("to") {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(address)) => vec![address.as_str()],
            _ => Vec::new(),
        }
    }

    /// Drops blank entries.
    ///
    /// Null values are removed. Blank elements are removed from lists, then
    /// any value left as an empty string, list or object is removed. `false`
    /// and `0` are kept.
    pub fn reject_blank(&mut self) {
        self.0.retain(|_, value| {
            if value.is_null() {
                return false;
            }

            if let Value::Array(items) = value {
                items.retain(|item| !is_empty(item));
            }

            !is_empty(value)
        });
    }
}

impl From<Map<String, Value>> for RequestPayload {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<RequestPayload> for Value {
    fn from(payload: RequestPayload) -> Self {
        Value::Object(payload.0)
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
