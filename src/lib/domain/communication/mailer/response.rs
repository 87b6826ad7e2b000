//! Provider response

use serde_json::Value;

/// The provider's answer to a send request, returned to the caller unchanged
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliveryResponse {
    /// The HTTP status code
    pub status: u16,

    /// The raw response body
    pub body: String,
}

impl DeliveryResponse {
    /// Creates a new response
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True when the provider accepted the message
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// Parses the body as JSON
    pub fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.body)
    }

    /// The provider-assigned message id, when the body carries one
    pub fn id(&self) -> Option<String> {
        self.to_json()
            .ok()?
            .get("id")?
            .as_str()
            .map(String::from)
    }
}
