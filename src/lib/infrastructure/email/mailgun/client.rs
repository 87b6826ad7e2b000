//! Mailgun HTTP client

use std::{
    fmt,
    sync::{Mutex, PoisonError},
};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

#[cfg(test)]
use mockall::mock;

use crate::domain::communication::{
    mailer::{DeliveryResponse, MailerError},
    mailgun::RequestPayload,
};

/// Client for Mailgun's sending API
#[async_trait]
pub trait MailgunClient: Send + Sync + 'static {
    /// Sends a payload for `domain`.
    ///
    /// Any HTTP status is returned as a [`DeliveryResponse`]; only failures to
    /// build or perform the request are errors.
    async fn send_message(
        &self,
        domain: &str,
        payload: &RequestPayload,
    ) -> Result<DeliveryResponse, MailerError>;

    /// Stops all network traffic; sends are recorded and answered locally
    fn enable_test_mode(&mut self);

    /// True when test mode is enabled
    fn test_mode(&self) -> bool;
}

#[cfg(test)]
mock! {
    pub MailgunClient {}

    #[async_trait]
    impl MailgunClient for MailgunClient {
        async fn send_message(
            &self,
            domain: &str,
            payload: &RequestPayload,
        ) -> Result<DeliveryResponse, MailerError>;
        fn enable_test_mode(&mut self);
        fn test_mode(&self) -> bool;
    }
}

/// A single multipart form field
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum FormField {
    /// A plain text field
    Text(String),

    /// The encoded message, sent as a file part
    Message(String),
}

/// [`MailgunClient`] backed by `reqwest`
pub struct HttpMailgunClient {
    http: reqwest::Client,
    api_key: String,
    api_host: String,
    api_version: String,
    use_ssl: bool,
    test_mode: bool,
    deliveries: Mutex<Vec<RequestPayload>>,
}

impl HttpMailgunClient {
    /// Creates a client for `api_host`/`api_version`, authenticating with `api_key`
    pub fn new(
        api_key: &str,
        api_host: &str,
        api_version: &str,
        use_ssl: bool,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_key: api_key.to_string(),
            api_host: api_host.trim_end_matches('/').to_string(),
            api_version: api_version.trim_matches('/').to_string(),
            use_ssl,
            test_mode: false,
            deliveries: Mutex::new(Vec::new()),
        })
    }

    /// The API root, e.g. `https://api.mailgun.net/v3`
    pub fn base_url(&self) -> String {
        let scheme = if self.use_ssl { "https" } else { "http" };

        format!("{scheme}://{}/{}", self.api_host, self.api_version)
    }

    /// The MIME sending endpoint for `domain`
    pub fn messages_url(&self, domain: &str) -> String {
        format!("{}/{domain}/messages.mime", self.base_url())
    }

    /// Payloads accepted while in test mode
    pub fn deliveries(&self) -> Vec<RequestPayload> {
        self.deliveries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, payload: &RequestPayload) {
        self.deliveries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(payload.clone());
    }

    #[mutants::skip]
    async fn post(&self, url: String, form: Form) -> Result<DeliveryResponse, MailerError> {
        let response = self
            .http
            .post(url)
            .basic_auth("api", Some(&self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|err| MailerError::SendError(err.into()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| MailerError::SendError(err.into()))?;

        Ok(DeliveryResponse::new(status, body))
    }
}

impl fmt::Debug for HttpMailgunClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpMailgunClient")
            .field("api_key", &"[redacted]")
            .field("base_url", &self.base_url())
            .field("test_mode", &self.test_mode)
            .finish()
    }
}

#[async_trait]
impl MailgunClient for HttpMailgunClient {
    async fn send_message(
        &self,
        domain: &str,
        payload: &RequestPayload,
    ) -> Result<DeliveryResponse, MailerError> {
        validate(domain, payload)?;

        if self.test_mode {
            self.record(payload);

            let id = format!("test-mode-mail-{}@localhost", Uuid::new_v4());
            debug!(%id, "test mode, message not sent");

            return Ok(DeliveryResponse::new(
                200,
                json!({"id": id, "message": "Queued. Thank you."}).to_string(),
            ));
        }

        let url = self.messages_url(domain);
        debug!(%url, recipients = payload.recipients().len(), "sending message");

        self.post(url, form(payload)?).await
    }

    fn enable_test_mode(&mut self) {
        self.test_mode = true;
    }

    fn test_mode(&self) -> bool {
        self.test_mode
    }
}

/// Rejects requests Mailgun would refuse before anything is sent
fn validate(domain: &str, payload: &RequestPayload) -> Result<(), MailerError> {
    if domain.trim().is_empty() {
        return Err(MailerError::InvalidPayload("missing working domain".to_string()));
    }

    if payload.recipients().is_empty() {
        return Err(MailerError::InvalidPayload(
            "missing `to` recipient, message should contain at least 1 recipient".to_string(),
        ));
    }

    Ok(())
}

/// Flattens the payload into form fields; lists become repeated fields
pub(crate) fn form_fields(payload: &RequestPayload) -> Vec<(String, FormField)> {
    let mut fields = Vec::new();

    for (name, value) in payload.iter() {
        match value {
            Value::String(message) if name == "message" => {
                fields.push((name.clone(), FormField::Message(message.clone())));
            }
            Value::Array(items) => {
                for item in items {
                    if let Some(text) = field_text(item) {
                        fields.push((name.clone(), FormField::Text(text)));
                    }
                }
            }
            _ => {
                if let Some(text) = field_text(value) {
                    fields.push((name.clone(), FormField::Text(text)));
                }
            }
        }
    }

    fields
}

fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn form(payload: &RequestPayload) -> Result<Form, MailerError> {
    let mut form = Form::new();

    for (name, field) in form_fields(payload) {
        form = match field {
            FormField::Text(text) => form.text(name, text),
            FormField::Message(message) => form.part(
                name,
                Part::bytes(message.into_bytes())
                    .file_name("message.mime")
                    .mime_str("message/rfc822")
                    .map_err(|err| MailerError::SendError(err.into()))?,
            ),
        };
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    fn payload(value: Value) -> RequestPayload {
        match value {
            Value::Object(map) => map.into(),
            _ => panic!("payload fixtures must be objects"),
        }
    }

    #[test]
    fn test_messages_url() -> TestResult {
        let client = HttpMailgunClient::new("key", "api.mailgun.net", "v3", true)?;

        assert_eq!(client.base_url(), "https://api.mailgun.net/v3");
        assert_eq!(
            client.messages_url("example.org"),
            "https://api.mailgun.net/v3/example.org/messages.mime"
        );

        Ok(())
    }

    #[test]
    fn test_messages_url_without_ssl() -> TestResult {
        let client = HttpMailgunClient::new("key", "localhost:8025/", "/v3/", false)?;

        assert_eq!(
            client.messages_url("example.org"),
            "http://localhost:8025/v3/example.org/messages.mime"
        );

        Ok(())
    }

    #[test]
    fn test_debug_redacts_api_key() -> TestResult {
        let client = HttpMailgunClient::new("secret-key", "api.mailgun.net", "v3", true)?;

        let debug = format!("{client:?}");

        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("[redacted]"));

        Ok(())
    }

    #[test]
    fn test_form_fields() {
        let payload = payload(json!({
            "message": "Subject: hi\r\n\r\nhello",
            "o:deliverytime-optimize-period": 24,
            "o:tag": ["welcome", "onboarding"],
            "o:testmode": true,
            "to": ["a@example.org", "b@example.org"],
            "v:user": "{\"id\":\"1\"}",
        }));

        let fields = form_fields(&payload);

        assert_eq!(
            fields,
            vec![
                (
                    "message".to_string(),
                    FormField::Message("Subject: hi\r\n\r\nhello".to_string())
                ),
                (
                    "o:deliverytime-optimize-period".to_string(),
                    FormField::Text("24".to_string())
                ),
                ("o:tag".to_string(), FormField::Text("welcome".to_string())),
                ("o:tag".to_string(), FormField::Text("onboarding".to_string())),
                ("o:testmode".to_string(), FormField::Text("true".to_string())),
                ("to".to_string(), FormField::Text("a@example.org".to_string())),
                ("to".to_string(), FormField::Text("b@example.org".to_string())),
                (
                    "v:user".to_string(),
                    FormField::Text("{\"id\":\"1\"}".to_string())
                ),
            ]
        );
    }

    #[test]
    fn test_object_options_are_sent_as_json() {
        let payload = payload(json!({"o:extra": {"a": 1}}));

        assert_eq!(
            form_fields(&payload),
            vec![("o:extra".to_string(), FormField::Text("{\"a\":1}".to_string()))]
        );
    }

    #[tokio::test]
    async fn test_test_mode_records_without_sending() -> TestResult {
        let mut client = HttpMailgunClient::new("key", "unreachable.invalid", "v3", true)?;
        client.enable_test_mode();

        let payload = payload(json!({"message": "encoded", "to": ["a@example.org"]}));
        let response = client.send_message("example.org", &payload).await?;

        assert!(client.test_mode());
        assert_eq!(response.status, 200);
        assert_eq!(response.to_json()?["message"], json!("Queued. Thank you."));

        let id = response.id().ok_or("id missing")?;
        assert!(id.starts_with("test-mode-mail-"));
        assert!(id.ends_with("@localhost"));

        assert_eq!(client.deliveries(), vec![payload]);

        Ok(())
    }

    #[tokio::test]
    async fn test_rejects_payload_without_recipients() -> TestResult {
        let mut client = HttpMailgunClient::new("key", "api.mailgun.net", "v3", true)?;
        client.enable_test_mode();

        let result = client
            .send_message("example.org", &payload(json!({"message": "encoded"})))
            .await;

        assert!(matches!(result, Err(MailerError::InvalidPayload(_))));
        assert!(client.deliveries().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_rejects_missing_domain() -> TestResult {
        let mut client = HttpMailgunClient::new("key", "api.mailgun.net", "v3", true)?;
        client.enable_test_mode();

        let result = client
            .send_message(" ", &payload(json!({"to": ["a@example.org"]})))
            .await;

        assert!(matches!(result, Err(MailerError::InvalidPayload(_))));

        Ok(())
    }

    #[test]
    fn test_form_builds() -> TestResult {
        let payload = payload(json!({"message": "encoded", "to": ["a@example.org"]}));

        form(&payload)?;

        Ok(())
    }
}
