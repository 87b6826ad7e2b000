//! Mailgun mailer implementation

mod client;
mod errors;

use async_trait::async_trait;
use clap::{ArgAction, Parser};
use tracing::{debug, info, info_span, warn, Instrument, Span};

use crate::domain::communication::{
    mailer::{DeliveryResponse, Mailer, MailerError, Message},
    mailgun::transform_for_mailgun,
};

pub use client::{HttpMailgunClient, MailgunClient};
pub use errors::ConfigurationError;

#[cfg(test)]
pub use client::MockMailgunClient;

/// The default API host
pub const DEFAULT_API_HOST: &str = "api.mailgun.net";

/// The default API version
pub const DEFAULT_API_VERSION: &str = "v3";

/// Mailgun configuration
#[derive(Clone, Debug, PartialEq, Eq, Parser)]
pub struct MailgunConfig {
    /// The Mailgun API key
    #[arg(long, env = "MAILGUN_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// The sending domain
    #[arg(long, env = "MAILGUN_DOMAIN")]
    pub domain: Option<String>,

    /// The API host
    #[arg(long, env = "MAILGUN_API_HOST", default_value = DEFAULT_API_HOST)]
    pub api_host: String,

    /// The API version
    #[arg(long, env = "MAILGUN_API_VERSION", default_value = DEFAULT_API_VERSION)]
    pub api_version: String,

    /// Use HTTPS
    #[arg(long, env = "MAILGUN_API_SSL", default_value_t = true, action = ArgAction::Set)]
    pub api_ssl: bool,

    /// Accept messages without sending them
    #[arg(long, env = "MAILGUN_FAKE_MESSAGE_SEND", default_value_t = false, action = ArgAction::Set)]
    pub fake_message_send: bool,
}

impl MailgunConfig {
    /// Creates a configuration with the default host, version and HTTPS
    pub fn new(api_key: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            domain: Some(domain.into()),
            ..Self::default()
        }
    }

    /// Returns the API key and domain, which are both required
    pub fn credentials(&self) -> Result<(&str, &str), ConfigurationError> {
        Ok((
            required(&self.api_key, "api_key")?,
            required(&self.domain, "domain")?,
        ))
    }
}

impl Default for MailgunConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            domain: None,
            api_host: DEFAULT_API_HOST.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            api_ssl: true,
            fake_message_send: false,
        }
    }
}

fn required<'a>(
    value: &'a Option<String>,
    key: &'static str,
) -> Result<&'a str, ConfigurationError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(ConfigurationError::MissingKey { key })
}

/// Mailgun mailer
#[derive(Debug)]
pub struct MailgunMailer<C = HttpMailgunClient>
where
    C: MailgunClient,
{
    config: MailgunConfig,
    domain: String,
    client: C,
    span: Span,
}

impl MailgunMailer<HttpMailgunClient> {
    /// Creates a mailer that talks to the Mailgun HTTP API.
    ///
    /// # Errors
    /// Returns a [`ConfigurationError`] when `api_key` or `domain` is missing.
    pub fn new(config: MailgunConfig) -> Result<Self, ConfigurationError> {
        let (api_key, _) = config.credentials()?;

        let client = HttpMailgunClient::new(
            api_key,
            &config.api_host,
            &config.api_version,
            config.api_ssl,
        )?;

        Self::with_client(config, client)
    }
}

impl<C> MailgunMailer<C>
where
    C: MailgunClient,
{
    /// Creates a mailer that sends through `client`.
    ///
    /// # Errors
    /// Returns a [`ConfigurationError`] when `api_key` or `domain` is missing.
    pub fn with_client(config: MailgunConfig, mut client: C) -> Result<Self, ConfigurationError> {
        let (_, domain) = config.credentials()?;
        let domain = domain.to_string();

        let span = info_span!("mailgun", %domain);

        if config.fake_message_send {
            span.in_scope(|| info!("NOTE: fake message sending has been enabled for mailgun"));
            client.enable_test_mode();
        }

        Ok(Self {
            config,
            domain,
            client,
            span,
        })
    }

    /// The Mailgun client
    pub fn client(&self) -> &C {
        &self.client
    }

    /// The sending domain
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The configuration the mailer was created with
    pub fn config(&self) -> &MailgunConfig {
        &self.config
    }
}

#[async_trait]
impl<C> Mailer for MailgunMailer<C>
where
    C: MailgunClient,
{
    async fn deliver(&self, message: &mut Message) -> Result<DeliveryResponse, MailerError> {
        async {
            let payload = transform_for_mailgun(message)?;

            let response = self.client.send_message(&self.domain, &payload).await?;

            if !response.is_success() {
                warn!(status = response.status, "message was not accepted");
            } else if let Some(id) = response.id() {
                debug!(%id, "message accepted");
                message.set_message_id(&id);
            } else {
                warn!("accepted response carried no message id");
            }

            Ok(response)
        }
        .instrument(self.span.clone())
        .await
    }
}
