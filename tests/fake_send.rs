use mailgun_mailer::{
    domain::communication::mailer::{Attachment, Mailer, Message},
    infrastructure::email::mailgun::{
        ConfigurationError, MailgunClient, MailgunConfig, MailgunMailer,
    },
};
use serde_json::json;
use testresult::TestResult;

fn fake_config() -> MailgunConfig {
    MailgunConfig {
        fake_message_send: true,
        ..MailgunConfig::new("key-test", "sandbox.example.org")
    }
}

#[tokio::test]
async fn test_fake_send_assigns_message_id() -> TestResult {
    let mailer = MailgunMailer::new(fake_config())?;

    let mut message = Message::builder()
        .from("unittest@example.org")
        .to("test@example.org")
        .cc(vec!["admin@example.com"])
        .bcc(vec!["list@example.org"])
        .subject("Test!")
        .text("Test!")
        .html("<p>Test!</p>")
        .attachment(Attachment::new("info.txt", "text/plain", "Overview"))
        .mailgun_variable("user", json!({"id": "1", "name": "tstark"}))
        .mailgun_option("tracking-opens", "true")
        .build();

    let response = mailer.deliver(&mut message).await?;

    assert_eq!(response.status, 200);
    assert!(mailer.client().test_mode());

    let id = message.message_id().ok_or("message id was not assigned")?;
    assert!(id.starts_with("test-mode-mail-"));

    let deliveries = mailer.client().deliveries();
    assert_eq!(deliveries.len(), 1);

    let payload = &deliveries[0];
    assert_eq!(
        payload.recipients(),
        vec!["test@example.org", "admin@example.com", "list@example.org"]
    );
    assert_eq!(payload.get("o:tracking-opens"), Some(&json!("true")));
    assert!(payload.contains_key("v:user"));

    let encoded = payload.message().ok_or("message missing")?;
    assert!(encoded.contains("Subject: Test!\r\n"));
    assert!(encoded.contains("filename=\"info.txt\""));
    assert!(!encoded.contains("list@example.org"));

    Ok(())
}

#[tokio::test]
async fn test_fake_send_rejects_messages_without_recipients() -> TestResult {
    let mailer = MailgunMailer::new(fake_config())?;

    let mut message = Message::builder().from("unittest@example.org").text("Test!").build();

    assert!(mailer.deliver(&mut message).await.is_err());
    assert!(mailer.client().deliveries().is_empty());
    assert_eq!(message.message_id(), None);

    Ok(())
}

#[test]
fn test_missing_domain_produces_no_mailer() {
    let config = MailgunConfig {
        domain: None,
        ..fake_config()
    };

    assert!(matches!(
        MailgunMailer::new(config),
        Err(ConfigurationError::MissingKey { key: "domain" })
    ));
}
