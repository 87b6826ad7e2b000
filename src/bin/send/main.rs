#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! Sends a message through Mailgun

use anyhow::Result;
use clap::Parser;
use mailgun_mailer::{
    domain::communication::mailer::{HeaderValue, Mailer, Message},
    infrastructure::email::mailgun::{MailgunConfig, MailgunMailer},
};
use serde_json::Value;

/// Command-line arguments / environment variables
#[derive(Debug, Parser)]
pub struct Args {
    /// The Mailgun configuration
    #[clap(flatten)]
    pub mailgun: MailgunConfig,

    /// The sender address
    #[arg(long, env = "MAILGUN_FROM")]
    pub from: String,

    /// Recipient addresses
    #[arg(long, required = true)]
    pub to: Vec<String>,

    /// Carbon copy addresses
    #[arg(long)]
    pub cc: Vec<String>,

    /// Blind carbon copy addresses
    #[arg(long)]
    pub bcc: Vec<String>,

    /// The subject
    #[arg(long, default_value = "")]
    pub subject: String,

    /// The plain text body
    #[arg(long)]
    pub text: Option<String>,

    /// The HTML body
    #[arg(long)]
    pub html: Option<String>,

    /// Extra header, as NAME=VALUE
    #[arg(long = "header", value_parser = parse_key_value)]
    pub headers: Vec<(String, String)>,

    /// Custom variable, as NAME=JSON
    #[arg(long = "var", value_parser = parse_key_value)]
    pub variables: Vec<(String, String)>,

    /// Sending option, as NAME=VALUE
    #[arg(long = "option", value_parser = parse_key_value)]
    pub options: Vec<(String, String)>,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected NAME=VALUE, got {raw:?}"))
}

fn message(args: Args) -> Result<Message> {
    let mut builder = Message::builder()
        .from(HeaderValue::address(&args.from)?)
        .to(args.to)
        .subject(args.subject);

    if !args.cc.is_empty() {
        builder = builder.cc(args.cc);
    }

    if !args.bcc.is_empty() {
        builder = builder.bcc(args.bcc);
    }

    if let Some(text) = args.text {
        builder = builder.text(text);
    }

    if let Some(html) = args.html {
        builder = builder.html(html);
    }

    for (name, value) in args.headers {
        builder = builder.mailgun_header(name, value);
    }

    for (name, value) in args.variables {
        let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
        builder = builder.mailgun_variable(name, value);
    }

    for (name, value) in args.options {
        builder = builder.mailgun_option(name, value);
    }

    Ok(builder.build())
}

#[mutants::skip]
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let mailer = MailgunMailer::new(args.mailgun.clone())?;
    let mut message = message(args)?;

    let response = mailer.deliver(&mut message).await?;

    println!("{} {}", response.status, response.body);

    if let Some(id) = message.message_id() {
        println!("Message-ID: <{id}>");
    }

    Ok(())
}
