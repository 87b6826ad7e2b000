//! Composed messages, the mailer seam and the Mailgun payload transformer

pub mod errors;
pub mod mailer;
pub mod mailgun;
