//! Email delivery providers

pub mod mailgun;
