//! Infrastructure adapters

pub mod email;
