//! Access token records and redacted secret wrappers.

pub mod access;
pub mod secret;
