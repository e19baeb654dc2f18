use std::time::Duration;
use thiserror::Error;

/// Errors raised inside validation.
///
/// [`crate::Validator::validate`] never returns these; a failed lookup is
/// logged and read as "no".
#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error("{lookup} lookup for {domain} exceeded {timeout:?}")]
    Timeout {
        lookup: &'static str,
        domain: String,
        timeout: Duration,
    },

    #[error("DNS resolver unavailable: {0}")]
    Resolver(#[from] hickory_resolver::error::ResolveError),
}

pub type Result<T> = std::result::Result<T, ValidatorError>;
