//! Validation error shared by every rekon crate.

use std::error::Error as StdError;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// The single failure category of the core: the input was not acceptable.
///
/// Nothing here is transient, so callers never retry on it.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), source: None }
    }

    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self { message: message.into(), source: Some(source.into()) }
    }

    pub fn message(&self) -> &str { &self.message }
}

pub type Result<T> = std::result::Result<T, ValidationError>;
