//! Errors surfaced by the anime API provider.

use std::time::Duration;
use thiserror::Error;

/// Provider failure. Every variant is shown to the user with a manual retry
/// action; nothing is retried automatically.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Identifier rejected before any request was made
    #[error("Malformed identifier: {id:?}")]
    MalformedId { id: String },

    /// Query parameters rejected before any request was made
    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },

    /// Upstream did not answer within the configured timeout
    #[error("Upstream timed out after {timeout:?}: {url}")]
    Timeout { url: String, timeout: Duration },

    /// Upstream answered with a non-success status
    #[error("Upstream returned {status}: {url}")]
    Status { url: String, status: u16 },

    /// Connection-level failure
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Response body was not the expected JSON
    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Client(#[source] reqwest::Error),
}

impl ProviderError {
    /// Whether the user is offered a "try again" action
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::MalformedId { .. }
            | ProviderError::Timeout { .. }
            | ProviderError::Status { .. }
            | ProviderError::Network(_) => true,
            ProviderError::InvalidQuery { .. }
            | ProviderError::Decode { .. }
            | ProviderError::Client(_) => false,
        }
    }
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;
