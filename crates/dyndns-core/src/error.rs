//! Error types for the dyndns system
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for dyndns operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the dyndns system
///
/// The taxonomy mirrors how errors propagate at runtime:
/// - [`Error::Config`] is fatal and only possible at startup
/// - [`Error::Network`] and [`Error::Api`] are transient; they abort the
///   affected reconciliation work and are retried implicitly on the next tick
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (fatal at startup)
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport failures while resolving the external IP
    #[error("network error: {0}")]
    Network(String),

    /// Failures talking to the DNS provider API (transport or parse)
    #[error("API error: {0}")]
    Api(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a provider API error
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
