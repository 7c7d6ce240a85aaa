//! Error types for the event broker framework.
//!
//! Provides a unified error type for broker resolution and operation. The
//! `NotFound` and `ContractMismatch` variants are the resolution failures the
//! factory recovers from; everything else propagates to the caller.

use thiserror::Error;

/// Errors that can occur while resolving, constructing, or driving a broker.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// The type identifier does not name any registered adapter.
    #[error("Event broker type '{0}' could not be found")]
    NotFound(String),

    /// The identifier resolved to a plugin that does not provide the event
    /// broker factory contract.
    #[error("Registered type '{0}' is not an event broker factory")]
    ContractMismatch(String),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// I/O error (file, network, etc).
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Failed to connect to an external system.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Failed to publish an event to the transport.
    #[error("Publish error: {0}")]
    PublishError(String),
}

/// Result type alias for broker operations.
pub type Result<T> = std::result::Result<T, BrokerError>;

impl BrokerError {
    /// True for the resolution failures the factory converts into
    /// "no broker" instead of surfacing to the caller.
    pub fn is_unresolved(&self) -> bool {
        matches!(
            self,
            BrokerError::NotFound(_) | BrokerError::ContractMismatch(_)
        )
    }
}

impl From<serde_json::Error> for BrokerError {
    fn from(e: serde_json::Error) -> Self {
        BrokerError::SerializationError(e.to_string())
    }
}
