//! Error types for agentwire.
//!
//! The translation core never fails; these errors come from the edges
//! (provider response decoding, frame encoding, configuration, CLI I/O).

use thiserror::Error;

/// Primary error type for all agentwire operations.
#[derive(Error, Debug)]
pub enum AgentwireError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl AgentwireError {
    /// Create a malformed-response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Whether the error originated from the model endpoint's payload.
    pub fn is_provider_payload(&self) -> bool {
        matches!(self, Self::MalformedResponse(_))
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, AgentwireError>;
