//! Error types for registry and catalog operations.
//!
//! Provides a unified error type covering all failure modes: I/O,
//! serialization, configuration, HTTP transport and non-success responses
//! from the form registry service.

use thiserror::Error;

/// Errors that can occur while talking to the registry or loading forms.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Transport failure (connect, timeout, body decoding).
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Base URL could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The registry answered with a non-success status.
    #[error("registry returned HTTP {status} for {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// The requested form or submission does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Configuration validation failure.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// All configured catalog sources failed.
    #[error("no form sources available")]
    NoSourcesAvailable,
}

/// Convenience alias for results with [`RegistryError`].
pub type Result<T> = std::result::Result<T, RegistryError>;
