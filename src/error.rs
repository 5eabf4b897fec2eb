//! Error types for the signal listener.
//!
//! The extraction core is total and has no error type. Everything here
//! belongs to the collaborators around it.

use std::time::Duration;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Channel-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel health check failed: {name}: {reason}")]
    HealthCheckFailed { name: String, reason: String },
}

/// Errors raised while handing an accepted signal to a sink.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("HTTP request to {url} failed: {reason}")]
    Http { url: String, reason: String },

    #[error("Request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("Invalid response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("Failed to serialize signal: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Signal log IO error: {0}")]
    Io(#[from] std::io::Error),
}
