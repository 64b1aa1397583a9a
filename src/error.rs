//! Error types for the snowgate adapter.
//!
//! This module defines `AdapterError`, the unified error type used throughout
//! the crate for consistent error handling and propagation.
//!
//! # Security
//!
//! Error messages built from remote responses are sanitized so the
//! ServiceNow password never appears in logs or error text. Use
//! `sanitize_message()` when constructing messages from external sources.

use std::time::Duration;
use thiserror::Error;

/// Unified error type for all adapter operations.
///
/// Only the `Http`, `HttpStatus`, `Timeout`, `Authentication` and
/// `Hibernating` variants come from the transport. A health check emits
/// `OFFLINE` for any error the read returns, including `EmptyBody` and
/// `Serialization`.
#[derive(Error, Debug)]
pub enum AdapterError {
    /// Configuration error - missing or invalid environment variables.
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP request failed during transmission.
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// HTTP client initialization failed.
    #[error("HTTP client error: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// HTTP response returned a status other than 200 or 201.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// The HTTP status code returned.
        status: reqwest::StatusCode,
        /// The response body, sanitized and truncated.
        body: String,
    },

    /// Request timed out.
    #[error("request timed out after {duration:?} - the instance may be slow or unreachable")]
    Timeout {
        /// How long we waited before timing out.
        duration: Duration,
        /// The operation that timed out.
        operation: String,
    },

    /// Authentication failed - likely a wrong username or password.
    #[error("authentication failed - check SNOW_USERNAME and SNOW_PASSWORD")]
    Authentication,

    /// The instance answered with its hibernation page instead of data.
    #[error("ServiceNow instance is hibernating")]
    Hibernating,

    /// The transport reported success but carried no body.
    #[error("response from {operation} carried no body")]
    EmptyBody {
        /// The operation whose response was empty.
        operation: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AdapterError {
    /// Creates a configuration error for a missing environment variable.
    pub fn missing_env(var_name: &str) -> Self {
        AdapterError::Config(format!(
            "missing required environment variable: {}",
            var_name
        ))
    }

    /// Creates a configuration error for an invalid value.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        AdapterError::Config(message.into())
    }

    /// Creates a timeout error.
    pub fn timeout(duration: Duration, operation: impl Into<String>) -> Self {
        AdapterError::Timeout {
            duration,
            operation: operation.into(),
        }
    }

    /// Creates an empty body error.
    pub fn empty_body(operation: impl Into<String>) -> Self {
        AdapterError::EmptyBody {
            operation: operation.into(),
        }
    }

    /// Sanitizes a message by removing any occurrence of the password.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to sanitize
    /// * `secret` - The secret to strip from the message
    ///
    /// # Returns
    ///
    /// The message with any occurrence of the secret replaced with `[REDACTED]`
    #[must_use]
    pub fn sanitize_message(message: &str, secret: &str) -> String {
        if secret.is_empty() {
            return message.to_string();
        }
        message.replace(secret, "[REDACTED]")
    }
}
