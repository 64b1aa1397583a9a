//! Configuration management for the snowgate adapter.
//!
//! This module handles loading the connection properties from environment
//! variables, with validation to ensure all required values are present.

use std::env;
use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::AdapterError;

/// Table used when `SNOW_TABLE` is not set.
pub const DEFAULT_TABLE: &str = "change_request";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection properties for a ServiceNow instance.
///
/// Set once at construction and never mutated afterwards. The password is
/// stored but never logged or exposed in error messages.
#[derive(Clone)]
pub struct AdapterConfig {
    /// Instance URL (e.g., `https://dev12345.service-now.com`).
    pub url: String,

    /// User for HTTP basic authentication.
    pub username: String,

    /// Password for HTTP basic authentication.
    /// This value must never be logged or included in error messages.
    pub password: String,

    /// Table the adapter reads from and writes to.
    pub table: String,

    /// Per-request timeout applied by the HTTP transport.
    pub timeout: Duration,
}

impl fmt::Debug for AdapterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("table", &self.table)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AdapterConfig {
    /// Builds a validated configuration from explicit values.
    ///
    /// # Errors
    ///
    /// Returns `AdapterError::Config` if the URL or table name is invalid,
    /// or if the password is a placeholder value.
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        table: impl Into<String>,
    ) -> Result<Self, AdapterError> {
        let url = Self::validate_url(url.into())?;
        let table = Self::validate_table(table.into())?;
        let password: String = password.into();
        Self::validate_password(&password)?;

        Ok(AdapterConfig {
            url,
            username: username.into(),
            password,
            table,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Overrides the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Loads configuration from environment variables.
    ///
    /// # Required Environment Variables
    ///
    /// - `SNOW_URL`: The instance URL
    /// - `SNOW_USERNAME`: The basic-auth user
    /// - `SNOW_PASSWORD`: The basic-auth password
    ///
    /// # Optional Environment Variables
    ///
    /// - `SNOW_TABLE`: Table name (default `change_request`)
    /// - `SNOW_TIMEOUT_SECS`: Request timeout in seconds (default 30)
    ///
    /// # Errors
    ///
    /// Returns `AdapterError::Config` if any required variable is missing
    /// or if values fail validation.
    ///
    /// # Example
    ///
    /// ```ignore
    /// dotenvy::dotenv().ok();
    /// let config = AdapterConfig::from_env()?;
    /// ```
    pub fn from_env() -> Result<Self, AdapterError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    fn from_lookup<F>(lookup: F) -> Result<Self, AdapterError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = Self::get_required(&lookup, "SNOW_URL")?;
        let username = Self::get_required(&lookup, "SNOW_USERNAME")?;
        let password = Self::get_required(&lookup, "SNOW_PASSWORD")?;
        let table = lookup("SNOW_TABLE")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TABLE.to_string());

        let timeout = match lookup("SNOW_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| {
                    AdapterError::invalid_config("SNOW_TIMEOUT_SECS must be a whole number")
                })?;
                if secs == 0 {
                    return Err(AdapterError::invalid_config(
                        "SNOW_TIMEOUT_SECS must be greater than zero",
                    ));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self::new(url, username.trim(), password, table.trim())?.with_timeout(timeout))
    }

    /// Gets a required variable, returning an error if missing or empty.
    fn get_required<F>(lookup: &F, name: &str) -> Result<String, AdapterError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(name) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(AdapterError::missing_env(name)),
        }
    }

    /// Validates and normalizes the instance URL.
    fn validate_url(url: String) -> Result<String, AdapterError> {
        let url = url.trim().trim_end_matches('/').to_string();

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(AdapterError::invalid_config(
                "SNOW_URL must start with http:// or https://",
            ));
        }

        let parsed = Url::parse(&url)
            .map_err(|e| AdapterError::invalid_config(format!("SNOW_URL is not a valid URL: {}", e)))?;
        if parsed.host_str().is_none() {
            return Err(AdapterError::invalid_config("SNOW_URL must include a host"));
        }

        Ok(url)
    }

    /// Validates the table name is a plain ServiceNow identifier.
    fn validate_table(table: String) -> Result<String, AdapterError> {
        if table.is_empty()
            || !table
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_')
        {
            return Err(AdapterError::invalid_config(format!(
                "SNOW_TABLE must contain only letters, digits and underscores, got: {:?}",
                table.chars().take(50).collect::<String>()
            )));
        }
        Ok(table)
    }

    /// Validates the password is not a placeholder value.
    ///
    /// Only whole-value matches count; real passwords may contain these words.
    fn validate_password(password: &str) -> Result<(), AdapterError> {
        let lower = password.trim().to_lowercase();
        let placeholders = ["your_password", "placeholder", "changeme", "xxx"];

        if placeholders.contains(&lower.as_str()) {
            return Err(AdapterError::invalid_config(
                "SNOW_PASSWORD appears to be a placeholder value",
            ));
        }

        Ok(())
    }
}
