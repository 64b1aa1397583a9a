//! Transport layer for the ServiceNow Table API.
//!
//! The adapter never talks HTTP itself. It goes through the [`Transport`]
//! trait, which has exactly two operations: read from the configured table
//! and create a row in it. [`ServiceNowClient`] is the HTTP implementation.
//!
//! # Request shape
//!
//! - GET  `{url}/api/now/table/{table}?sysparm_limit=1`
//! - POST `{url}/api/now/table/{table}` with an empty JSON object
//!
//! Both use HTTP basic authentication and JSON `Accept`/`Content-Type`.
//!
//! # Security
//!
//! The password is never logged. Error bodies are sanitized and truncated
//! before they are stored in an error.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};

use crate::config::AdapterConfig;
use crate::error::AdapterError;
use crate::models::TransportResponse;

/// Path prefix of the Table API.
const TABLE_API_PATH: &str = "/api/now/table";

/// Row limit applied to reads; the adapter only needs one row to prove liveness.
const GET_ROW_LIMIT: &str = "1";

/// Marker ServiceNow puts in the page it serves while an instance sleeps.
const HIBERNATING_MARKER: &str = "Instance Hibernating page";

/// Maximum length for HTTP error response bodies.
const MAX_ERROR_BODY_LEN: usize = 500;

/// The two operations the adapter needs from a ServiceNow connection.
///
/// Implementations return the raw response; any non-`Ok` value is a
/// transport-level failure.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Reads from the configured table.
    async fn get(&self) -> Result<TransportResponse, AdapterError>;

    /// Creates a row in the configured table.
    async fn post(&self) -> Result<TransportResponse, AdapterError>;
}

/// HTTP client for the ServiceNow Table API.
///
/// # Example
///
/// ```ignore
/// let config = AdapterConfig::from_env()?;
/// let client = ServiceNowClient::new(&config)?;
///
/// let response = client.get().await?;
/// ```
#[derive(Clone)]
pub struct ServiceNowClient {
    /// The underlying HTTP client (cloning is cheap).
    http: Client,

    /// Full URL of the table endpoint.
    table_url: String,

    /// Table name, kept for log fields.
    table: String,

    username: String,

    /// SECURITY: Never log this value!
    password: String,

    timeout: Duration,
}

impl ServiceNowClient {
    /// Creates a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `AdapterError::HttpClient` if the HTTP client fails to initialize.
    pub fn new(config: &AdapterConfig) -> Result<Self, AdapterError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(AdapterError::HttpClient)?;

        Ok(Self {
            http,
            table_url: Self::table_url(&config.url, &config.table),
            table: config.table.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            timeout: config.timeout,
        })
    }

    /// Builds the Table API endpoint for `table` on the instance at `base_url`.
    fn table_url(base_url: &str, table: &str) -> String {
        format!(
            "{}{}/{}",
            base_url.trim_end_matches('/'),
            TABLE_API_PATH,
            urlencoding::encode(table)
        )
    }

    /// Sends one request and classifies the result.
    ///
    /// No retry is attempted: one call, one outcome.
    async fn send(&self, method: Method) -> Result<TransportResponse, AdapterError> {
        let operation = format!("{} {}", method, self.table);

        tracing::debug!(
            method = %method,
            table = %self.table,
            "Making ServiceNow API request"
        );

        let mut req = self
            .http
            .request(method.clone(), &self.table_url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Accept", "application/json")
            .header("Content-Type", "application/json");

        req = match method {
            Method::GET => req.query(&[("sysparm_limit", GET_ROW_LIMIT)]),
            _ => req.body("{}"),
        };

        let response = req
            .send()
            .await
            .map_err(|e| self.classify_error(e, &operation))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.classify_error(e, &operation))?;

        tracing::trace!(status = %status, body = %body, "ServiceNow API response");

        self.process_response(status, body)
    }

    /// Maps a reqwest failure, from sending or from reading the body.
    fn classify_error(&self, error: reqwest::Error, operation: &str) -> AdapterError {
        if error.is_timeout() {
            return AdapterError::timeout(self.timeout, operation);
        }
        AdapterError::Http(error)
    }

    /// Turns a status and body into a response or an error.
    fn process_response(
        &self,
        status: StatusCode,
        body: String,
    ) -> Result<TransportResponse, AdapterError> {
        if Self::is_hibernating(status, &body) {
            tracing::warn!(table = %self.table, "ServiceNow instance is hibernating");
            return Err(AdapterError::Hibernating);
        }

        match status {
            StatusCode::OK | StatusCode::CREATED => {
                let body = if body.is_empty() { None } else { Some(body) };
                Ok(TransportResponse {
                    status: status.as_u16(),
                    body,
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AdapterError::Authentication),
            _ => Err(AdapterError::HttpStatus {
                status,
                body: self.clean_error_body(&body),
            }),
        }
    }

    /// A sleeping developer instance answers 200 with an HTML page.
    fn is_hibernating(status: StatusCode, body: &str) -> bool {
        status == StatusCode::OK && body.contains(HIBERNATING_MARKER)
    }

    /// Sanitizes and truncates a body for inclusion in an error.
    fn clean_error_body(&self, body: &str) -> String {
        let body = AdapterError::sanitize_message(body, &self.password);
        if body.len() > MAX_ERROR_BODY_LEN {
            let cut = (0..=MAX_ERROR_BODY_LEN)
                .rev()
                .find(|i| body.is_char_boundary(*i))
                .unwrap_or(0);
            format!("{}...[truncated]", &body[..cut])
        } else {
            body
        }
    }
}

#[async_trait]
impl Transport for ServiceNowClient {
    async fn get(&self) -> Result<TransportResponse, AdapterError> {
        self.send(Method::GET).await
    }

    async fn post(&self) -> Result<TransportResponse, AdapterError> {
        self.send(Method::POST).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Creates a client for unit tests without requiring env vars.
    fn test_client() -> ServiceNowClient {
        ServiceNowClient {
            http: Client::new(),
            table_url: ServiceNowClient::table_url("https://example.com", "change_request"),
            table: "change_request".to_string(),
            username: "admin".to_string(),
            password: "s3cret".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    #[test]
    fn test_table_url() {
        assert_eq!(
            ServiceNowClient::table_url("https://example.com", "change_request"),
            "https://example.com/api/now/table/change_request"
        );
        assert_eq!(
            ServiceNowClient::table_url("https://example.com/", "incident"),
            "https://example.com/api/now/table/incident"
        );
    }

    #[test]
    fn test_process_response_ok() {
        let client = test_client();
        let response = client
            .process_response(StatusCode::OK, r#"{"result":[]}"#.to_string())
            .unwrap();
        assert_eq!(response, TransportResponse::new(200, r#"{"result":[]}"#));
    }

    #[test]
    fn test_process_response_created_empty_body() {
        let client = test_client();
        let response = client
            .process_response(StatusCode::CREATED, String::new())
            .unwrap();
        assert_eq!(response, TransportResponse::empty(201));
    }

    #[test]
    fn test_process_response_hibernating() {
        let client = test_client();
        let html = "<html><head><title>Instance Hibernating page</title></head></html>";
        let err = client
            .process_response(StatusCode::OK, html.to_string())
            .unwrap_err();
        assert!(matches!(err, AdapterError::Hibernating));
    }

    #[test]
    fn test_process_response_unauthorized() {
        let client = test_client();
        let err = client
            .process_response(StatusCode::UNAUTHORIZED, "{}".to_string())
            .unwrap_err();
        assert!(matches!(err, AdapterError::Authentication));
    }

    #[test]
    fn test_process_response_other_status_is_error() {
        let client = test_client();
        let err = client
            .process_response(StatusCode::NO_CONTENT, String::new())
            .unwrap_err();
        assert!(matches!(err, AdapterError::HttpStatus { .. }));
    }

    #[test]
    fn test_error_body_is_sanitized_and_truncated() {
        let client = test_client();
        let body = format!("password s3cret rejected {}", "x".repeat(1000));
        let err = client
            .process_response(StatusCode::BAD_REQUEST, body)
            .unwrap_err();
        match err {
            AdapterError::HttpStatus { body, .. } => {
                assert!(!body.contains("s3cret"));
                assert!(body.ends_with("...[truncated]"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
