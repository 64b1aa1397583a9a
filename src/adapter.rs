//! The ServiceNow change-request adapter.
//!
//! `Adapter` ties together a [`Transport`] and a [`StatusEmitter`]:
//! `connect()` runs one health check and emits `ONLINE` or `OFFLINE`,
//! `get_record()` and `post_record()` reshape the Table API response into
//! [`ChangeTicket`]s.
//!
//! # Error delivery
//!
//! Transport errors are logged here and then returned to the caller. A
//! successful response with no body is reported as
//! [`AdapterError::EmptyBody`], and a body that is not valid JSON as
//! [`AdapterError::Serialization`].

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::AdapterConfig;
use crate::connector::{ServiceNowClient, Transport};
use crate::error::AdapterError;
use crate::events::{AdapterStatus, StatusEmitter, StatusEvent};
use crate::models::{normalize_all, ChangeTicket, RawRecord, TableResponse, TransportResponse};

/// Adapter between the generic connect/healthcheck lifecycle and one
/// ServiceNow table.
#[derive(Clone)]
pub struct Adapter {
    /// Identifier included in every status event.
    id: String,

    transport: Arc<dyn Transport>,

    /// Owned event capability; observers register through `subscribe()`.
    emitter: StatusEmitter,
}

impl std::fmt::Debug for Adapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adapter")
            .field("id", &self.id)
            .field("subscribers", &self.emitter.subscriber_count())
            .finish_non_exhaustive()
    }
}

impl Adapter {
    /// Creates an adapter backed by the HTTP [`ServiceNowClient`].
    ///
    /// # Errors
    ///
    /// Returns `AdapterError::HttpClient` if the HTTP client fails to initialize.
    pub fn new(id: impl Into<String>, config: &AdapterConfig) -> Result<Self, AdapterError> {
        let client = ServiceNowClient::new(config)?;
        Ok(Self::with_transport(id, Arc::new(client)))
    }

    /// Creates an adapter backed by any transport.
    pub fn with_transport(id: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            id: id.into(),
            transport,
            emitter: StatusEmitter::new(),
        }
    }

    /// Returns the adapter's identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Registers an observer for `ONLINE`/`OFFLINE` events.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.emitter.subscribe()
    }

    /// Runs a single health check.
    ///
    /// All connection details came in through the constructor, so there is
    /// nothing to pass here. The outcome is observable as a status event.
    pub async fn connect(&self) {
        self.healthcheck().await;
    }

    /// Reads the table once and emits `ONLINE` on success, `OFFLINE` on any
    /// error. Each call emits independently; repeated identical outcomes are
    /// not suppressed.
    ///
    /// Returns the status that was emitted.
    pub async fn healthcheck(&self) -> AdapterStatus {
        match self.get_record().await {
            Ok(_) => {
                self.emit_online();
                AdapterStatus::Online
            }
            Err(e) => {
                tracing::debug!(id = %self.id, error = %e, "Health check failed");
                self.emit_offline();
                AdapterStatus::Offline
            }
        }
    }

    /// Emits `OFFLINE`.
    pub fn emit_offline(&self) {
        self.emit_status(AdapterStatus::Offline);
        tracing::warn!(id = %self.id, "ServiceNow: Instance is unavailable.");
    }

    /// Emits `ONLINE`.
    pub fn emit_online(&self) {
        self.emit_status(AdapterStatus::Online);
        tracing::info!(id = %self.id, "ServiceNow: Instance is available.");
    }

    /// Emits an event named by `status` with payload `{ id }`.
    pub fn emit_status(&self, status: AdapterStatus) {
        self.emitter.emit(StatusEvent::new(status, self.id.clone()));
    }

    /// Reads the table and returns the tickets as a JSON array string.
    ///
    /// # Errors
    ///
    /// Returns the transport error, `EmptyBody` if the response has no body,
    /// or `Serialization` if the body is not a Table API envelope.
    pub async fn get_record(&self) -> Result<String, AdapterError> {
        let tickets = self.get_tickets().await?;
        Ok(serde_json::to_string(&tickets)?)
    }

    /// Reads the table and returns the tickets in the order received.
    ///
    /// A `result` holding a single object yields one ticket.
    ///
    /// # Errors
    ///
    /// Returns the transport error, `EmptyBody` if the response has no body,
    /// or `Serialization` if the body is not a Table API envelope of record
    /// objects.
    pub async fn get_tickets(&self) -> Result<Vec<ChangeTicket>, AdapterError> {
        let response = self.transport.get().await.inspect_err(|e| {
            tracing::error!(id = %self.id, error = %e, "Error returned from GET request");
        })?;

        let body = Self::require_body(&response, "GET")?;
        let parsed: TableResponse<RawRecord> = serde_json::from_str(body)?;
        let tickets = normalize_all(parsed.result.into_vec());

        tracing::debug!(id = %self.id, count = tickets.len(), "Fetched change tickets");

        Ok(tickets)
    }

    /// Creates a row and returns it as a ticket.
    ///
    /// If `result` is a list, its first element is used.
    ///
    /// # Errors
    ///
    /// Returns the transport error, `EmptyBody` if the response has no body
    /// or an empty `result`, or `Serialization` if the body is not a Table
    /// API envelope.
    pub async fn post_record(&self) -> Result<ChangeTicket, AdapterError> {
        let response = self.transport.post().await.inspect_err(|e| {
            tracing::error!(id = %self.id, error = %e, "Error returned from POST request");
        })?;

        let body = Self::require_body(&response, "POST")?;
        let parsed: TableResponse<RawRecord> = serde_json::from_str(body)?;
        let raw = parsed
            .result
            .into_first()
            .ok_or_else(|| AdapterError::empty_body("POST"))?;
        let ticket = ChangeTicket::from(raw);

        tracing::info!(
            id = %self.id,
            number = ?ticket.change_ticket_number,
            "Created change ticket"
        );

        Ok(ticket)
    }

    fn require_body<'a>(
        response: &'a TransportResponse,
        operation: &str,
    ) -> Result<&'a str, AdapterError> {
        response
            .body()
            .ok_or_else(|| AdapterError::empty_body(operation))
    }
}
