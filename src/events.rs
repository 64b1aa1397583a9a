//! Status events and the emitter the adapter owns.
//!
//! Observers call [`StatusEmitter::subscribe`] and receive every event
//! emitted afterwards. Emission never blocks and never fails: with no
//! subscribers the event is simply dropped.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Buffer size of the broadcast channel; slow subscribers lag past this.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Health of the remote instance as last observed by a health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AdapterStatus {
    /// The instance answered the health read.
    Online,
    /// The health read failed.
    Offline,
}

impl AdapterStatus {
    /// Returns the event name.
    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterStatus::Online => "ONLINE",
            AdapterStatus::Offline => "OFFLINE",
        }
    }
}

impl fmt::Display for AdapterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload carried by every status event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPayload {
    /// Identifier of the adapter instance that emitted the event.
    pub id: String,
}

/// A named status event with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    /// Event name.
    pub status: AdapterStatus,
    /// Event payload.
    pub payload: StatusPayload,
}

impl StatusEvent {
    /// Creates an event for adapter `id`.
    pub fn new(status: AdapterStatus, id: impl Into<String>) -> Self {
        Self {
            status,
            payload: StatusPayload { id: id.into() },
        }
    }

    /// Returns the id of the emitting adapter.
    pub fn id(&self) -> &str {
        &self.payload.id
    }
}

/// Fan-out of status events to any number of subscribers.
#[derive(Debug, Clone)]
pub struct StatusEmitter {
    sender: broadcast::Sender<StatusEvent>,
}

impl Default for StatusEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusEmitter {
    /// Creates an emitter with no subscribers.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Registers a new observer.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.sender.subscribe()
    }

    /// Returns how many observers are currently registered.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Emits `event` to every current subscriber.
    ///
    /// Returns the number of subscribers that received it.
    pub fn emit(&self, event: StatusEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(event)) => {
                tracing::debug!(
                    status = %event.status,
                    id = %event.id(),
                    "No subscribers for status event"
                );
                0
            }
        }
    }
}
