//! # snowgate
//!
//! snowgate is an event-driven adapter for ServiceNow change requests.
//!
//! It runs health checks against a ServiceNow table, reports the result as
//! `ONLINE`/`OFFLINE` events, and reads or creates change requests, handing
//! them out in a normalized ticket shape.
//!
//! ## Architecture
//!
//! - [`config`] - Connection properties, loaded from environment variables
//! - [`error`] - Error types with password sanitization
//! - [`connector`] - The `Transport` trait and the HTTP Table API client
//! - [`events`] - Status events and the emitter observers subscribe to
//! - [`adapter`] - The adapter lifecycle and record reshaping
//! - [`models`] - Table API records and normalized tickets
//!
//! ## Configuration
//!
//! - `SNOW_URL`: Instance URL, e.g. `https://dev12345.service-now.com`
//! - `SNOW_USERNAME` / `SNOW_PASSWORD`: Basic-auth credentials
//! - `SNOW_TABLE`: Table name (default `change_request`)
//! - `SNOW_TIMEOUT_SECS`: Request timeout (default 30)
//!
//! Optional:
//! - `RUST_LOG`: Log level (e.g., `snowgate=debug`)
//!
//! ## Example
//!
//! ```ignore
//! use snowgate::{Adapter, AdapterConfig, AdapterStatus};
//!
//! async fn example() -> Result<(), snowgate::AdapterError> {
//!     let config = AdapterConfig::from_env()?;
//!     let adapter = Adapter::new("change-adapter-1", &config)?;
//!
//!     let mut events = adapter.subscribe();
//!     adapter.connect().await;
//!
//!     if let Ok(event) = events.recv().await {
//!         if event.status == AdapterStatus::Online {
//!             println!("{}", adapter.get_record().await?);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod adapter;
pub mod config;
pub mod connector;
pub mod error;
pub mod events;
pub mod models;

pub use adapter::Adapter;
pub use config::AdapterConfig;
pub use connector::{ServiceNowClient, Transport};
pub use error::AdapterError;
pub use events::{AdapterStatus, StatusEvent};
pub use models::ChangeTicket;
