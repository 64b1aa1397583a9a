//! Data models for the ServiceNow Table API.
//!
//! This module contains the vendor-shaped record, the normalized change
//! ticket the adapter hands out, and the response envelope shared by
//! every Table API call.

mod common;
mod ticket;

pub use common::*;
pub use ticket::*;
