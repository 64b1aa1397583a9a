//! Change ticket models.
//!
//! `RawRecord` is the row as ServiceNow returns it; `ChangeTicket` is the
//! adapter-shaped projection. The mapping between the two is a pure rename:
//! values are carried over untouched, whatever JSON type they happen to be.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A change request row as returned by the Table API.
///
/// Only the fields the adapter projects are captured; everything else in
/// the row is ignored. Absent fields deserialize to `Value::Null`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRecord {
    /// Human-readable ticket number, e.g. `CHG0030001`.
    #[serde(default)]
    pub number: Value,

    /// Whether the ticket is still open.
    #[serde(default)]
    pub active: Value,

    /// Priority code, `"1"` (critical) to `"5"` (planning).
    #[serde(default)]
    pub priority: Value,

    /// Free-text description.
    #[serde(default)]
    pub description: Value,

    /// Planned start of work.
    #[serde(default)]
    pub work_start: Value,

    /// Planned end of work.
    #[serde(default)]
    pub work_end: Value,

    /// ServiceNow's unique row key.
    #[serde(default)]
    pub sys_id: Value,
}

/// A change ticket in the adapter's normalized shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeTicket {
    /// Copied from `number`.
    pub change_ticket_number: Value,

    /// Copied from `active`.
    pub active: Value,

    /// Copied from `priority`.
    pub priority: Value,

    /// Copied from `description`.
    pub description: Value,

    /// Copied from `work_start`.
    pub work_start: Value,

    /// Copied from `work_end`.
    pub work_end: Value,

    /// Copied from `sys_id`.
    pub change_ticket_key: Value,
}

impl From<RawRecord> for ChangeTicket {
    fn from(raw: RawRecord) -> Self {
        Self {
            change_ticket_number: raw.number,
            active: raw.active,
            priority: raw.priority,
            description: raw.description,
            work_start: raw.work_start,
            work_end: raw.work_end,
            change_ticket_key: raw.sys_id,
        }
    }
}

impl ChangeTicket {
    /// Returns the ticket number as text, if it is a string.
    pub fn number(&self) -> Option<&str> {
        self.change_ticket_number.as_str()
    }

    /// Returns the ticket key as text, if it is a string.
    pub fn key(&self) -> Option<&str> {
        self.change_ticket_key.as_str()
    }
}

/// Maps a list of raw records to tickets, preserving order.
pub fn normalize_all(records: Vec<RawRecord>) -> Vec<ChangeTicket> {
    records.into_iter().map(ChangeTicket::from).collect()
}
