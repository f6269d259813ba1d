//! Structured event logging.
//!
//! Per-event JSONL files plus a unified `all.jsonl` stream under the
//! configured events directory (default `~/.clawguard/events/`). Scan
//! outcomes land here so quarantine decisions leave an auditable trail.

pub mod log;
pub mod types;

pub use log::EventLog;
pub use types::{EventEntry, EventFilters, EventLevel, StoredEvent};
