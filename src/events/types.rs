//! Wire types for the structured event log.

use serde::{Deserialize, Serialize};

/// Event severity. Ordering follows priority: debug < info < warn < error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for EventLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for EventLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown event level: {}", other)),
        }
    }
}

/// An event to be logged
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEntry {
    /// Dot-namespaced event name, e.g. "security.email_scan"
    pub event: String,
    /// Severity level
    pub level: EventLevel,
    /// Arbitrary structured data
    pub data: serde_json::Value,
    /// Source subsystem
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subsystem: Option<String>,
}

impl EventEntry {
    pub fn new(event: impl Into<String>, level: EventLevel, data: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            level,
            data,
            subsystem: None,
        }
    }

    pub fn with_subsystem(mut self, subsystem: impl Into<String>) -> Self {
        self.subsystem = Some(subsystem.into());
        self
    }
}

/// A logged event as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEvent {
    /// RFC 3339 UTC timestamp, assigned at write time
    pub timestamp: String,
    pub event: String,
    pub level: EventLevel,
    pub data: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subsystem: Option<String>,
}

/// Filters for querying the unified event stream.
///
/// Timestamps are RFC 3339 strings; comparison is lexicographic, which
/// matches chronological order for the UTC timestamps the log writes.
#[derive(Debug, Clone, Default)]
pub struct EventFilters {
    /// Event name, exact match or prefix when ending with a dot
    /// ("security." matches every security event)
    pub event: Option<String>,
    /// Minimum level
    pub level: Option<EventLevel>,
    /// Substring search over the raw serialized line
    pub search: Option<String>,
    /// Inclusive start timestamp
    pub since: Option<String>,
    /// Inclusive end timestamp
    pub until: Option<String>,
    /// Max results, default 1000
    pub limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_priority_ordering() {
        assert!(EventLevel::Debug < EventLevel::Info);
        assert!(EventLevel::Info < EventLevel::Warn);
        assert!(EventLevel::Warn < EventLevel::Error);
    }

    #[test]
    fn test_level_display_round_trip() {
        for level in [
            EventLevel::Debug,
            EventLevel::Info,
            EventLevel::Warn,
            EventLevel::Error,
        ] {
            let parsed: EventLevel = level.to_string().parse().unwrap();
            assert_eq!(parsed, level);
        }
        assert!("critical".parse::<EventLevel>().is_err());
    }

    #[test]
    fn test_stored_event_serialization() {
        let stored = StoredEvent {
            timestamp: "2026-02-12T10:00:00.000Z".to_string(),
            event: "security.email_scan".to_string(),
            level: EventLevel::Warn,
            data: serde_json::json!({ "riskScore": 95 }),
            subsystem: Some("scanner".to_string()),
        };

        let json = serde_json::to_string(&stored).unwrap();
        assert!(json.contains("\"event\":\"security.email_scan\""));
        assert!(json.contains("\"level\":\"warn\""));
        assert!(json.contains("\"riskScore\":95"));

        let parsed: StoredEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.level, EventLevel::Warn);
        assert_eq!(parsed.subsystem.as_deref(), Some("scanner"));
    }

    #[test]
    fn test_stored_event_omits_absent_subsystem() {
        let stored = StoredEvent {
            timestamp: "2026-02-12T10:00:00.000Z".to_string(),
            event: "cron.tick".to_string(),
            level: EventLevel::Debug,
            data: serde_json::json!({}),
            subsystem: None,
        };

        let json = serde_json::to_string(&stored).unwrap();
        assert!(!json.contains("subsystem"));
    }

    #[test]
    fn test_entry_builder() {
        let entry = EventEntry::new("email.received", EventLevel::Info, serde_json::json!({}))
            .with_subsystem("gateway");
        assert_eq!(entry.event, "email.received");
        assert_eq!(entry.subsystem.as_deref(), Some("gateway"));
    }
}
