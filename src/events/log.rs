//! JSONL event sink.
//!
//! Each event is appended to a per-event file (`<event>.jsonl`) and to the
//! unified `all.jsonl` stream. Writes never fail the caller: observability
//! must not gate the decision path, so every I/O error is logged and
//! swallowed.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};

use crate::events::types::{EventEntry, EventFilters, StoredEvent};

const UNIFIED_LOG_FILE: &str = "all.jsonl";
const DEFAULT_QUERY_LIMIT: usize = 1000;

/// Maps an event name onto a safe file stem.
///
/// Strips path traversal sequences, maps separators and anything outside
/// `[a-z0-9._-]` to underscores, collapses runs, and lowercases. An empty
/// result becomes "unknown".
fn sanitize_event_name(event: &str) -> String {
    let stripped = event.replace("../", "").replace("..", "");
    let mut out = String::with_capacity(stripped.len());
    let mut prev_underscore = false;
    for ch in stripped.chars() {
        let mapped = match ch {
            c if c.is_ascii_alphanumeric() => c.to_ascii_lowercase(),
            '.' | '-' => ch,
            _ => '_',
        };
        if mapped == '_' {
            if prev_underscore {
                continue;
            }
            prev_underscore = true;
        } else {
            prev_underscore = false;
        }
        out.push(mapped);
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "unknown".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Appending JSONL event log rooted at a base directory.
pub struct EventLog {
    base_dir: PathBuf,
}

impl EventLog {
    /// Creates a log rooted at `base_dir`. The directory is created lazily
    /// on first write.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Appends the entry to its per-event file and to `all.jsonl`.
    ///
    /// Never returns an error; failures are traced and dropped.
    pub fn log(&self, entry: &EventEntry) {
        let stored = StoredEvent {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            event: entry.event.clone(),
            level: entry.level,
            data: entry.data.clone(),
            subsystem: entry.subsystem.clone(),
        };

        let line = match serde_json::to_string(&stored) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(event = %stored.event, error = %e, "failed to serialize event");
                return;
            }
        };

        let event_file = format!("{}.jsonl", sanitize_event_name(&stored.event));
        self.append_line(&event_file, &line);
        self.append_line(UNIFIED_LOG_FILE, &line);
    }

    fn append_line(&self, file_name: &str, line: &str) {
        let path = self.base_dir.join(file_name);
        let result = std::fs::create_dir_all(&self.base_dir).and_then(|_| {
            let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
            writeln!(file, "{}", line)
        });
        if let Err(e) = result {
            tracing::warn!(file = %path.display(), error = %e, "failed to append event log");
        }
    }

    /// Reads and filters the unified stream. A missing or unreadable log
    /// yields an empty result; unparseable lines are skipped.
    pub fn query(&self, filters: &EventFilters) -> Vec<StoredEvent> {
        let unified = self.base_dir.join(UNIFIED_LOG_FILE);
        let raw = match std::fs::read_to_string(&unified) {
            Ok(raw) => raw,
            Err(_) => return Vec::new(),
        };

        let limit = filters.limit.unwrap_or(DEFAULT_QUERY_LIMIT);
        let mut results = Vec::new();

        for line in raw.lines().filter(|l| !l.is_empty()) {
            if results.len() >= limit {
                break;
            }

            let entry: StoredEvent = match serde_json::from_str(line) {
                Ok(entry) => entry,
                Err(_) => continue,
            };

            if let Some(wanted) = &filters.event {
                if wanted.ends_with('.') {
                    if !entry.event.starts_with(wanted.as_str()) {
                        continue;
                    }
                } else if entry.event != *wanted {
                    continue;
                }
            }

            if let Some(min_level) = filters.level {
                if entry.level < min_level {
                    continue;
                }
            }

            if let Some(since) = &filters.since {
                if entry.timestamp.as_str() < since.as_str() {
                    continue;
                }
            }

            if let Some(until) = &filters.until {
                if entry.timestamp.as_str() > until.as_str() {
                    continue;
                }
            }

            if let Some(search) = &filters.search {
                if !line.contains(search.as_str()) {
                    continue;
                }
            }

            results.push(entry);
        }

        results
    }
}
