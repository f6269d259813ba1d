//! Scan-and-report integration.
//!
//! Combines the deterministic scanner with the structured event log so
//! integration points (webhook intake, tool-output capture, cron jobs) do
//! not each reimplement the scan, warn, record sequence. Everything here
//! is synchronous and infallible from the caller's point of view: a
//! broken event sink degrades to tracing output, never to a lost verdict.

use std::sync::OnceLock;

use serde_json::{Map, Value};

use crate::boundary::ContentSource;
use crate::config::GuardConfig;
use crate::error::Result;
use crate::events::{EventEntry, EventLevel, EventLog};
use crate::scanner::{ContentScanner, ScanOptions, ScanVerdict};

/// Options for one scan-and-report call
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Where the content came from
    pub source: ContentSource,
    /// Sender identity, carried into the boundary attribution
    pub sender: Option<String>,
    /// Event name override; defaults to `security.<source>_scan`
    pub event_name: Option<String>,
    /// Extra fields merged into the event data
    pub extra: Map<String, Value>,
}

impl ReportOptions {
    pub fn new(source: ContentSource) -> Self {
        Self {
            source,
            sender: None,
            event_name: None,
            extra: Map::new(),
        }
    }
}

/// Deterministic scanner wired to an event log.
pub struct ScanReporter {
    scanner: ContentScanner,
    events: Option<EventLog>,
}

impl ScanReporter {
    pub fn new() -> Result<Self> {
        Self::with_config(GuardConfig::default())
    }

    pub fn with_config(config: GuardConfig) -> Result<Self> {
        let GuardConfig { scanner, events } = config;
        let event_log = if events.enabled {
            Some(EventLog::new(events.base_dir))
        } else {
            None
        };
        Ok(Self {
            scanner: ContentScanner::with_config(scanner)?,
            events: event_log,
        })
    }

    /// Scans content with the deterministic stage only and records the
    /// outcome.
    ///
    /// Quarantines are warned with source, score, and rule ids but never
    /// the content itself. A structured event is emitted only when there
    /// are findings, so clean traffic stays out of the log.
    pub fn scan_and_report(&self, content: &str, options: &ReportOptions) -> ScanVerdict {
        let mut scan_options = ScanOptions::new(options.source);
        scan_options.sender = options.sender.clone();

        let verdict = self.scanner.scan_sync(content, &scan_options);

        if verdict.quarantined {
            let rules: Vec<&str> = verdict.findings.iter().map(|f| f.rule.as_str()).collect();
            tracing::warn!(
                source = %options.source,
                risk_score = verdict.risk_score,
                rules = %rules.join(", "),
                "content quarantined"
            );
        }

        if !verdict.findings.is_empty() {
            if let Some(events) = &self.events {
                let mut data = Map::new();
                data.insert("riskScore".to_string(), verdict.risk_score.into());
                data.insert("safe".to_string(), verdict.safe.into());
                data.insert("quarantined".to_string(), verdict.quarantined.into());
                data.insert("findingsCount".to_string(), verdict.findings.len().into());
                data.insert("confidence".to_string(), verdict.confidence.into());
                for (key, value) in &options.extra {
                    data.insert(key.clone(), value.clone());
                }

                let event_name = options
                    .event_name
                    .clone()
                    .unwrap_or_else(|| format!("security.{}_scan", options.source));
                let level = if verdict.quarantined {
                    EventLevel::Warn
                } else {
                    EventLevel::Info
                };

                events.log(
                    &EventEntry::new(event_name, level, Value::Object(data))
                        .with_subsystem("security"),
                );
            }
        }

        verdict
    }
}

static SHARED: OnceLock<Option<ScanReporter>> = OnceLock::new();

/// Scans with a process-wide shared reporter built from the default
/// configuration.
///
/// Returns `None` only when the shared scanner could not be constructed;
/// callers should treat an absent verdict as fail-closed.
pub fn scan_and_report(content: &str, options: &ReportOptions) -> Option<ScanVerdict> {
    let reporter = SHARED.get_or_init(|| match ScanReporter::new() {
        Ok(reporter) => Some(reporter),
        Err(e) => {
            tracing::error!(error = %e, "scan reporter unavailable");
            None
        }
    });
    reporter
        .as_ref()
        .map(|reporter| reporter.scan_and_report(content, options))
}
