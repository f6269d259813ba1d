//! ClawGuard - Content trust boundary for chat-automation agents
//!
//! ClawGuard sits between a chat agent and everything the agent does not
//! control. Inbound external content (email, webhooks, DMs from unknown
//! parties, tool output, documents) is scanned for injection attempts and
//! wrapped in an explicit trust boundary before it may enter a prompt.
//! Outbound agent output is classified into sensitivity tiers and gated
//! against the destination context so confidential data cannot leak into
//! a group chat or an external channel.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                            ClawGuard                             │
//! │                                                                  │
//! │   INBOUND (untrusted content)        OUTBOUND (agent replies)    │
//! │  ┌──────────────────────────┐      ┌──────────────────────────┐  │
//! │  │      ContentScanner      │      │      DataClassifier      │  │
//! │  │  1. deterministic rules  │      │  tier detection          │  │
//! │  │  2. secondary scanner    │      │  (public / internal /    │  │
//! │  │     (score in [20, 70))  │      │   confidential)          │  │
//! │  │  risk score 0-100        │      │  PII redaction           │  │
//! │  └────────────┬─────────────┘      └────────────┬─────────────┘  │
//! │               │                                 │                │
//! │  ┌────────────▼─────────────┐      ┌────────────▼─────────────┐  │
//! │  │    boundary wrapper      │      │       context gate       │  │
//! │  │  quarantine flag + tag   │      │  owner DM / group / ...  │  │
//! │  └──────────────────────────┘      └──────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Properties
//!
//! ### Content is never blocked
//! Scanning informs; it does not censor. Every scan returns the full
//! content wrapped in boundary markers, and the quarantine flag tells the
//! caller how much to trust it.
//!
//! ### Deterministic first, model second
//! The rule catalog runs on every scan and is the sole authority at the
//! extremes. A pluggable secondary scanner is consulted only for scores
//! inside the ambiguous band, and its verdict can raise the risk score
//! but never lower it.
//!
//! ### Fail-closed classification
//! Sensitivity resolution is monotone: metadata hints, content rules, and
//! PII detectors each only ever raise the tier, and PII always forces
//! CONFIDENTIAL.
//!
//! ## Modules
//!
//! - [`scanner`]: Two-stage inbound content scanning
//! - [`boundary`]: Trust boundary wrapping for external content
//! - [`classify`]: Outbound data classification, redaction, context gate
//! - [`report`]: Scan-and-report integration (scan, warn, record)
//! - [`events`]: Structured JSONL event log
//! - [`config`]: Configuration management
//! - [`error`]: Crate error type

pub mod boundary;
pub mod classify;
pub mod config;
pub mod error;
pub mod events;
pub mod report;
pub mod scanner;

pub use boundary::ContentSource;
pub use classify::{DataClassifier, DataTier, MessageContext};
pub use config::GuardConfig;
pub use error::{Error, Result};
pub use scanner::{ContentScanner, ScanOptions, ScanVerdict};
