//! Two-stage scanner for untrusted content.
//!
//! Stage 1 is the deterministic rule catalog: fast, reproducible, and
//! total over arbitrary input. Stage 2 is a pluggable secondary scanner
//! invoked only when the deterministic score lands in the ambiguous band.
//! Content is never blocked outright: every scan returns the text wrapped
//! in security boundary markers together with a quarantine flag the
//! caller enforces.

pub mod escalation;
pub mod rules;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::boundary::{wrap_external_content, ContentSource};
use crate::config::ScannerConfig;
use crate::error::{Error, Result};

pub use escalation::{SecondaryScanner, SecondaryVerdict, SECONDARY_RULE_ID};
pub use rules::{Finding, FindingCategory, Severity};

/// Options for a single scan
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Source recorded in the boundary markers
    pub source: ContentSource,

    /// Sender identity (email address, webhook origin, ...)
    pub sender: Option<String>,

    /// Subject line if applicable
    pub subject: Option<String>,

    /// Per-call quarantine threshold override
    pub quarantine_threshold: Option<u8>,

    /// Per-call ambiguous band override (low inclusive, high exclusive)
    pub escalation_band: Option<(u8, u8)>,
}

impl ScanOptions {
    pub fn new(source: ContentSource) -> Self {
        Self {
            source,
            sender: None,
            subject: None,
            quarantine_threshold: None,
            escalation_band: None,
        }
    }
}

/// Outcome of scanning one piece of content
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanVerdict {
    /// Overall safety determination
    pub safe: bool,

    /// Composite risk score 0-100
    pub risk_score: u8,

    /// Confidence in the assessment 0-100
    pub confidence: u8,

    /// Individual findings from both stages
    pub findings: Vec<Finding>,

    /// Whether the score reached the quarantine threshold
    pub quarantined: bool,

    /// Content wrapped with boundary markers; the only form handed onward
    pub sanitized_content: String,

    /// Whether the escalation gate decided to escalate
    pub escalated: bool,

    /// Secondary verdict when an escalated scan succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalation: Option<SecondaryVerdict>,
}

/// Result of the deterministic and (optional) escalated stages, before
/// quarantine gating and wrapping.
struct ScanState {
    findings: Vec<Finding>,
    risk_score: u8,
    confidence: u8,
    escalated: bool,
    secondary: Option<SecondaryVerdict>,
}

/// Scanner over the compiled rule catalog.
///
/// Construction compiles every rule once; scanning itself is pure and
/// callable concurrently from any number of threads.
pub struct ContentScanner {
    rules: Vec<rules::CompiledRule>,
    encoded_runs: Regex,
    config: ScannerConfig,
}

impl ContentScanner {
    /// Build a scanner with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ScannerConfig::default())
    }

    /// Build a scanner with explicit configuration
    pub fn with_config(config: ScannerConfig) -> Result<Self> {
        if config.escalation.band_low >= config.escalation.band_high {
            return Err(Error::Config(format!(
                "escalation band is empty: [{}, {})",
                config.escalation.band_low, config.escalation.band_high
            )));
        }
        Ok(Self {
            rules: rules::compile_rules()?,
            encoded_runs: rules::encoded_run_regex()?,
            config,
        })
    }

    /// Deterministic-only scan, usable from synchronous call sites.
    /// Equivalent to [`scan`](Self::scan) with no secondary scanner.
    pub fn scan_sync(&self, content: &str, options: &ScanOptions) -> ScanVerdict {
        let (findings, risk_score) = self.deterministic(content);
        let confidence = escalation::deterministic_confidence(risk_score);
        self.finalize(
            content,
            options,
            ScanState {
                findings,
                risk_score,
                confidence,
                escalated: false,
                secondary: None,
            },
        )
    }

    /// Full two-stage scan.
    ///
    /// The deterministic stage always runs. The secondary scanner runs
    /// only when one is supplied and the deterministic score falls inside
    /// the ambiguous band; its verdict can raise the score but never
    /// lower it. A secondary failure or timeout keeps the deterministic
    /// verdict and lowers confidence by 20 (floored at 30).
    pub async fn scan(
        &self,
        content: &str,
        options: &ScanOptions,
        secondary: Option<&dyn SecondaryScanner>,
    ) -> ScanVerdict {
        let (mut findings, deterministic_score) = self.deterministic(content);
        let mut risk_score = deterministic_score;
        let mut confidence = escalation::deterministic_confidence(deterministic_score);
        let mut escalated = false;
        let mut secondary_verdict = None;

        let (band_low, band_high) = options.escalation_band.unwrap_or((
            self.config.escalation.band_low,
            self.config.escalation.band_high,
        ));

        if let Some(scanner) = secondary {
            if deterministic_score >= band_low && deterministic_score < band_high {
                escalated = true;
                let deadline = self.config.escalation.timeout();
                match escalation::assess_with_timeout(scanner, content, deadline).await {
                    Ok(verdict) => {
                        let (combined_score, combined_confidence) =
                            escalation::combine(deterministic_score, &verdict);
                        risk_score = combined_score;
                        confidence = combined_confidence;
                        findings.extend(escalation::advisory_findings(&verdict));
                        secondary_verdict = Some(verdict);
                    }
                    Err(e) => {
                        tracing::debug!(
                            error = %e,
                            "secondary scan unavailable, keeping deterministic verdict"
                        );
                        confidence = confidence.saturating_sub(20).max(30);
                    }
                }
            }
        }

        self.finalize(
            content,
            options,
            ScanState {
                findings,
                risk_score,
                confidence,
                escalated,
                secondary: secondary_verdict,
            },
        )
    }

    /// Evaluate the rule catalog and compute the composite score.
    ///
    /// sqrt scaling gives diminishing returns for stacked findings:
    /// one critical (weight 20) scores 67, two score 95, three saturate
    /// at 100.
    fn deterministic(&self, content: &str) -> (Vec<Finding>, u8) {
        let findings = rules::evaluate(&self.encoded_runs, &self.rules, content);
        let raw: u32 = findings.iter().map(|f| f.weight).sum();
        let risk_score = (f64::from(raw).sqrt() * 15.0).round().min(100.0) as u8;
        (findings, risk_score)
    }

    fn finalize(&self, content: &str, options: &ScanOptions, state: ScanState) -> ScanVerdict {
        let threshold = options
            .quarantine_threshold
            .unwrap_or(self.config.quarantine_threshold);
        let quarantined = state.risk_score >= threshold;

        let sanitized_content = wrap_external_content(
            content,
            options.source,
            options.sender.as_deref(),
            options.subject.as_deref(),
        );

        ScanVerdict {
            safe: !quarantined,
            risk_score: state.risk_score,
            confidence: state.confidence,
            findings: state.findings,
            quarantined,
            sanitized_content,
            escalated: state.escalated,
            escalation: state.secondary,
        }
    }
}
