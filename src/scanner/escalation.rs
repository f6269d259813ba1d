//! Ambiguous-score escalation to a pluggable secondary scanner.
//!
//! Deterministic scores inside the ambiguous band are forwarded to a
//! caller-supplied scanner, typically a frontier model running in a
//! sandboxed context. The secondary verdict is advisory: it can raise a
//! score but never lower one, and a failed or slow secondary scan leaves
//! the deterministic verdict standing with reduced confidence.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::scanner::rules::{Finding, FindingCategory, Severity};

/// Matcher id reserved for findings reported by the secondary scanner.
/// Never used by the deterministic catalog, so callers can tell advisory
/// findings apart from rule hits.
pub const SECONDARY_RULE_ID: &str = "secondary_scanner";

/// Fixed score boost applied when the secondary scanner says unsafe.
const UNSAFE_BOOST: u8 = 25;

/// Verdict returned by a secondary scanner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecondaryVerdict {
    /// Whether the scanner considers the content safe
    pub safe: bool,
    /// Scanner confidence 0-100
    pub confidence: u8,
    /// Textual findings from the scanner
    pub findings: Vec<String>,
}

/// Pluggable second-stage scanner.
///
/// The engine never constructs one itself; callers hand a concrete
/// implementation to [`ContentScanner::scan`](crate::scanner::ContentScanner::scan)
/// per call. Implementations must tolerate being handed arbitrary
/// untrusted text.
#[async_trait]
pub trait SecondaryScanner: Send + Sync {
    /// Assess untrusted content and return an advisory verdict
    async fn assess(&self, content: &str) -> Result<SecondaryVerdict>;
}

/// Run the secondary scanner under a deadline. Expiry is reported as an
/// [`Error::Escalation`] so the caller degrades exactly as it would for a
/// scanner-side failure.
pub(crate) async fn assess_with_timeout(
    scanner: &dyn SecondaryScanner,
    content: &str,
    limit: Duration,
) -> Result<SecondaryVerdict> {
    match tokio::time::timeout(limit, scanner.assess(content)).await {
        Ok(result) => result,
        Err(_) => Err(Error::Escalation(format!(
            "secondary scan timed out after {}s",
            limit.as_secs()
        ))),
    }
}

/// Combine a deterministic score with a secondary verdict.
///
/// An unsafe verdict adds a fixed boost (capped at 100); a safe verdict
/// changes nothing. Confidence is blended 40/60 between the deterministic
/// certainty and the scanner's own confidence.
pub(crate) fn combine(deterministic_score: u8, verdict: &SecondaryVerdict) -> (u8, u8) {
    let boost = if verdict.safe { 0 } else { UNSAFE_BOOST };
    let risk_score = deterministic_score.saturating_add(boost).min(100);

    let det = f64::from(deterministic_confidence(deterministic_score));
    let confidence = (det * 0.4 + f64::from(verdict.confidence) * 0.6).round() as u8;

    (risk_score, confidence)
}

/// Confidence in a purely deterministic verdict: high at either end of the
/// score range, low in the ambiguous middle.
pub(crate) fn deterministic_confidence(score: u8) -> u8 {
    if score >= 70 {
        95
    } else if score < 20 {
        90
    } else {
        55
    }
}

/// Fold the scanner's textual findings into the finding list as
/// medium-severity advisory entries.
pub(crate) fn advisory_findings(verdict: &SecondaryVerdict) -> Vec<Finding> {
    verdict
        .findings
        .iter()
        .map(|desc| Finding {
            category: FindingCategory::PromptInjection,
            severity: Severity::Medium,
            rule: SECONDARY_RULE_ID.to_string(),
            description: desc.clone(),
            weight: Severity::Medium.weight(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(safe: bool, confidence: u8) -> SecondaryVerdict {
        SecondaryVerdict {
            safe,
            confidence,
            findings: vec![],
        }
    }

    #[test]
    fn test_safe_verdict_never_raises_score() {
        let (score, _) = combine(45, &verdict(true, 90));
        assert_eq!(score, 45);
    }

    #[test]
    fn test_unsafe_verdict_boosts_by_25() {
        let (score, _) = combine(45, &verdict(false, 90));
        assert_eq!(score, 70);
    }

    #[test]
    fn test_boost_caps_at_100() {
        let (score, _) = combine(90, &verdict(false, 90));
        assert_eq!(score, 100);
    }

    #[test]
    fn test_confidence_blend() {
        // Escalation only runs in the ambiguous band, so det confidence is 55.
        // round(55 * 0.4 + 80 * 0.6) = round(22 + 48) = 70
        let (_, confidence) = combine(45, &verdict(false, 80));
        assert_eq!(confidence, 70);

        // round(22 + 54) = 76
        let (_, confidence) = combine(45, &verdict(true, 90));
        assert_eq!(confidence, 76);
    }

    #[test]
    fn test_deterministic_confidence_bands() {
        assert_eq!(deterministic_confidence(0), 90);
        assert_eq!(deterministic_confidence(19), 90);
        assert_eq!(deterministic_confidence(20), 55);
        assert_eq!(deterministic_confidence(69), 55);
        assert_eq!(deterministic_confidence(70), 95);
        assert_eq!(deterministic_confidence(100), 95);
    }

    #[test]
    fn test_advisory_findings_use_reserved_rule_id() {
        let v = SecondaryVerdict {
            safe: false,
            confidence: 75,
            findings: vec!["indirect instruction".to_string(), "odd framing".to_string()],
        };
        let findings = advisory_findings(&v);
        assert_eq!(findings.len(), 2);
        assert!(findings.iter().all(|f| f.rule == SECONDARY_RULE_ID));
        assert!(findings.iter().all(|f| f.severity == Severity::Medium));
        assert_eq!(findings[0].description, "indirect instruction");
    }

    struct SlowScanner;

    #[async_trait]
    impl SecondaryScanner for SlowScanner {
        async fn assess(&self, _content: &str) -> Result<SecondaryVerdict> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(verdict(true, 90))
        }
    }

    #[tokio::test]
    async fn test_timeout_reported_as_escalation_error() {
        let result = assess_with_timeout(&SlowScanner, "content", Duration::from_millis(5)).await;
        match result {
            Err(Error::Escalation(msg)) => assert!(msg.contains("timed out")),
            other => panic!("expected escalation error, got {:?}", other),
        }
    }
}
