//! Three-tier data classification.
//!
//! CONFIDENTIAL data belongs in owner DMs only (financials, CRM contacts,
//! deal values, PII). INTERNAL data may reach trusted group contexts
//! (strategic notes, metrics, system health). PUBLIC data is
//! unrestricted. Classification is monotone: metadata hints, content
//! rules, and PII detectors each only ever raise the tier.

use serde::{Deserialize, Serialize};

use crate::classify::context::MessageContext;
use crate::classify::rules::{
    compile_classification_rules, compile_pii_rules, ClassificationRule, PiiRule, PII_WEIGHT,
};
use crate::error::Result;

/// Sensitivity tier, ordered from least to most restricted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataTier {
    /// No restrictions
    Public,
    /// Trusted group contexts OK: strategic notes, tool outputs, metrics
    Internal,
    /// Owner DMs only: financials, CRM contacts, deal values, PII
    Confidential,
}

impl std::fmt::Display for DataTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DataTier::Public => "public",
            DataTier::Internal => "internal",
            DataTier::Confidential => "confidential",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for DataTier {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "public" => Ok(DataTier::Public),
            "internal" => Ok(DataTier::Internal),
            "confidential" => Ok(DataTier::Confidential),
            _ => Err(format!("unknown data tier: {}", s)),
        }
    }
}

/// Upstream category hint attached to content by its producer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataHint {
    Crm,
    Financial,
    Email,
    Health,
    Config,
    ToolOutput,
    General,
}

impl DataHint {
    /// Tier vote and weight this hint contributes, if any
    fn tier_weight(self) -> Option<(DataTier, u32)> {
        match self {
            DataHint::Crm | DataHint::Financial => Some((DataTier::Confidential, 20)),
            DataHint::Email => Some((DataTier::Confidential, 15)),
            DataHint::Health | DataHint::Config => Some((DataTier::Internal, 10)),
            DataHint::ToolOutput | DataHint::General => None,
        }
    }

    /// Parse a hint from free-form metadata. Unrecognized values mean
    /// "no hint", never an error.
    pub fn from_metadata(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

impl std::fmt::Display for DataHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DataHint::Crm => "crm",
            DataHint::Financial => "financial",
            DataHint::Email => "email",
            DataHint::Health => "health",
            DataHint::Config => "config",
            DataHint::ToolOutput => "tool_output",
            DataHint::General => "general",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for DataHint {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "crm" => Ok(DataHint::Crm),
            "financial" => Ok(DataHint::Financial),
            "email" => Ok(DataHint::Email),
            "health" => Ok(DataHint::Health),
            "config" => Ok(DataHint::Config),
            "tool_output" => Ok(DataHint::ToolOutput),
            "general" => Ok(DataHint::General),
            _ => Err(format!("unknown data hint: {}", s)),
        }
    }
}

/// Outcome of classifying one piece of content
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    /// Determined data tier
    pub tier: DataTier,
    /// Which hints, rules, and PII detectors fired, in resolution order
    pub detected_patterns: Vec<String>,
    /// Confidence 0-100
    pub confidence: u8,
}

/// Classifier over the compiled rule catalogs.
///
/// Construction compiles every rule once; classification and redaction
/// are pure and callable concurrently.
pub struct DataClassifier {
    rules: Vec<ClassificationRule>,
    pii: Vec<PiiRule>,
}

impl DataClassifier {
    pub fn new() -> Result<Self> {
        Ok(Self {
            rules: compile_classification_rules()?,
            pii: compile_pii_rules()?,
        })
    }

    /// Classify content into a data tier.
    ///
    /// Resolution order: metadata hint, then content rules, then PII
    /// detectors (which always force CONFIDENTIAL). Each step can only
    /// raise the tier.
    pub fn classify(&self, content: &str, hint: Option<DataHint>) -> ClassificationResult {
        let mut detected = Vec::new();
        let mut tier = DataTier::Public;
        let mut total_weight: u32 = 0;

        if let Some(hint) = hint {
            if let Some((hint_tier, weight)) = hint.tier_weight() {
                tier = tier.max(hint_tier);
                total_weight += weight;
                detected.push(format!("metadata:{}", hint));
            }
        }

        for rule in &self.rules {
            if rule.is_match(content) {
                detected.push(rule.name.to_string());
                total_weight += rule.weight;
                tier = tier.max(rule.tier);
            }
        }

        for pii in &self.pii {
            if pii.is_match(content) {
                detected.push(format!("pii:{}", pii.name));
                total_weight += PII_WEIGHT;
                tier = DataTier::Confidential;
            }
        }

        let confidence = (f64::from(total_weight) * 1.5).round().min(100.0) as u8;

        ClassificationResult {
            tier,
            detected_patterns: detected,
            confidence,
        }
    }

    /// Replace every PII match with its fixed token. Idempotent, and
    /// targets identifiers rather than topics: a strategy discussion with
    /// no numbers or addresses in it passes through unchanged.
    pub fn redact_pii(&self, text: &str) -> String {
        let mut result = text.to_string();
        for pii in &self.pii {
            result = pii.redact(&result);
        }
        result
    }

    /// Gate a message against a context: allowed tiers pass through
    /// verbatim, denied tiers are redacted.
    pub fn filter_for_context(
        &self,
        message: &str,
        context: MessageContext,
        hint: Option<DataHint>,
    ) -> String {
        let classification = self.classify(message, hint);

        if context.allows(classification.tier) {
            return message.to_string();
        }

        tracing::debug!(
            tier = %classification.tier,
            context = %context,
            patterns = classification.detected_patterns.len(),
            "redacting message for context"
        );
        self.redact_pii(message)
    }
}
