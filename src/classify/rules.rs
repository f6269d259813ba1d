//! Classification and PII rule catalogs.
//!
//! Two immutable catalogs compiled once per classifier: content rules
//! that vote a tier with a weight, and PII detectors that force the
//! CONFIDENTIAL tier and carry a fixed replacement token for redaction.

use regex::{Regex, RegexBuilder};

use crate::classify::classifier::DataTier;
use crate::error::{Error, Result};

/// Weight contributed by any PII detector hit
pub(crate) const PII_WEIGHT: u32 = 25;

struct ClassificationDef {
    name: &'static str,
    pattern: &'static str,
    tier: DataTier,
    weight: u32,
}

/// Content rules voting a tier. All match case-insensitively.
static CLASSIFICATION_DEFS: &[ClassificationDef] = &[
    // Financial / deal rules
    ClassificationDef {
        name: "deal_value",
        pattern: r"\b(?:deal|contract|proposal|bid)\s+(?:is\s+)?(?:worth|valued?\s+at|for)\s+\$",
        tier: DataTier::Confidential,
        weight: 30,
    },
    ClassificationDef {
        name: "revenue",
        pattern: r"\b(?:revenue|earnings|profit|income|EBITDA|ARR|MRR)\s+(?:is|of|at|was)\s",
        tier: DataTier::Confidential,
        weight: 25,
    },
    ClassificationDef {
        name: "salary_comp",
        pattern: r"\b(?:salary|compensation|bonus|equity|vesting|stock\s+options?)\b",
        tier: DataTier::Confidential,
        weight: 30,
    },
    ClassificationDef {
        name: "bank_account",
        pattern: r"\b(?:bank\s+account|routing\s+number|account\s+number|IBAN|SWIFT)\b",
        tier: DataTier::Confidential,
        weight: 35,
    },
    ClassificationDef {
        name: "ssn_mention",
        pattern: r"\b(?:social\s+security|SSN|tax\s+ID|EIN)\b",
        tier: DataTier::Confidential,
        weight: 35,
    },
    // CRM / contact rules
    ClassificationDef {
        name: "crm_contact",
        pattern: r"\b(?:lead|prospect|pipeline|opportunity|deal\s+stage|close\s+date)\b",
        tier: DataTier::Confidential,
        weight: 20,
    },
    ClassificationDef {
        name: "personal_address",
        pattern: r"\b\d+\s+\w+\s+(?:Street|St|Avenue|Ave|Boulevard|Blvd|Road|Rd|Drive|Dr|Lane|Ln)\b",
        tier: DataTier::Confidential,
        weight: 20,
    },
    // Internal / strategic rules
    ClassificationDef {
        name: "strategy",
        pattern: r"\b(?:strategic\s+plan|roadmap|competitive\s+advantage|go-to-market|GTM)\b",
        tier: DataTier::Internal,
        weight: 15,
    },
    ClassificationDef {
        name: "internal_metric",
        pattern: r"\b(?:churn\s+rate|conversion\s+rate|CAC|LTV|burn\s+rate)\b",
        tier: DataTier::Internal,
        weight: 15,
    },
    ClassificationDef {
        name: "system_health",
        pattern: r"\b(?:error\s+rate|uptime|latency\s+p\d{2}|incident\s+report)\b",
        tier: DataTier::Internal,
        weight: 10,
    },
];

struct PiiDef {
    name: &'static str,
    pattern: &'static str,
    replacement: &'static str,
    case_insensitive: bool,
}

/// PII detectors in redaction order. Replacement tokens contain neither
/// digits nor currency symbols, so redaction is idempotent.
static PII_DEFS: &[PiiDef] = &[
    // US Social Security Numbers (XXX-XX-XXXX)
    PiiDef {
        name: "ssn",
        pattern: r"\b\d{3}-\d{2}-\d{4}\b",
        replacement: "[SSN-REDACTED]",
        case_insensitive: false,
    },
    // Credit card numbers: 13-19 digit runs, optionally separated.
    // Deliberately broad; long invoice or tracking numbers will also be
    // caught. Recall is preferred over precision here.
    PiiDef {
        name: "credit_card",
        pattern: r"\b(?:\d[ -]*?){13,19}\b",
        replacement: "[CC-REDACTED]",
        case_insensitive: false,
    },
    // US phone numbers
    PiiDef {
        name: "phone_us",
        pattern: r"\b(?:\+?1[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b",
        replacement: "[PHONE-REDACTED]",
        case_insensitive: false,
    },
    // International phone (+ country code, 8-15 digits)
    PiiDef {
        name: "phone_intl",
        pattern: r"\+\d{1,3}[-.\s]?\d{4,14}\b",
        replacement: "[PHONE-REDACTED]",
        case_insensitive: false,
    },
    // Personal email addresses on consumer providers; corporate domains
    // pass through untouched
    PiiDef {
        name: "personal_email",
        pattern: r"\b[a-zA-Z0-9._%+-]+@(?:gmail|yahoo|hotmail|outlook|aol|icloud|protonmail|fastmail|yandex|mail)\.\w{2,}\b",
        replacement: "[EMAIL-REDACTED]",
        case_insensitive: true,
    },
    // Dollar amounts ($X,XXX.XX or $X.XXM/K/B)
    PiiDef {
        name: "dollar_amount",
        pattern: r"\$\d{1,3}(?:,\d{3})*(?:\.\d{1,2})?(?:\s*[MKBmkb](?:illion)?)?",
        replacement: "[AMOUNT-REDACTED]",
        case_insensitive: false,
    },
    // Large numbers with currency context (e.g. "revenue of 2.3 million")
    PiiDef {
        name: "financial_figure",
        pattern: r"\b\d{1,3}(?:,\d{3})*(?:\.\d{1,2})?\s*(?:million|billion|thousand|[MKBmkb])\b",
        replacement: "[AMOUNT-REDACTED]",
        case_insensitive: true,
    },
];

/// A content rule with its compiled matcher
pub(crate) struct ClassificationRule {
    pub name: &'static str,
    pub tier: DataTier,
    pub weight: u32,
    regex: Regex,
}

impl ClassificationRule {
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// A PII detector with its compiled matcher and replacement token
pub(crate) struct PiiRule {
    pub name: &'static str,
    pub replacement: &'static str,
    regex: Regex,
}

impl PiiRule {
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    pub fn redact(&self, text: &str) -> String {
        self.regex.replace_all(text, self.replacement).into_owned()
    }
}

pub(crate) fn compile_classification_rules() -> Result<Vec<ClassificationRule>> {
    CLASSIFICATION_DEFS
        .iter()
        .map(|def| {
            let regex = RegexBuilder::new(def.pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| {
                    Error::Classification(format!("invalid rule `{}`: {}", def.name, e))
                })?;
            Ok(ClassificationRule {
                name: def.name,
                tier: def.tier,
                weight: def.weight,
                regex,
            })
        })
        .collect()
}

pub(crate) fn compile_pii_rules() -> Result<Vec<PiiRule>> {
    PII_DEFS
        .iter()
        .map(|def| {
            let regex = RegexBuilder::new(def.pattern)
                .case_insensitive(def.case_insensitive)
                .build()
                .map_err(|e| {
                    Error::Classification(format!("invalid PII rule `{}`: {}", def.name, e))
                })?;
            Ok(PiiRule {
                name: def.name,
                replacement: def.replacement,
                regex,
            })
        })
        .collect()
}
