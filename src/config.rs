//! ClawGuard configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Main ClawGuard configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Inbound scanner configuration
    #[serde(default)]
    pub scanner: ScannerConfig,

    /// Structured event log configuration
    #[serde(default)]
    pub events: EventLogConfig,
}

impl GuardConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("cannot parse {}: {}", path.display(), e)))
    }
}

/// Inbound scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Risk score at or above which content is quarantined
    #[serde(default = "default_quarantine_threshold")]
    pub quarantine_threshold: u8,

    /// Escalation gate configuration
    #[serde(default)]
    pub escalation: EscalationConfig,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            quarantine_threshold: default_quarantine_threshold(),
            escalation: EscalationConfig::default(),
        }
    }
}

/// Escalation gate configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationConfig {
    /// Lower bound (inclusive) of the ambiguous score band
    #[serde(default = "default_band_low")]
    pub band_low: u8,

    /// Upper bound (exclusive) of the ambiguous score band
    #[serde(default = "default_band_high")]
    pub band_high: u8,

    /// Deadline in seconds for a single secondary scan
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl EscalationConfig {
    /// Deadline as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            band_low: default_band_low(),
            band_high: default_band_high(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Event log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogConfig {
    /// Base directory for JSONL event files
    #[serde(default = "default_events_dir")]
    pub base_dir: PathBuf,

    /// Disable to drop events instead of writing them
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for EventLogConfig {
    fn default() -> Self {
        Self {
            base_dir: default_events_dir(),
            enabled: true,
        }
    }
}

/// Default events directory (~/.clawguard/events/)
pub fn default_events_dir() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".clawguard")
        .join("events")
}

fn default_quarantine_threshold() -> u8 {
    70
}

fn default_band_low() -> u8 {
    20
}

fn default_band_high() -> u8 {
    70
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GuardConfig::default();
        assert_eq!(config.scanner.quarantine_threshold, 70);
        assert_eq!(config.scanner.escalation.band_low, 20);
        assert_eq!(config.scanner.escalation.band_high, 70);
        assert_eq!(config.scanner.escalation.timeout_secs, 10);
        assert!(config.events.enabled);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: GuardConfig = toml::from_str(
            r#"
            [scanner]
            quarantine_threshold = 50
            "#,
        )
        .unwrap();
        assert_eq!(config.scanner.quarantine_threshold, 50);
        assert_eq!(config.scanner.escalation.band_high, 70);
        assert!(config.events.enabled);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = GuardConfig::default();
        let raw = toml::to_string_pretty(&config).unwrap();
        let parsed: GuardConfig = toml::from_str(&raw).unwrap();
        assert_eq!(
            parsed.scanner.quarantine_threshold,
            config.scanner.quarantine_threshold
        );
        assert_eq!(parsed.events.base_dir, config.events.base_dir);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("clawguard.toml");
        std::fs::write(
            &path,
            "[scanner.escalation]\nband_low = 10\ntimeout_secs = 3\n",
        )
        .unwrap();

        let config = GuardConfig::load(&path).unwrap();
        assert_eq!(config.scanner.escalation.band_low, 10);
        assert_eq!(config.scanner.escalation.band_high, 70);
        assert_eq!(config.scanner.escalation.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_load_missing_file() {
        let err = GuardConfig::load(Path::new("/nonexistent/clawguard.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
