//! ClawGuard error types

use thiserror::Error;

/// ClawGuard error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Detection rule compilation error
    #[error("Rule error: {0}")]
    Rule(String),

    /// Data classification error
    #[error("Classification error: {0}")]
    Classification(String),

    /// Secondary scanner error
    #[error("Escalation error: {0}")]
    Escalation(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for ClawGuard operations
pub type Result<T> = std::result::Result<T, Error>;
