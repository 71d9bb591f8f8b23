//! Error types for configuration loading.

use moneypool_rs_engine::EngineError;
use thiserror::Error;

/// Errors that can occur when reading or converting configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration JSON is malformed.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// Configuration file could not be read.
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// A decimal value cannot be represented at the target scale.
    #[error("Invalid decimal for {field}: {value} ({reason})")]
    InvalidDecimal {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    /// No reserve with this name is configured.
    #[error("Unknown reserve: {0}")]
    UnknownReserve(String),

    /// Converted values were rejected by the engine.
    #[error("Engine rejected configuration: {0}")]
    Engine(#[from] EngineError),
}

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
