//! Infrastructure error type
//!
//! Covers configuration loading and parsing only. Ledger operations carry
//! their own typed vocabulary in `tessera-ledger`.

use serde::{Deserialize, Serialize};

/// Failure while loading or validating ledger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum TesseraError {
    /// Configuration is unreadable or rejected by validation
    #[error("Config error: {message}")]
    Config { message: String },

    /// JSON input could not be decoded
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl TesseraError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TesseraError>;

impl From<serde_json::Error> for TesseraError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<toml::de::Error> for TesseraError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(err.to_string())
    }
}
