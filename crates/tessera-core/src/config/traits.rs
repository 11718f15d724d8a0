//! Core configuration traits

use crate::TesseraError;

/// Trait for configuration validation
pub trait ConfigValidation {
    /// Validate this configuration
    fn validate(&self) -> Result<(), TesseraError>;
}
