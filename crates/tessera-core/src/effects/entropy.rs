//! Entropy effect interface
//!
//! # Effect Classification
//!
//! - **Category**: Infrastructure Effect
//! - **Implementation**: `tessera-effects` (weak hash-based and OS-backed)
//! - **Usage**: fragment issuance picks an item from circulation with one draw
//!
//! The ledger does not assume cryptographic unpredictability from this
//! interface. The default handler is deterministic and suitable only for
//! non-adversarial deployments; a stronger provider can be injected without
//! touching the issuance control flow.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Error type for entropy draws.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum EntropyError {
    #[error("Exclusive upper bound must be positive")]
    ZeroBound,
    #[error("Entropy source unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Source of pseudo-random indices.
pub trait EntropyEffects: Send + Sync {
    /// Return an index in `0..exclusive_upper_bound`.
    ///
    /// `salt` is a caller-provided, freshly advancing value that ties the draw
    /// to the current ledger step.
    fn draw(&self, exclusive_upper_bound: u64, salt: u64) -> Result<u64, EntropyError>;
}

impl<T: EntropyEffects + ?Sized> EntropyEffects for Arc<T> {
    fn draw(&self, exclusive_upper_bound: u64, salt: u64) -> Result<u64, EntropyError> {
        (**self).draw(exclusive_upper_bound, salt)
    }
}
