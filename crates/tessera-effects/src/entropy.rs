//! Entropy effect handlers
//!
//! Note: [`OsEntropyHandler`] legitimately uses `rand::thread_rng()`; this is
//! the handler layer where system randomness enters the ledger.

// Allow disallowed methods in effect handler implementations
#![allow(clippy::disallowed_methods)]

use rand::Rng;
use tessera_core::config::{EntropyConfig, EntropyMode};
use tessera_core::effects::{EntropyEffects, EntropyError};
use tessera_core::TesseraError;

const WEAK_DOMAIN: &[u8] = b"tessera-weak-entropy-v1";

/// Deterministic entropy from a keyed hash of the seed, bound and salt.
///
/// Anyone who knows the seed and the ledger's unit counter can predict every
/// draw, and the reduction modulo `bound` carries a small bias. Suitable for
/// simulations and non-adversarial deployments only.
#[derive(Debug, Clone)]
pub struct WeakEntropyHandler {
    seed: [u8; 32],
}

impl Default for WeakEntropyHandler {
    fn default() -> Self {
        Self::new([0u8; 32])
    }
}

impl WeakEntropyHandler {
    /// Create a handler keyed by `seed`
    pub fn new(seed: [u8; 32]) -> Self {
        Self { seed }
    }
}

impl EntropyEffects for WeakEntropyHandler {
    fn draw(&self, exclusive_upper_bound: u64, salt: u64) -> Result<u64, EntropyError> {
        if exclusive_upper_bound == 0 {
            return Err(EntropyError::ZeroBound);
        }
        let mut hasher = blake3::Hasher::new_keyed(&self.seed);
        hasher.update(WEAK_DOMAIN);
        hasher.update(&exclusive_upper_bound.to_le_bytes());
        hasher.update(&salt.to_le_bytes());
        let digest = hasher.finalize();

        let mut word = [0u8; 8];
        word.copy_from_slice(&digest.as_bytes()[..8]);
        Ok(u64::from_le_bytes(word) % exclusive_upper_bound)
    }
}

/// Operating system randomness. The salt is ignored.
#[derive(Debug, Clone, Default)]
pub struct OsEntropyHandler;

impl OsEntropyHandler {
    /// Create a new OS entropy handler
    pub fn new() -> Self {
        Self
    }
}

impl EntropyEffects for OsEntropyHandler {
    fn draw(&self, exclusive_upper_bound: u64, _salt: u64) -> Result<u64, EntropyError> {
        if exclusive_upper_bound == 0 {
            return Err(EntropyError::ZeroBound);
        }
        Ok(rand::thread_rng().gen_range(0..exclusive_upper_bound))
    }
}

/// Entropy handler chosen by [`EntropyConfig`]
#[derive(Debug, Clone)]
pub enum ConfiguredEntropy {
    Weak(WeakEntropyHandler),
    Os(OsEntropyHandler),
}

impl ConfiguredEntropy {
    /// Build the handler a configuration asks for
    pub fn from_config(config: &EntropyConfig) -> Result<Self, TesseraError> {
        match config.mode {
            EntropyMode::Weak => {
                let seed = config.seed_bytes()?.unwrap_or([0u8; 32]);
                Ok(Self::Weak(WeakEntropyHandler::new(seed)))
            }
            EntropyMode::Os => Ok(Self::Os(OsEntropyHandler::new())),
        }
    }
}

impl EntropyEffects for ConfiguredEntropy {
    fn draw(&self, exclusive_upper_bound: u64, salt: u64) -> Result<u64, EntropyError> {
        match self {
            Self::Weak(handler) => handler.draw(exclusive_upper_bound, salt),
            Self::Os(handler) => handler.draw(exclusive_upper_bound, salt),
        }
    }
}
