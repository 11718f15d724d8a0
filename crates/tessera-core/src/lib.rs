//! Tessera Core - Fragment Ledger Foundation
//!
//! This crate provides the identifier types, error vocabulary and effect
//! interfaces shared by every Tessera crate. It contains no ledger logic and no
//! handler implementations.
//!
//! # Architecture Layers
//!
//! ## Identifiers
//! - `ItemId`: a composite item made of four fragments
//! - `UnitId`: one issued fragment unit (global counter, never reused)
//! - `FusionId`: one derived unit minted from a retired item
//! - `PrincipalId`: an account known to the ownership registry
//!
//! ## Effect Interfaces (Pure Signatures)
//! - `EntropyEffects`: `draw(bound, salt)`
//! - `OwnershipEffects`: `owner_of`, `mint_to`, `destroy`
//! - `PhysicalTimeEffects`: wall-clock timestamps for facts and events
//! - `EventEffects`: delivery of ledger events to indexers
//!
//! Handlers live in `tessera-effects` (production) and `tessera-testkit`
//! (deterministic mocks).

#![allow(missing_docs)]
#![forbid(unsafe_code)]

/// Identifier types
pub mod identifiers;

/// Unified infrastructure error
pub mod errors;

/// Pure effect interfaces (no implementations)
pub mod effects;

/// Observable ledger events
pub mod events;

/// Physical time value type
pub mod time;

/// Configuration loading and validation
pub mod config;

// === Public API Re-exports ===

pub use config::{ConfigValidation, EntropyConfig, EntropyMode, LedgerConfig};
pub use effects::{
    EntropyEffects, EntropyError, EventEffects, LedgerEffects, OwnershipEffects, OwnershipError,
    PhysicalTimeEffects, TimeError,
};
pub use errors::{Result as TesseraResult, TesseraError};
pub use events::LedgerEvent;
pub use identifiers::{AssetId, FusionId, ItemId, PrincipalId, Slot, UnitId, FRAGMENTS_PER_ITEM};
pub use time::PhysicalTime;
