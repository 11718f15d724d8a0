//! Core Effect Trait Definitions
//!
//! Pure trait definitions for every side effect the ledger performs. This
//! module defines **what** effects can be performed; handlers define **how**.
//!
//! # Effect Classification
//!
//! ## Infrastructure Effects (`tessera-effects`)
//! - **Entropy**, **Time**, **Events**
//!
//! ## Collaborator Effects (external systems)
//! - **Ownership**: the registry that tracks who holds fragment and fused units
//!
//! ## Testing Effects (`tessera-testkit`)
//! - Scripted entropy, simulated clock, hookable ownership registry
//!
//! All calls are synchronous. The ledger treats every call into a handler as a
//! potential re-entry point and holds its reentrancy guard across it.

pub mod entropy;
pub mod events;
pub mod ownership;
pub mod supertraits;
pub mod time;

pub use entropy::{EntropyEffects, EntropyError};
pub use events::EventEffects;
pub use ownership::{OwnershipEffects, OwnershipError};
pub use supertraits::LedgerEffects;
pub use time::{PhysicalTimeEffects, TimeError};
