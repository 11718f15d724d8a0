//! Composite effect traits
//!
//! Convenience supertrait naming everything a ledger needs. Blanket
//! implemented, so no handler ever implements it by hand.

use super::{EntropyEffects, EventEffects, OwnershipEffects, PhysicalTimeEffects};

/// Every effect the ledger performs.
pub trait LedgerEffects:
    EntropyEffects + OwnershipEffects + PhysicalTimeEffects + EventEffects
{
}

impl<T> LedgerEffects for T where
    T: EntropyEffects + OwnershipEffects + PhysicalTimeEffects + EventEffects
{
}
