//! Retirement and eligibility
//!
//! `verify` is the authorization boundary for retirement and checks, in
//! order: the item has fragments, all four slots are issued, the caller owns
//! every unit. `retire` adds a per-caller replay check in front of it, then
//! destroys the four units and records who retired the item.
//!
//! A second retirement of the same item is refused twice over: the same
//! caller hits the replay check, anyone else fails the ownership lookup on a
//! destroyed unit.

use crate::error::{LedgerError, Result};
use crate::guard::Operation;
use crate::ledger::Ledger;
use crate::state::{RetirementFact, SLOTS};
use tessera_core::effects::LedgerEffects;
use tessera_core::{AssetId, ItemId, LedgerEvent, PrincipalId, Slot, UnitId};
use tracing::debug;

impl<E: LedgerEffects> Ledger<E> {
    /// Check that `caller` may retire `item`. Read-only.
    pub fn verify(&self, item: ItemId, caller: PrincipalId) -> Result<()> {
        self.verify_set(item, caller).map(|_| ())
    }

    /// Destroy the complete set `item` held by `caller` and record the
    /// retirement fact that makes `caller` eligible to transform it.
    pub fn retire(&self, item: ItemId, caller: PrincipalId) -> Result<RetirementFact> {
        let _guard = self.lock.acquire(Operation::Retire)?;

        if self.read_state().has_retired(item, caller) {
            return Err(LedgerError::AlreadyRetired { item, caller });
        }

        let units = self.verify_set(item, caller)?;

        let existing = self
            .read_state()
            .item(item)
            .and_then(|set| set.retirement().copied());
        if let Some(existing) = existing {
            return Err(LedgerError::invariant(format!(
                "{item} passed verification after being retired by {}",
                existing.retired_by
            )));
        }

        let at = self.effects.physical_time()?;
        let assets = units.map(AssetId::Fragment);
        self.effects.destroy_all(&assets)?;

        let fact = self
            .write_state()
            .apply_retirement(item, caller, at, &units)?;

        self.effects.emit(LedgerEvent::SetRetired { caller, item });
        Ok(fact)
    }

    /// Run the ordered checks and return the item's four units
    fn verify_set(&self, item: ItemId, caller: PrincipalId) -> Result<[UnitId; SLOTS]> {
        let units = {
            let state = self.read_state();
            let record = state
                .item(item)
                .filter(|set| set.minted_slot_count() > 0)
                .ok_or(LedgerError::NonexistentItem { item })?;
            record.complete_units().ok_or(LedgerError::IncompleteSet {
                item,
                minted: record.minted_slot_count(),
            })?
        };

        // Ownership lookups run without the state lock: the registry may call
        // back into the ledger.
        for (slot, unit) in Slot::all().zip(units) {
            let owner = self.effects.owner_of(AssetId::Fragment(unit))?;
            if owner != caller {
                debug!(%item, %caller, %owner, %slot, "verification failed on ownership");
                return Err(LedgerError::NotOwnerOfAll {
                    item,
                    caller,
                    slot,
                    unit,
                });
            }
        }
        Ok(units)
    }
}
