//! Read-only queries
//!
//! None of these take the reentrancy lock, so effect handlers may call them
//! from inside a mutating operation. They observe the last committed state.

use crate::error::{LedgerError, Result};
use crate::ledger::Ledger;
use crate::state::{FragmentUnit, FusionRecord, ItemPhase, ItemSet, RetirementFact};
use serde::{Deserialize, Serialize};
use tessera_core::effects::LedgerEffects;
use tessera_core::{ItemId, PrincipalId, UnitId};

/// Summary of one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemView {
    pub item: ItemId,
    pub minted: u8,
    pub slots_remaining: u8,
    /// Issued units in slot order
    pub units: Vec<UnitId>,
    pub phase: ItemPhase,
    pub circulation_index: Option<usize>,
}

impl ItemView {
    fn of(set: &ItemSet) -> Self {
        Self {
            item: set.item(),
            minted: set.minted_slot_count(),
            slots_remaining: set.slots_remaining(),
            units: set.unit_ids(),
            phase: set.phase(),
            circulation_index: set.circulation_index(),
        }
    }
}

impl<E: LedgerEffects> Ledger<E> {
    /// Items still accepting fragments, in circulation order
    pub fn circulation(&self) -> Vec<ItemId> {
        self.read_state().circulation().as_slice().to_vec()
    }

    /// Every configured item id, ascending
    pub fn item_ids(&self) -> Vec<ItemId> {
        self.read_state().items().map(ItemSet::item).collect()
    }

    pub fn slots_remaining(&self, item: ItemId) -> Result<u8> {
        self.with_item(item, ItemSet::slots_remaining)
    }

    /// Units issued for `item` in slot order
    pub fn units_of(&self, item: ItemId) -> Result<Vec<UnitId>> {
        self.with_item(item, ItemSet::unit_ids)
    }

    /// Item and slot of an issued unit
    pub fn unit(&self, unit: UnitId) -> Option<FragmentUnit> {
        self.read_state().unit(unit).copied()
    }

    pub fn item(&self, item: ItemId) -> Result<ItemView> {
        self.with_item(item, ItemView::of)
    }

    /// Retirement fact for `item`, if it was retired
    pub fn retirement(&self, item: ItemId) -> Result<Option<RetirementFact>> {
        self.with_item(item, |set| set.retirement().copied())
    }

    /// Whether `caller` retired `item`
    pub fn has_retired(&self, item: ItemId, caller: PrincipalId) -> bool {
        self.read_state().has_retired(item, caller)
    }

    /// Fusion record for `item`; fails if the item was never transformed
    pub fn transformation(&self, item: ItemId) -> Result<FusionRecord> {
        let state = self.read_state();
        if state.item(item).is_none() {
            return Err(LedgerError::UnknownItem { item });
        }
        state
            .fusion(item)
            .copied()
            .ok_or(LedgerError::NotTransformed { item })
    }

    /// Fusion record for `item`, or `None` for unknown or untransformed items
    pub fn find_transformation(&self, item: ItemId) -> Option<FusionRecord> {
        self.read_state().fusion(item).copied()
    }

    /// Fragment units issued so far
    pub fn total_issued(&self) -> u64 {
        self.read_state().last_unit().value()
    }

    fn with_item<T>(&self, item: ItemId, f: impl FnOnce(&ItemSet) -> T) -> Result<T> {
        self.read_state()
            .item(item)
            .map(f)
            .ok_or(LedgerError::UnknownItem { item })
    }
}
