//! Ledger state store
//!
//! `LedgerState` is the single-writer store behind a [`crate::Ledger`]: every
//! counter, the circulation registry and the per-item facts live here and are
//! only touched by the `apply_*` methods once an operation has finished all of
//! its checks and collaborator calls. `plan_*` methods are read-only.

use crate::circulation::CirculationRegistry;
use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tessera_core::{
    FusionId, ItemId, PhysicalTime, PrincipalId, Slot, UnitId, FRAGMENTS_PER_ITEM,
};
use tracing::{debug, info};

/// Number of slots as an array length
pub const SLOTS: usize = FRAGMENTS_PER_ITEM as usize;

/// One issued fragment unit. Immutable apart from the destroyed flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentUnit {
    pub unit: UnitId,
    pub item: ItemId,
    pub slot: Slot,
    /// Set when the unit was destroyed by retirement
    pub destroyed: bool,
}

/// Proof that a complete set was destroyed by `retired_by`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetirementFact {
    pub item: ItemId,
    pub retired_by: PrincipalId,
    pub retired_at: PhysicalTime,
}

/// A derived unit minted from a retired item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FusionRecord {
    pub fusion: FusionId,
    pub source_item: ItemId,
    pub created_by: PrincipalId,
    pub created_at: PhysicalTime,
}

/// Lifecycle position of an item. Moves forward only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum ItemPhase {
    /// Fewer than four fragments issued; still in circulation
    Incomplete { minted: u8 },
    /// All fragments issued; out of circulation, not retired
    Complete,
    /// Fragments destroyed; eligible for transformation by the retiree
    Retired { by: PrincipalId },
    /// Derived unit minted
    Transformed { fusion: FusionId },
}

/// Per-item bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSet {
    item: ItemId,
    minted: u8,
    slots: [Option<UnitId>; SLOTS],
    circulation_index: Option<usize>,
    retirement: Option<RetirementFact>,
    fusion: Option<FusionId>,
}

impl ItemSet {
    fn new(item: ItemId) -> Self {
        Self {
            item,
            minted: 0,
            slots: [None; SLOTS],
            circulation_index: None,
            retirement: None,
            fusion: None,
        }
    }

    pub fn item(&self) -> ItemId {
        self.item
    }

    /// Fragments issued so far, `0..=4`
    pub fn minted_slot_count(&self) -> u8 {
        self.minted
    }

    pub fn slots_remaining(&self) -> u8 {
        FRAGMENTS_PER_ITEM - self.minted
    }

    pub fn is_complete(&self) -> bool {
        self.minted == FRAGMENTS_PER_ITEM
    }

    /// Slot the next issued fragment will occupy
    pub fn next_slot(&self) -> Option<Slot> {
        Slot::new(self.minted + 1)
    }

    /// Unit issued into `slot`
    pub fn unit_at(&self, slot: Slot) -> Option<UnitId> {
        self.slots[slot.index()]
    }

    /// Issued units in slot order
    pub fn unit_ids(&self) -> Vec<UnitId> {
        self.slots.iter().flatten().copied().collect()
    }

    /// All four units, or `None` while incomplete
    pub fn complete_units(&self) -> Option<[UnitId; SLOTS]> {
        let mut units = [UnitId::new(0); SLOTS];
        for (out, slot) in units.iter_mut().zip(self.slots.iter()) {
            *out = (*slot)?;
        }
        Some(units)
    }

    /// Circulation position recorded at the first fragment, kept current
    /// across swaps, cleared once the item leaves circulation
    pub fn circulation_index(&self) -> Option<usize> {
        self.circulation_index
    }

    pub fn retirement(&self) -> Option<&RetirementFact> {
        self.retirement.as_ref()
    }

    pub fn fusion(&self) -> Option<FusionId> {
        self.fusion
    }

    pub fn phase(&self) -> ItemPhase {
        match (&self.fusion, &self.retirement) {
            (Some(fusion), _) => ItemPhase::Transformed { fusion: *fusion },
            (None, Some(fact)) => ItemPhase::Retired { by: fact.retired_by },
            (None, None) if self.is_complete() => ItemPhase::Complete,
            (None, None) => ItemPhase::Incomplete {
                minted: self.minted,
            },
        }
    }
}

/// Running fusion supply against a fixed cap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FusionSupply {
    /// Maximum derived units this ledger may ever mint
    pub cap: u64,
    /// Derived units minted so far
    pub minted: u64,
}

impl FusionSupply {
    pub fn new(cap: u64) -> Self {
        Self { cap, minted: 0 }
    }

    /// Remaining headroom before the cap
    pub fn remaining(&self) -> u64 {
        self.cap.saturating_sub(self.minted)
    }

    pub fn can_mint(&self) -> bool {
        self.minted < self.cap
    }

    /// Id the next derived unit will receive
    pub fn next_id(&self) -> FusionId {
        FusionId::new(self.minted).next()
    }

    /// Record a mint if the cap allows it
    pub fn record_mint(&mut self) -> Option<FusionId> {
        if !self.can_mint() {
            return None;
        }
        let id = self.next_id();
        self.minted += 1;
        Some(id)
    }
}

/// Everything `issue` decided before touching collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IssuePlan {
    pub caller: PrincipalId,
    pub item: ItemId,
    pub slot: Slot,
    pub unit: UnitId,
    /// Circulation position of `item` at planning time
    pub position: usize,
    pub first_fragment: bool,
    pub completes_item: bool,
}

/// The ledger's single-writer store
#[derive(Debug, Clone)]
pub struct LedgerState {
    items: BTreeMap<ItemId, ItemSet>,
    circulation: CirculationRegistry,
    units: BTreeMap<UnitId, FragmentUnit>,
    last_unit: UnitId,
    supply: FusionSupply,
    fusions: BTreeMap<ItemId, FusionRecord>,
    retired_by_caller: BTreeSet<(ItemId, PrincipalId)>,
}

impl LedgerState {
    /// Build a store for `items`. The fusion cap defaults to the item count
    /// and may only be lowered.
    pub fn new(items: Vec<ItemId>, fusion_cap: Option<u64>) -> Result<Self> {
        if items.is_empty() {
            return Err(LedgerError::EmptyItemSet);
        }
        if items.iter().any(|item| item.value() == 0) {
            return Err(LedgerError::InvalidItemId);
        }

        let mut records = BTreeMap::new();
        for item in &items {
            if records.insert(*item, ItemSet::new(*item)).is_some() {
                return Err(LedgerError::DuplicateItem { item: *item });
            }
        }

        let item_count = items.len() as u64;
        let cap = match fusion_cap {
            None => item_count,
            Some(cap) if (1..=item_count).contains(&cap) => cap,
            Some(cap) => {
                return Err(LedgerError::InvalidFusionCap {
                    cap,
                    items: item_count,
                })
            }
        };

        Ok(Self {
            items: records,
            circulation: CirculationRegistry::new(items)?,
            units: BTreeMap::new(),
            last_unit: UnitId::new(0),
            supply: FusionSupply::new(cap),
            fusions: BTreeMap::new(),
            retired_by_caller: BTreeSet::new(),
        })
    }

    pub fn item(&self, item: ItemId) -> Option<&ItemSet> {
        self.items.get(&item)
    }

    pub fn items(&self) -> impl Iterator<Item = &ItemSet> {
        self.items.values()
    }

    pub fn circulation(&self) -> &CirculationRegistry {
        &self.circulation
    }

    pub fn unit(&self, unit: UnitId) -> Option<&FragmentUnit> {
        self.units.get(&unit)
    }

    pub fn units(&self) -> impl Iterator<Item = &FragmentUnit> {
        self.units.values()
    }

    /// Last unit id handed out; zero before the first issue
    pub fn last_unit(&self) -> UnitId {
        self.last_unit
    }

    pub fn supply(&self) -> FusionSupply {
        self.supply
    }

    pub fn fusion(&self, item: ItemId) -> Option<&FusionRecord> {
        self.fusions.get(&item)
    }

    pub fn fusions(&self) -> impl Iterator<Item = &FusionRecord> {
        self.fusions.values()
    }

    /// Whether `caller` already retired `item`
    pub fn has_retired(&self, item: ItemId, caller: PrincipalId) -> bool {
        self.retired_by_caller.contains(&(item, caller))
    }

    pub(crate) fn plan_issue(&self, caller: PrincipalId, index: u64) -> Result<IssuePlan> {
        let item = self.circulation.pick(index)?;
        let record = self
            .items
            .get(&item)
            .ok_or_else(|| LedgerError::invariant(format!("{item} in circulation but unknown")))?;
        let slot = record.next_slot().ok_or_else(|| {
            LedgerError::invariant(format!("{item} in circulation with every slot issued"))
        })?;
        let position = self
            .circulation
            .position(item)
            .ok_or_else(|| LedgerError::invariant(format!("{item} picked but not indexed")))?;

        Ok(IssuePlan {
            caller,
            item,
            slot,
            unit: self.last_unit.next(),
            position,
            first_fragment: record.minted == 0,
            completes_item: slot == Slot::LAST,
        })
    }

    pub(crate) fn apply_issue(&mut self, plan: &IssuePlan) -> Result<()> {
        let record = self
            .items
            .get(&plan.item)
            .ok_or_else(|| LedgerError::invariant(format!("{} vanished", plan.item)))?;
        if record.next_slot() != Some(plan.slot) || self.last_unit.next() != plan.unit {
            return Err(LedgerError::invariant(format!(
                "stale issue plan for {}: expected {:?}/{}, found {:?}/{}",
                plan.item,
                record.next_slot(),
                self.last_unit.next(),
                plan.slot,
                plan.unit
            )));
        }

        // The only fallible mutation goes first so a failure leaves nothing behind.
        let relocation = if plan.completes_item {
            self.circulation.remove(plan.item)?
        } else {
            None
        };

        if let Some(moved) = relocation {
            if let Some(moved_record) = self.items.get_mut(&moved.item) {
                if moved_record.circulation_index.is_some() {
                    moved_record.circulation_index = Some(moved.to);
                }
            }
            debug!(item = %moved.item, from = moved.from, to = moved.to, "circulation entry relocated");
        }

        if let Some(record) = self.items.get_mut(&plan.item) {
            if plan.first_fragment {
                record.circulation_index = Some(plan.position);
            }
            record.slots[plan.slot.index()] = Some(plan.unit);
            record.minted += 1;
            if plan.completes_item {
                record.circulation_index = None;
            }
        }

        self.units.insert(
            plan.unit,
            FragmentUnit {
                unit: plan.unit,
                item: plan.item,
                slot: plan.slot,
                destroyed: false,
            },
        );
        self.last_unit = plan.unit;

        debug!(
            caller = %plan.caller,
            item = %plan.item,
            unit = %plan.unit,
            slot = %plan.slot,
            "fragment issued"
        );
        if plan.completes_item {
            info!(item = %plan.item, remaining = self.circulation.len(), "item removed from circulation");
        }
        Ok(())
    }

    pub(crate) fn apply_retirement(
        &mut self,
        item: ItemId,
        caller: PrincipalId,
        at: PhysicalTime,
        units: &[UnitId; SLOTS],
    ) -> Result<RetirementFact> {
        let record = self
            .items
            .get_mut(&item)
            .ok_or(LedgerError::NonexistentItem { item })?;
        if record.retirement.is_some() {
            return Err(LedgerError::invariant(format!("{item} retired twice")));
        }

        let fact = RetirementFact {
            item,
            retired_by: caller,
            retired_at: at,
        };
        record.retirement = Some(fact);
        self.retired_by_caller.insert((item, caller));
        for unit in units {
            if let Some(fragment) = self.units.get_mut(unit) {
                fragment.destroyed = true;
            }
        }

        info!(%item, %caller, "set retired");
        Ok(fact)
    }

    /// Checks for `transform`, in order. Returns the id the derived unit will
    /// receive.
    pub(crate) fn plan_fusion(&self, item: ItemId, caller: PrincipalId) -> Result<FusionId> {
        let record = self.items.get(&item);
        let retirement = record
            .and_then(ItemSet::retirement)
            .ok_or(LedgerError::SetNotRetired { item })?;
        if retirement.retired_by != caller {
            return Err(LedgerError::NotRetiree {
                item,
                caller,
                retiree: retirement.retired_by,
            });
        }
        if let Some(fusion) = record.and_then(ItemSet::fusion) {
            return Err(LedgerError::AlreadyTransformed { item, fusion });
        }
        if !self.supply.can_mint() {
            return Err(LedgerError::TransformationCapReached {
                cap: self.supply.cap,
            });
        }
        Ok(self.supply.next_id())
    }

    pub(crate) fn apply_fusion(
        &mut self,
        item: ItemId,
        caller: PrincipalId,
        expected: FusionId,
        at: PhysicalTime,
    ) -> Result<FusionRecord> {
        if self.supply.next_id() != expected {
            return Err(LedgerError::invariant(format!(
                "stale fusion plan: expected {expected}, next is {}",
                self.supply.next_id()
            )));
        }
        let record = self
            .items
            .get_mut(&item)
            .ok_or(LedgerError::SetNotRetired { item })?;
        let fusion = self
            .supply
            .record_mint()
            .ok_or(LedgerError::TransformationCapReached {
                cap: self.supply.cap,
            })?;
        record.fusion = Some(fusion);

        let fusion_record = FusionRecord {
            fusion,
            source_item: item,
            created_by: caller,
            created_at: at,
        };
        self.fusions.insert(item, fusion_record);

        info!(%item, %caller, %fusion, "item transformed");
        Ok(fusion_record)
    }

    /// Validate every bookkeeping invariant
    pub fn check_invariants(&self) -> Result<()> {
        self.circulation.check_invariants()?;

        let mut minted_total: u64 = 0;
        for record in self.items.values() {
            let item = record.item;
            if record.minted > FRAGMENTS_PER_ITEM {
                return Err(LedgerError::invariant(format!(
                    "{item} has {} fragments",
                    record.minted
                )));
            }
            minted_total += u64::from(record.minted);

            for (index, slot_unit) in record.slots.iter().enumerate() {
                let expected_filled = index < usize::from(record.minted);
                match (slot_unit, expected_filled) {
                    (Some(unit), true) => {
                        let fragment = self.units.get(unit).ok_or_else(|| {
                            LedgerError::invariant(format!("{item} references missing {unit}"))
                        })?;
                        if fragment.item != item || fragment.slot.index() != index {
                            return Err(LedgerError::invariant(format!(
                                "{unit} recorded under {item} slot {} but belongs to {} {}",
                                index + 1,
                                fragment.item,
                                fragment.slot
                            )));
                        }
                    }
                    (None, false) => {}
                    _ => {
                        return Err(LedgerError::invariant(format!(
                            "{item} slots do not match its count of {}",
                            record.minted
                        )))
                    }
                }
            }

            let in_circulation = self.circulation.contains(item);
            if in_circulation == record.is_complete() {
                return Err(LedgerError::invariant(format!(
                    "{item} circulation membership disagrees with {} fragments",
                    record.minted
                )));
            }
            match (record.minted, record.circulation_index) {
                (0, None) => {}
                (0, Some(_)) => {
                    return Err(LedgerError::invariant(format!(
                        "{item} recorded a position before its first fragment"
                    )))
                }
                (m, None) if m == FRAGMENTS_PER_ITEM => {}
                (m, Some(_)) if m == FRAGMENTS_PER_ITEM => {
                    return Err(LedgerError::invariant(format!(
                        "{item} left circulation but kept a position"
                    )))
                }
                (_, recorded) => {
                    let actual = self.circulation.position(item);
                    if recorded != actual {
                        return Err(LedgerError::invariant(format!(
                            "{item} recorded position {recorded:?} but sits at {actual:?}"
                        )));
                    }
                }
            }

            if record.retirement.is_some() && !record.is_complete() {
                return Err(LedgerError::invariant(format!("{item} retired while incomplete")));
            }
            if let Some(fusion) = record.fusion {
                if record.retirement.is_none() {
                    return Err(LedgerError::invariant(format!(
                        "{item} transformed without retirement"
                    )));
                }
                if self.fusions.get(&item).map(|f| f.fusion) != Some(fusion) {
                    return Err(LedgerError::invariant(format!(
                        "{item} fusion record missing for {fusion}"
                    )));
                }
            }
        }

        if minted_total != self.last_unit.value() || self.units.len() as u64 != minted_total {
            return Err(LedgerError::invariant(format!(
                "{minted_total} fragments counted, {} units stored, counter at {}",
                self.units.len(),
                self.last_unit
            )));
        }

        let fusion_ids: BTreeSet<FusionId> = self.fusions.values().map(|f| f.fusion).collect();
        if fusion_ids.len() != self.fusions.len()
            || self.fusions.len() as u64 != self.supply.minted
            || self.supply.minted > self.supply.cap
        {
            return Err(LedgerError::invariant(format!(
                "{} fusion records for {} minted under cap {}",
                self.fusions.len(),
                self.supply.minted,
                self.supply.cap
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn state(ids: &[u64]) -> LedgerState {
        LedgerState::new(ids.iter().copied().map(ItemId::new).collect(), None).unwrap()
    }

    fn issue_at(state: &mut LedgerState, index: u64) -> IssuePlan {
        let plan = state
            .plan_issue(PrincipalId::from_label("alice"), index)
            .unwrap();
        state.apply_issue(&plan).unwrap();
        state.check_invariants().unwrap();
        plan
    }

    #[test]
    fn construction_rejects_bad_item_sets() {
        assert_eq!(
            LedgerState::new(vec![], None).unwrap_err(),
            LedgerError::EmptyItemSet
        );
        assert_eq!(
            LedgerState::new(vec![ItemId::new(0)], None).unwrap_err(),
            LedgerError::InvalidItemId
        );
        assert_eq!(
            LedgerState::new(vec![ItemId::new(2), ItemId::new(2)], None).unwrap_err(),
            LedgerError::DuplicateItem {
                item: ItemId::new(2)
            }
        );
        assert_eq!(
            LedgerState::new(vec![ItemId::new(1)], Some(2)).unwrap_err(),
            LedgerError::InvalidFusionCap { cap: 2, items: 1 }
        );
    }

    #[test]
    fn first_fragment_records_position_and_swaps_keep_it_current() {
        let mut state = state(&[1, 2, 3]);

        // Item 3 gets its first fragment while at position 2.
        let plan = issue_at(&mut state, 2);
        assert_eq!(plan.item, ItemId::new(3));
        assert_eq!(state.item(ItemId::new(3)).unwrap().circulation_index(), Some(2));

        // Completing item 1 swaps item 3 into position 0.
        for _ in 0..4 {
            issue_at(&mut state, 0);
        }
        assert!(state.item(ItemId::new(1)).unwrap().is_complete());
        assert_eq!(state.circulation().as_slice(), &[ItemId::new(3), ItemId::new(2)]);
        assert_eq!(state.item(ItemId::new(3)).unwrap().circulation_index(), Some(0));
        assert_eq!(state.item(ItemId::new(2)).unwrap().circulation_index(), None);
        assert_eq!(state.item(ItemId::new(1)).unwrap().circulation_index(), None);
    }

    #[test]
    fn stale_plan_is_rejected_without_changes() {
        let mut state = state(&[1, 2]);
        let plan = state
            .plan_issue(PrincipalId::from_label("alice"), 0)
            .unwrap();
        state.apply_issue(&plan).unwrap();

        let before = state.clone();
        assert!(matches!(
            state.apply_issue(&plan),
            Err(LedgerError::InvariantViolation { .. })
        ));
        assert_eq!(state.last_unit(), before.last_unit());
        assert_eq!(state.item(ItemId::new(1)), before.item(ItemId::new(1)));
    }

    #[test]
    fn phases_move_forward() {
        let mut state = state(&[1]);
        let alice = PrincipalId::from_label("alice");
        assert_eq!(
            state.item(ItemId::new(1)).unwrap().phase(),
            ItemPhase::Incomplete { minted: 0 }
        );
        for _ in 0..4 {
            issue_at(&mut state, 0);
        }
        let record = state.item(ItemId::new(1)).unwrap();
        assert_eq!(record.phase(), ItemPhase::Complete);
        let units = record.complete_units().unwrap();
        assert_eq!(units.map(|u| u.value()), [1, 2, 3, 4]);

        state
            .apply_retirement(ItemId::new(1), alice, PhysicalTime::from_millis(5), &units)
            .unwrap();
        assert_eq!(
            state.item(ItemId::new(1)).unwrap().phase(),
            ItemPhase::Retired { by: alice }
        );
        assert!(state.units().all(|u| u.destroyed));

        let fusion = state.plan_fusion(ItemId::new(1), alice).unwrap();
        state
            .apply_fusion(ItemId::new(1), alice, fusion, PhysicalTime::from_millis(6))
            .unwrap();
        assert_eq!(
            state.item(ItemId::new(1)).unwrap().phase(),
            ItemPhase::Transformed {
                fusion: FusionId::new(1)
            }
        );
        state.check_invariants().unwrap();
    }

    #[test]
    fn fusion_supply_tracks_headroom() {
        let mut supply = FusionSupply::new(2);
        assert_eq!(supply.next_id(), FusionId::new(1));
        assert_eq!(supply.record_mint(), Some(FusionId::new(1)));
        assert_eq!(supply.remaining(), 1);
        assert_eq!(supply.record_mint(), Some(FusionId::new(2)));
        assert!(!supply.can_mint());
        assert_eq!(supply.record_mint(), None);
        assert_eq!(supply.minted, 2);
    }
}
