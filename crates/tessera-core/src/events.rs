//! Observable ledger events
//!
//! Events are raised after a mutating operation commits and are meant for
//! external indexers. They carry no information the ledger queries cannot
//! also answer.

use crate::identifiers::{FusionId, ItemId, PrincipalId, Slot, UnitId};
use crate::time::PhysicalTime;
use serde::{Deserialize, Serialize};

/// Event raised by a committed ledger operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A fragment unit was issued to `caller`
    FragmentIssued {
        caller: PrincipalId,
        unit: UnitId,
        item: ItemId,
        slot: Slot,
    },
    /// An item filled its last slot and left circulation
    RemovedFromCirculation { item: ItemId, at: PhysicalTime },
    /// A complete set was destroyed by `caller`
    SetRetired { caller: PrincipalId, item: ItemId },
    /// A retired item was fused into a derived unit
    ItemTransformed {
        caller: PrincipalId,
        item: ItemId,
        fusion: FusionId,
        at: PhysicalTime,
    },
}

impl LedgerEvent {
    /// Item this event concerns
    pub fn item(&self) -> ItemId {
        match self {
            LedgerEvent::FragmentIssued { item, .. }
            | LedgerEvent::RemovedFromCirculation { item, .. }
            | LedgerEvent::SetRetired { item, .. }
            | LedgerEvent::ItemTransformed { item, .. } => *item,
        }
    }

    /// Short stable name, used as the tracing message
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerEvent::FragmentIssued { .. } => "fragment_issued",
            LedgerEvent::RemovedFromCirculation { .. } => "removed_from_circulation",
            LedgerEvent::SetRetired { .. } => "set_retired",
            LedgerEvent::ItemTransformed { .. } => "item_transformed",
        }
    }
}
