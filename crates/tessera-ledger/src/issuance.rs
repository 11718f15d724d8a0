//! Fragment issuance
//!
//! `issue` is the single write path from "pick an item" to "a new fragment
//! unit in the next free slot". Item selection is one entropy draw over the
//! current circulation, salted with the unit counter so consecutive draws are
//! tied to distinct ledger steps.

use crate::error::{LedgerError, Result};
use crate::guard::Operation;
use crate::ledger::Ledger;
use serde::{Deserialize, Serialize};
use tessera_core::effects::LedgerEffects;
use tessera_core::{AssetId, ItemId, LedgerEvent, PrincipalId, Slot, UnitId};
use tracing::debug;

/// Outcome of a successful `issue`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueReceipt {
    pub unit: UnitId,
    pub item: ItemId,
    pub slot: Slot,
    /// The item filled its last slot and left circulation
    pub removed_from_circulation: bool,
}

impl<E: LedgerEffects> Ledger<E> {
    /// Issue one fragment unit to `caller`.
    ///
    /// Fails with [`LedgerError::NoItemsAvailable`] once every item is
    /// complete. Entropy, time and ownership failures abort the call with no
    /// state change.
    pub fn issue(&self, caller: PrincipalId) -> Result<IssueReceipt> {
        let _guard = self.lock.acquire(Operation::Issue)?;

        let (bound, salt) = {
            let state = self.read_state();
            (state.circulation().len() as u64, state.last_unit().value())
        };
        if bound == 0 {
            debug!(%caller, "issue rejected: circulation empty");
            return Err(LedgerError::NoItemsAvailable);
        }

        let index = self.effects.draw(bound, salt)?;
        if index >= bound {
            return Err(LedgerError::invariant(format!(
                "entropy returned {index} for bound {bound}"
            )));
        }

        let plan = self.read_state().plan_issue(caller, index)?;
        let removed_at = if plan.completes_item {
            Some(self.effects.physical_time()?)
        } else {
            None
        };

        self.effects.mint_to(caller, AssetId::Fragment(plan.unit))?;
        self.write_state().apply_issue(&plan)?;

        self.effects.emit(LedgerEvent::FragmentIssued {
            caller,
            unit: plan.unit,
            item: plan.item,
            slot: plan.slot,
        });
        if let Some(at) = removed_at {
            self.effects.emit(LedgerEvent::RemovedFromCirculation {
                item: plan.item,
                at,
            });
        }

        Ok(IssueReceipt {
            unit: plan.unit,
            item: plan.item,
            slot: plan.slot,
            removed_from_circulation: plan.completes_item,
        })
    }
}
