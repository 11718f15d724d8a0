//! Serializable export of committed ledger state, for indexers
use crate::ledger::Ledger;
use crate::state::{FragmentUnit, FusionRecord, FusionSupply, ItemSet};
use serde::{Deserialize, Serialize};
use tessera_core::effects::LedgerEffects;
use tessera_core::{ItemId, UnitId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub items: Vec<ItemSet>,
    pub units: Vec<FragmentUnit>,
    /// Circulation in array order
    pub circulation: Vec<ItemId>,
    pub last_unit: UnitId,
    pub fusion_supply: FusionSupply,
    pub fusions: Vec<FusionRecord>,
}

impl<E: LedgerEffects> Ledger<E> {
    /// Copy of the committed state
    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = self.read_state();
        LedgerSnapshot {
            items: state.items().cloned().collect(),
            units: state.units().copied().collect(),
            circulation: state.circulation().as_slice().to_vec(),
            last_unit: state.last_unit(),
            fusion_supply: state.supply(),
            fusions: state.fusions().copied().collect(),
        }
    }
}
