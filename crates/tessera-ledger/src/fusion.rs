//! Transformation into derived units
//!
//! Turns a retired item into exactly one fused unit for the account that
//! retired it. The running supply never exceeds its cap; see
//! [`FusionSupply`](crate::state::FusionSupply).

use crate::error::Result;
use crate::guard::Operation;
use crate::ledger::Ledger;
use crate::state::FusionRecord;
use serde::{Deserialize, Serialize};
use tessera_core::effects::LedgerEffects;
use tessera_core::{AssetId, FusionId, ItemId, LedgerEvent, PrincipalId};

/// Aggregate fusion supply figures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FusionStats {
    pub minted: u64,
    pub remaining: u64,
    pub cap: u64,
    /// Id the next derived unit will receive
    pub next_id: FusionId,
}

impl<E: LedgerEffects> Ledger<E> {
    /// Mint the derived unit for `item` to `caller`.
    ///
    /// Checks run in order: retired, retired by `caller`, not yet
    /// transformed, supply below cap.
    pub fn transform(&self, item: ItemId, caller: PrincipalId) -> Result<FusionRecord> {
        let _guard = self.lock.acquire(Operation::Transform)?;

        let fusion = self.read_state().plan_fusion(item, caller)?;
        let at = self.effects.physical_time()?;
        self.effects.mint_to(caller, AssetId::Fused(fusion))?;

        let record = self.write_state().apply_fusion(item, caller, fusion, at)?;

        self.effects.emit(LedgerEvent::ItemTransformed {
            caller,
            item,
            fusion: record.fusion,
            at,
        });
        Ok(record)
    }

    /// Current fusion supply
    pub fn fusion_stats(&self) -> FusionStats {
        let supply = self.read_state().supply();
        FusionStats {
            minted: supply.minted,
            remaining: supply.remaining(),
            cap: supply.cap,
            next_id: supply.next_id(),
        }
    }
}
