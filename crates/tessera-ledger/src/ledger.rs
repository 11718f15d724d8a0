//! Ledger context object
//!
//! A [`Ledger`] owns the state store, the reentrancy lock and the effect
//! handlers. Operations are split across `issuance`, `retirement`, `fusion`
//! and `queries`; each mutating one follows the same shape:
//!
//! 1. acquire the [`ReentrancyLock`](crate::guard::ReentrancyLock)
//! 2. read and plan under a short read lock
//! 3. call collaborators with no state lock held
//! 4. commit under a short write lock
//! 5. emit events
//!
//! A failure before step 4 leaves the store untouched.

use crate::error::{LedgerError, Result};
use crate::guard::ReentrancyLock;
use crate::state::LedgerState;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tessera_core::effects::LedgerEffects;
use tessera_core::{ConfigValidation, ItemId, LedgerConfig};
use tracing::{info, warn};

/// Fragment ledger over an effect handler set `E`
#[derive(Debug)]
pub struct Ledger<E> {
    pub(crate) effects: E,
    pub(crate) state: RwLock<LedgerState>,
    pub(crate) lock: ReentrancyLock,
}

/// Builder for [`Ledger`]
#[derive(Debug, Clone, Default)]
pub struct LedgerBuilder {
    items: Vec<ItemId>,
    fusion_cap: Option<u64>,
}

impl LedgerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append item ids, keeping their order in circulation
    pub fn items(mut self, items: impl IntoIterator<Item = ItemId>) -> Self {
        self.items.extend(items);
        self
    }

    /// Append one item id
    pub fn item(mut self, item: ItemId) -> Self {
        self.items.push(item);
        self
    }

    /// Lower the fusion cap below the item count
    pub fn fusion_cap(mut self, cap: u64) -> Self {
        self.fusion_cap = Some(cap);
        self
    }

    pub fn build<E: LedgerEffects>(self, effects: E) -> Result<Ledger<E>> {
        let state = LedgerState::new(self.items, self.fusion_cap)?;
        info!(
            items = state.circulation().len(),
            fusion_cap = state.supply().cap,
            "ledger created"
        );
        Ok(Ledger {
            effects,
            state: RwLock::new(state),
            lock: ReentrancyLock::new(),
        })
    }
}

impl<E: LedgerEffects> Ledger<E> {
    /// Create a ledger for `items` with the default fusion cap
    pub fn new(items: impl IntoIterator<Item = ItemId>, effects: E) -> Result<Self> {
        LedgerBuilder::new().items(items).build(effects)
    }

    /// Validate `config` and create a ledger for the items it describes
    pub fn from_config(config: &LedgerConfig, effects: E) -> Result<Self> {
        config.validate()?;
        let mut builder = LedgerBuilder::new().items(config.resolved_item_ids());
        if let Some(cap) = config.fusion_cap {
            builder = builder.fusion_cap(cap);
        }
        builder.build(effects)
    }

    /// Effect handlers this ledger was built with
    pub fn effects(&self) -> &E {
        &self.effects
    }

    pub(crate) fn read_state(&self) -> RwLockReadGuard<'_, LedgerState> {
        self.state.read()
    }

    pub(crate) fn write_state(&self) -> RwLockWriteGuard<'_, LedgerState> {
        self.state.write()
    }

    /// Validate every bookkeeping invariant of the current state
    pub fn check_invariants(&self) -> Result<()> {
        let result = self.read_state().check_invariants();
        if let Err(LedgerError::InvariantViolation { message }) = &result {
            warn!(%message, "ledger invariant violated");
        }
        result
    }
}
