//! Composite handler combining one handler per effect trait
//!
//! The ledger is generic over a single `LedgerEffects` value; `EffectSystem`
//! builds one from independent handlers so each can be swapped without
//! touching the others.

use crate::entropy::ConfiguredEntropy;
use crate::events::EventLogHandler;
use crate::ownership::InMemoryOwnershipHandler;
use crate::time::SystemTimeHandler;
use std::sync::Arc;
use tessera_core::effects::{
    EntropyEffects, EntropyError, EventEffects, OwnershipEffects, OwnershipError,
    PhysicalTimeEffects, TimeError,
};
use tessera_core::{AssetId, LedgerConfig, LedgerEvent, PhysicalTime, PrincipalId, TesseraError};

/// Handler set delegating each effect trait to its own handler
#[derive(Debug, Clone)]
pub struct EffectSystem<R, O, T, V> {
    entropy: R,
    ownership: O,
    time: T,
    events: V,
}

/// Handler set built from a [`LedgerConfig`]
pub type ProductionEffects = EffectSystem<
    ConfiguredEntropy,
    Arc<InMemoryOwnershipHandler>,
    SystemTimeHandler,
    Arc<EventLogHandler>,
>;

impl<R, O, T, V> EffectSystem<R, O, T, V> {
    /// Compose four handlers
    pub fn new(entropy: R, ownership: O, time: T, events: V) -> Self {
        Self {
            entropy,
            ownership,
            time,
            events,
        }
    }

    /// Entropy handler
    pub fn entropy(&self) -> &R {
        &self.entropy
    }

    /// Ownership registry handler
    pub fn ownership(&self) -> &O {
        &self.ownership
    }

    /// Time handler
    pub fn time(&self) -> &T {
        &self.time
    }

    /// Event sink handler
    pub fn events(&self) -> &V {
        &self.events
    }
}

impl ProductionEffects {
    /// Build the handlers a configuration asks for, with an empty in-memory
    /// ownership registry and a buffering event log.
    pub fn from_config(config: &LedgerConfig) -> Result<Self, TesseraError> {
        let entropy = ConfiguredEntropy::from_config(&config.entropy)?;
        let events = if config.emit_tracing_events {
            EventLogHandler::new().with_tracing()
        } else {
            EventLogHandler::new()
        };
        Ok(Self::new(
            entropy,
            Arc::new(InMemoryOwnershipHandler::new()),
            SystemTimeHandler::new(),
            Arc::new(events),
        ))
    }
}

impl<R: EntropyEffects, O: Send + Sync, T: Send + Sync, V: Send + Sync> EntropyEffects
    for EffectSystem<R, O, T, V>
{
    fn draw(&self, exclusive_upper_bound: u64, salt: u64) -> Result<u64, EntropyError> {
        self.entropy.draw(exclusive_upper_bound, salt)
    }
}

impl<R: Send + Sync, O: OwnershipEffects, T: Send + Sync, V: Send + Sync> OwnershipEffects
    for EffectSystem<R, O, T, V>
{
    fn owner_of(&self, asset: AssetId) -> Result<PrincipalId, OwnershipError> {
        self.ownership.owner_of(asset)
    }

    fn mint_to(&self, owner: PrincipalId, asset: AssetId) -> Result<(), OwnershipError> {
        self.ownership.mint_to(owner, asset)
    }

    fn destroy(&self, asset: AssetId) -> Result<(), OwnershipError> {
        self.ownership.destroy(asset)
    }

    fn destroy_all(&self, assets: &[AssetId]) -> Result<(), OwnershipError> {
        self.ownership.destroy_all(assets)
    }
}

impl<R: Send + Sync, O: Send + Sync, T: PhysicalTimeEffects, V: Send + Sync> PhysicalTimeEffects
    for EffectSystem<R, O, T, V>
{
    fn physical_time(&self) -> Result<PhysicalTime, TimeError> {
        self.time.physical_time()
    }
}

impl<R: Send + Sync, O: Send + Sync, T: Send + Sync, V: EventEffects> EventEffects
    for EffectSystem<R, O, T, V>
{
    fn emit(&self, event: LedgerEvent) {
        self.events.emit(event);
    }
}
