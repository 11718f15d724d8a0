//! Mock effects implementation for ledger tests
//!
//! `MockEffects` implements every ledger effect trait with deterministic,
//! inspectable behavior:
//! - Entropy: scripted raw indices first, then a seeded ChaCha20 RNG. Every
//!   draw's `(bound, salt)` is recorded.
//! - Time: a simulated clock starting at 2022-01-01 00:00:00 UTC.
//! - Ownership: an in-memory registry.
//! - Events: buffered for inspection.
//!
//! Each collaborator call passes through a [`HookPoint`]. A hook registered
//! there runs before the call with no mock lock held, so it may call back
//! into the ledger. `fail_next` makes the next call at a point fail.
//!
//! Clones share all state.

use parking_lot::Mutex;
use rand::Rng;
use rand_chacha::{rand_core::SeedableRng, ChaCha20Rng};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tessera_core::effects::{
    EntropyEffects, EntropyError, EventEffects, OwnershipEffects, OwnershipError,
    PhysicalTimeEffects, TimeError,
};
use tessera_core::{AssetId, LedgerEvent, PhysicalTime, PrincipalId};
use tessera_effects::{EventLogHandler, InMemoryOwnershipHandler};

/// Fixed start of the simulated clock: 2022-01-01 00:00:00 UTC
pub const MOCK_EPOCH_MS: u64 = 1_640_995_200_000;

/// Collaborator call a hook or injected failure attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HookPoint {
    Draw,
    Time,
    OwnerOf,
    Mint,
    Destroy,
}

type Hook = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug)]
struct EntropyState {
    rng: ChaCha20Rng,
    scripted: VecDeque<u64>,
    draws: Vec<(u64, u64)>,
}

#[derive(Default)]
struct Hooks {
    callbacks: HashMap<HookPoint, Hook>,
    failures: BTreeSet<HookPoint>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("callbacks", &self.callbacks.keys().collect::<Vec<_>>())
            .field("failures", &self.failures)
            .finish()
    }
}

/// Deterministic handler set for ledger tests
#[derive(Debug, Clone)]
pub struct MockEffects {
    entropy: Arc<Mutex<EntropyState>>,
    clock_ms: Arc<AtomicU64>,
    ownership: Arc<InMemoryOwnershipHandler>,
    events: Arc<EventLogHandler>,
    hooks: Arc<Mutex<Hooks>>,
}

impl MockEffects {
    /// Create deterministic mock effects with a fixed seed
    pub fn deterministic() -> Self {
        Self::with_seed([42; 32])
    }

    /// Create mock effects with a specific seed for reproducible tests
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            entropy: Arc::new(Mutex::new(EntropyState {
                rng: ChaCha20Rng::from_seed(seed),
                scripted: VecDeque::new(),
                draws: Vec::new(),
            })),
            clock_ms: Arc::new(AtomicU64::new(MOCK_EPOCH_MS)),
            ownership: Arc::new(InMemoryOwnershipHandler::new()),
            events: Arc::new(EventLogHandler::new()),
            hooks: Arc::new(Mutex::new(Hooks::default())),
        }
    }

    /// Queue raw draw results. They are returned unchanged, even when out of
    /// range for the requested bound.
    pub fn script_draws(&self, indices: impl IntoIterator<Item = u64>) {
        self.entropy.lock().scripted.extend(indices);
    }

    /// `(bound, salt)` of every draw so far
    pub fn draws(&self) -> Vec<(u64, u64)> {
        self.entropy.lock().draws.clone()
    }

    /// Move the simulated clock forward
    pub fn advance_time(&self, ms: u64) {
        self.clock_ms.fetch_add(ms, Ordering::SeqCst);
    }

    /// Current simulated time
    pub fn now(&self) -> PhysicalTime {
        PhysicalTime::from_millis(self.clock_ms.load(Ordering::SeqCst))
    }

    /// The backing ownership registry
    pub fn ownership(&self) -> &InMemoryOwnershipHandler {
        &self.ownership
    }

    /// Events emitted so far
    pub fn events(&self) -> Vec<LedgerEvent> {
        self.events.events()
    }

    /// Take and clear the emitted events
    pub fn drain_events(&self) -> Vec<LedgerEvent> {
        self.events.drain()
    }

    /// Run `hook` before every call at `point`
    pub fn set_hook(&self, point: HookPoint, hook: impl Fn() + Send + Sync + 'static) {
        self.hooks.lock().callbacks.insert(point, Arc::new(hook));
    }

    pub fn clear_hook(&self, point: HookPoint) {
        self.hooks.lock().callbacks.remove(&point);
    }

    /// Make the next call at `point` fail
    pub fn fail_next(&self, point: HookPoint) {
        self.hooks.lock().failures.insert(point);
    }

    /// Run the hook for `point`, then report whether an injected failure
    /// is pending for it.
    fn enter(&self, point: HookPoint) -> bool {
        let hook = self.hooks.lock().callbacks.get(&point).cloned();
        if let Some(hook) = hook {
            hook();
        }
        self.hooks.lock().failures.remove(&point)
    }
}

impl Default for MockEffects {
    fn default() -> Self {
        Self::deterministic()
    }
}

fn injected(point: HookPoint) -> OwnershipError {
    OwnershipError::Rejected {
        reason: format!("injected {point:?} failure"),
    }
}

impl EntropyEffects for MockEffects {
    fn draw(&self, exclusive_upper_bound: u64, salt: u64) -> Result<u64, EntropyError> {
        if self.enter(HookPoint::Draw) {
            return Err(EntropyError::Unavailable {
                reason: "injected draw failure".into(),
            });
        }
        if exclusive_upper_bound == 0 {
            return Err(EntropyError::ZeroBound);
        }
        let mut state = self.entropy.lock();
        state.draws.push((exclusive_upper_bound, salt));
        let index = match state.scripted.pop_front() {
            Some(index) => index,
            None => state.rng.gen_range(0..exclusive_upper_bound),
        };
        Ok(index)
    }
}

impl PhysicalTimeEffects for MockEffects {
    fn physical_time(&self) -> Result<PhysicalTime, TimeError> {
        if self.enter(HookPoint::Time) {
            return Err(TimeError::ServiceUnavailable);
        }
        Ok(self.now())
    }
}

impl OwnershipEffects for MockEffects {
    fn owner_of(&self, asset: AssetId) -> Result<PrincipalId, OwnershipError> {
        if self.enter(HookPoint::OwnerOf) {
            return Err(injected(HookPoint::OwnerOf));
        }
        self.ownership.owner_of(asset)
    }

    fn mint_to(&self, owner: PrincipalId, asset: AssetId) -> Result<(), OwnershipError> {
        if self.enter(HookPoint::Mint) {
            return Err(injected(HookPoint::Mint));
        }
        self.ownership.mint_to(owner, asset)
    }

    fn destroy(&self, asset: AssetId) -> Result<(), OwnershipError> {
        self.destroy_all(&[asset])
    }

    fn destroy_all(&self, assets: &[AssetId]) -> Result<(), OwnershipError> {
        if self.enter(HookPoint::Destroy) {
            return Err(injected(HookPoint::Destroy));
        }
        self.ownership.destroy_all(assets)
    }
}

impl EventEffects for MockEffects {
    fn emit(&self, event: LedgerEvent) {
        self.events.emit(event);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tessera_core::UnitId;

    #[test]
    fn scripted_draws_come_first_then_seeded_rng() {
        let effects = MockEffects::deterministic();
        effects.script_draws([3, 9]);
        assert_eq!(effects.draw(5, 0).unwrap(), 3);
        assert_eq!(effects.draw(5, 1).unwrap(), 9);
        assert!(effects.draw(5, 2).unwrap() < 5);
        assert_eq!(effects.draws(), vec![(5, 0), (5, 1), (5, 2)]);
    }

    #[test]
    fn same_seed_same_sequence() {
        let a = MockEffects::with_seed([7; 32]);
        let b = MockEffects::with_seed([7; 32]);
        let seq_a: Vec<u64> = (0..16).map(|i| a.draw(1000, i).unwrap()).collect();
        let seq_b: Vec<u64> = (0..16).map(|i| b.draw(1000, i).unwrap()).collect();
        assert_eq!(seq_a, seq_b);
    }

    #[test]
    fn injected_failure_fires_once() {
        let effects = MockEffects::deterministic();
        let alice = PrincipalId::from_label("alice");
        let asset = AssetId::Fragment(UnitId::new(1));

        effects.fail_next(HookPoint::Mint);
        assert!(effects.mint_to(alice, asset).is_err());
        assert!(effects.ownership().is_empty());
        effects.mint_to(alice, asset).unwrap();
        assert_eq!(effects.owner_of(asset), Ok(alice));
    }

    #[test]
    fn hooks_run_before_each_call() {
        let effects = MockEffects::deterministic();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        effects.set_hook(HookPoint::Time, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        effects.physical_time().unwrap();
        effects.physical_time().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        effects.clear_hook(HookPoint::Time);
        effects.physical_time().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn clock_advances_only_when_told() {
        let effects = MockEffects::deterministic();
        assert_eq!(effects.physical_time().unwrap().ts_ms, MOCK_EPOCH_MS);
        effects.advance_time(1_500);
        assert_eq!(effects.now().ts_ms, MOCK_EPOCH_MS + 1_500);
    }
}
