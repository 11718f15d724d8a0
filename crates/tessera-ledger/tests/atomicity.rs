//! Failed operations leave no trace, and collaborators cannot re-enter.

#![allow(clippy::unwrap_used, missing_docs)]

mod common;

use assert_matches::assert_matches;
use common::{complete_item, issue_one, ledger};
use parking_lot::Mutex;
use std::sync::Arc;
use tessera_core::{
    AssetId, EntropyError, FusionId, ItemId, OwnershipEffects, OwnershipError, TimeError, UnitId,
};
use tessera_ledger::{ErrorClass, IssueReceipt, Ledger, LedgerError, Operation};
use tessera_testkit::{alice, bob, item_range, HookPoint, MockEffects};

fn item(id: u64) -> ItemId {
    ItemId::new(id)
}

#[test]
fn empty_circulation_is_a_no_op() {
    let ledger = ledger(1);
    complete_item(&ledger, item(1), alice());
    let before = ledger.snapshot();
    let draws = ledger.effects().draws().len();

    assert_eq!(ledger.issue(bob()).unwrap_err(), LedgerError::NoItemsAvailable);
    assert_eq!(ledger.snapshot(), before);
    assert_eq!(ledger.effects().draws().len(), draws);
    assert_eq!(ledger.effects().ownership().balance_of(bob()), 0);
}

#[test]
fn failed_mint_consumes_nothing() {
    let ledger = ledger(2);
    let before = ledger.snapshot();

    ledger.effects().fail_next(HookPoint::Mint);
    ledger.effects().script_draws([0]);
    assert_matches!(
        ledger.issue(alice()),
        Err(LedgerError::Ownership(OwnershipError::Rejected { .. }))
    );
    assert_eq!(ledger.snapshot(), before);
    assert!(ledger.effects().events().is_empty());

    let receipt = issue_one(&ledger, item(1), alice());
    assert_eq!(receipt.unit, UnitId::new(1));
}

#[test]
fn failed_clock_keeps_item_in_circulation() {
    let ledger = ledger(1);
    for _ in 0..3 {
        issue_one(&ledger, item(1), alice());
    }

    ledger.effects().fail_next(HookPoint::Time);
    ledger.effects().script_draws([0]);
    assert_eq!(
        ledger.issue(alice()).unwrap_err(),
        LedgerError::Time(TimeError::ServiceUnavailable)
    );
    assert_eq!(ledger.circulation(), vec![item(1)]);
    assert_eq!(ledger.slots_remaining(item(1)).unwrap(), 1);
    assert_eq!(ledger.effects().ownership().len(), 3);
    ledger.check_invariants().unwrap();
}

#[test]
fn failed_draw_is_reported_as_collaborator_error() {
    let ledger = ledger(2);
    ledger.effects().fail_next(HookPoint::Draw);
    let err = ledger.issue(alice()).unwrap_err();
    assert_matches!(err, LedgerError::Entropy(EntropyError::Unavailable { .. }));
    assert_eq!(err.class(), ErrorClass::Collaborator);
    assert_eq!(ledger.total_issued(), 0);
}

#[test]
fn out_of_range_draw_is_an_invariant_violation() {
    let ledger = ledger(2);
    let before = ledger.snapshot();
    ledger.effects().script_draws([2]);

    let err = ledger.issue(alice()).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Invariant);
    assert_eq!(ledger.snapshot(), before);
    assert!(ledger.effects().ownership().is_empty());
}

#[test]
fn failed_destroy_leaves_set_unretired() {
    let ledger = ledger(2);
    complete_item(&ledger, item(1), alice());

    ledger.effects().fail_next(HookPoint::Destroy);
    assert_matches!(ledger.retire(item(1), alice()), Err(LedgerError::Ownership(_)));
    assert_eq!(ledger.retirement(item(1)).unwrap(), None);
    assert!(!ledger.has_retired(item(1), alice()));
    assert_eq!(ledger.effects().ownership().balance_of(alice()), 4);

    ledger.retire(item(1), alice()).unwrap();
    assert!(ledger.effects().ownership().is_empty());
}

#[test]
fn failed_fused_mint_keeps_supply() {
    let ledger = ledger(2);
    complete_item(&ledger, item(2), alice());
    ledger.retire(item(2), alice()).unwrap();

    ledger.effects().fail_next(HookPoint::Mint);
    assert_matches!(ledger.transform(item(2), alice()), Err(LedgerError::Ownership(_)));
    assert_eq!(ledger.fusion_stats().minted, 0);
    assert_eq!(ledger.find_transformation(item(2)), None);

    assert_eq!(
        ledger.transform(item(2), alice()).unwrap().fusion,
        FusionId::new(1)
    );
}

/// Ledger shared with hooks that call back into it
fn shared_ledger(count: u64) -> (Arc<Ledger<MockEffects>>, MockEffects) {
    let effects = MockEffects::deterministic();
    let ledger = Arc::new(Ledger::new(item_range(count), effects.clone()).unwrap());
    (ledger, effects)
}

#[test]
fn issue_cannot_be_reentered_from_mint() {
    let (ledger, effects) = shared_ledger(3);
    let nested: Arc<Mutex<Vec<Result<IssueReceipt, LedgerError>>>> = Arc::default();

    let weak = Arc::downgrade(&ledger);
    let sink = nested.clone();
    effects.set_hook(HookPoint::Mint, move || {
        if let Some(ledger) = weak.upgrade() {
            sink.lock().push(ledger.issue(bob()));
        }
    });

    let receipt = ledger.issue(alice()).unwrap();
    effects.clear_hook(HookPoint::Mint);

    assert_eq!(
        *nested.lock(),
        vec![Err(LedgerError::Reentrancy {
            active: Operation::Issue,
            attempted: Operation::Issue,
        })]
    );
    assert_eq!(ledger.total_issued(), 1);
    assert_eq!(effects.ownership().owner_of(AssetId::Fragment(receipt.unit)), Ok(alice()));
    ledger.check_invariants().unwrap();
}

#[test]
fn retire_cannot_be_reentered_from_ownership_lookup() {
    let (ledger, effects) = shared_ledger(2);
    complete_item(&ledger, item(1), alice());
    complete_item(&ledger, item(2), alice());
    ledger.retire(item(2), alice()).unwrap();

    let nested: Arc<Mutex<Vec<LedgerError>>> = Arc::default();
    let weak = Arc::downgrade(&ledger);
    let sink = nested.clone();
    effects.set_hook(HookPoint::OwnerOf, move || {
        if let Some(ledger) = weak.upgrade() {
            if let Err(err) = ledger.transform(item(2), alice()) {
                sink.lock().push(err);
            }
        }
    });

    ledger.retire(item(1), alice()).unwrap();
    effects.clear_hook(HookPoint::OwnerOf);

    let nested = nested.lock();
    assert_eq!(nested.len(), 4);
    assert!(nested.iter().all(|err| *err
        == LedgerError::Reentrancy {
            active: Operation::Retire,
            attempted: Operation::Transform,
        }));
    assert_eq!(ledger.fusion_stats().minted, 0);
}

#[test]
fn transform_cannot_be_reentered_and_lock_is_released_after() {
    let (ledger, effects) = shared_ledger(2);
    complete_item(&ledger, item(1), alice());
    ledger.retire(item(1), alice()).unwrap();

    let nested: Arc<Mutex<Vec<LedgerError>>> = Arc::default();
    let weak = Arc::downgrade(&ledger);
    let sink = nested.clone();
    effects.set_hook(HookPoint::Mint, move || {
        if let Some(ledger) = weak.upgrade() {
            if let Err(err) = ledger.retire(item(1), alice()) {
                sink.lock().push(err);
            }
        }
    });

    ledger.transform(item(1), alice()).unwrap();
    effects.clear_hook(HookPoint::Mint);

    assert_eq!(
        nested.lock().as_slice(),
        &[LedgerError::Reentrancy {
            active: Operation::Transform,
            attempted: Operation::Retire,
        }]
    );
    // The guard is gone; a fresh operation runs normally.
    issue_one(&ledger, item(2), bob());
}

#[test]
fn queries_from_callbacks_see_last_committed_state() {
    let (ledger, effects) = shared_ledger(2);
    let observed: Arc<Mutex<Vec<(u64, usize)>>> = Arc::default();

    let weak = Arc::downgrade(&ledger);
    let sink = observed.clone();
    effects.set_hook(HookPoint::Mint, move || {
        if let Some(ledger) = weak.upgrade() {
            sink.lock()
                .push((ledger.total_issued(), ledger.circulation().len()));
        }
    });

    for _ in 0..4 {
        issue_one(&ledger, item(1), alice());
    }
    effects.clear_hook(HookPoint::Mint);

    assert_eq!(*observed.lock(), vec![(0, 2), (1, 2), (2, 2), (3, 2)]);
    assert_eq!(ledger.circulation(), vec![item(2)]);
}
