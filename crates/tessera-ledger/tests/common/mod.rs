//! Shared ledger fixtures for integration tests
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use tessera_core::{ItemId, PrincipalId};
use tessera_ledger::{IssueReceipt, Ledger};
use tessera_testkit::{init_test_tracing, item_range, MockEffects};

pub type TestLedger = Ledger<MockEffects>;

/// Ledger over items `1..=count` with deterministic mocks
pub fn ledger(count: u64) -> TestLedger {
    init_test_tracing();
    Ledger::new(item_range(count), MockEffects::deterministic()).unwrap()
}

/// Issue to `caller` until `item` has all four fragments, steering each draw
/// to the item's current circulation position.
pub fn complete_item(ledger: &TestLedger, item: ItemId, caller: PrincipalId) -> Vec<IssueReceipt> {
    let mut receipts = Vec::new();
    while ledger.slots_remaining(item).unwrap() > 0 {
        issue_to_item(ledger, item, caller, &mut receipts);
    }
    receipts
}

/// Issue one fragment of `item` to `caller`
pub fn issue_one(ledger: &TestLedger, item: ItemId, caller: PrincipalId) -> IssueReceipt {
    let mut receipts = Vec::new();
    issue_to_item(ledger, item, caller, &mut receipts);
    receipts.remove(0)
}

fn issue_to_item(
    ledger: &TestLedger,
    item: ItemId,
    caller: PrincipalId,
    receipts: &mut Vec<IssueReceipt>,
) {
    let position = ledger
        .circulation()
        .iter()
        .position(|id| *id == item)
        .expect("item must still be in circulation");
    ledger.effects().script_draws([position as u64]);
    let receipt = ledger.issue(caller).unwrap();
    assert_eq!(receipt.item, item);
    receipts.push(receipt);
}
