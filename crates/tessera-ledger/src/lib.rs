//! Tessera Ledger - Fragment Issuance, Retirement and Fusion
//!
//! A fixed set of items, each split into four fragment units. Fragments are
//! issued one at a time to a randomly drawn item still in circulation; an item
//! leaves circulation once its fourth fragment is issued. A holder of all four
//! fragments may retire the set, destroying the units, and then transform the
//! retired item into a single derived unit under a global supply cap.
//!
//! # Architecture
//!
//! - [`CirculationRegistry`]: dense array plus reverse index, swap-and-pop
//! - [`LedgerState`]: single-writer store for counters and per-item facts
//! - [`ReentrancyLock`]: rejects mutating calls made while another is in flight
//! - [`Ledger`]: context object; `issue`, `verify`, `retire`, `transform` and
//!   read-only queries
//!
//! Entropy, ownership, time and event delivery are injected through the
//! [`LedgerEffects`](tessera_core::LedgerEffects) traits.
//!
//! # Example
//!
//! ```ignore
//! let ledger = Ledger::new((1..=5).map(ItemId::new), effects)?;
//! let receipt = ledger.issue(alice)?;
//! ```

#![allow(missing_docs)]
#![forbid(unsafe_code)]

pub mod circulation;
pub mod error;
pub mod fusion;
pub mod guard;
pub mod issuance;
pub mod ledger;
pub mod queries;
pub mod retirement;
pub mod snapshot;
pub mod state;

pub use circulation::{CirculationError, CirculationRegistry, Relocation};
pub use error::{ErrorClass, LedgerError, Result};
pub use fusion::FusionStats;
pub use guard::{Operation, OperationGuard, ReentrancyLock};
pub use issuance::IssueReceipt;
pub use ledger::{Ledger, LedgerBuilder};
pub use queries::ItemView;
pub use snapshot::LedgerSnapshot;
pub use state::{
    FragmentUnit, FusionRecord, FusionSupply, ItemPhase, ItemSet, LedgerState,
    RetirementFact,
};
