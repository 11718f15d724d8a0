//! Configuration for a Tessera ledger
//!
//! The ledger itself only needs the set of item ids; the rest of the
//! configuration selects effect handlers.

pub mod ledger;
pub mod traits;

pub use ledger::{EntropyConfig, EntropyMode, LedgerConfig, MAX_ITEMS};
pub use traits::ConfigValidation;
