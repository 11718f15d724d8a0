//! Tessera Testing Infrastructure
//!
//! Deterministic effect handlers and fixtures for ledger tests.
//!
//! ```rust,ignore
//! use tessera_testkit::*;
//!
//! #[test]
//! fn my_test() {
//!     init_test_tracing();
//!     let effects = MockEffects::deterministic();
//!     effects.script_draws([0, 0, 0, 0]);
//!     // ... build a ledger over `effects.clone()`
//! }
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(missing_docs)]

pub mod fixtures;
pub mod logging;
pub mod mock_effects;

pub use fixtures::*;
pub use logging::init_test_tracing;
pub use mock_effects::{HookPoint, MockEffects, MOCK_EPOCH_MS};
