//! Tessera Effects - Standard Effect Handlers
//!
//! Production implementations of the effect traits defined in `tessera-core`.
//! Deterministic mocks for tests live in `tessera-testkit`.
//!
//! - [`WeakEntropyHandler`]: keyed hash of `(seed, bound, salt)`. Predictable
//!   by anyone who knows the seed; for non-adversarial deployments only.
//! - [`OsEntropyHandler`]: operating system randomness.
//! - [`SystemTimeHandler`]: wall clock.
//! - [`InMemoryOwnershipHandler`]: a minimal ownership registry.
//! - [`EventLogHandler`], [`TracingEventHandler`]: event sinks.
//! - [`EffectSystem`]: composes one handler per trait.

#![forbid(unsafe_code)]

pub mod composite;
pub mod entropy;
pub mod events;
pub mod ownership;
pub mod time;

pub use composite::{EffectSystem, ProductionEffects};
pub use entropy::{ConfiguredEntropy, OsEntropyHandler, WeakEntropyHandler};
pub use events::{EventLogHandler, TracingEventHandler};
pub use ownership::InMemoryOwnershipHandler;
pub use time::SystemTimeHandler;
