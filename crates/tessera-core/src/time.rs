//! Physical time value type
//!
//! Timestamps are milliseconds since the Unix epoch as reported by a
//! `PhysicalTimeEffects` handler. Nothing in the ledger reads the system clock
//! directly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Wall-clock timestamp in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PhysicalTime {
    /// Milliseconds since the Unix epoch
    pub ts_ms: u64,
}

impl PhysicalTime {
    /// Create from milliseconds
    pub fn from_millis(ts_ms: u64) -> Self {
        Self { ts_ms }
    }

    /// Whole seconds since the Unix epoch
    pub fn as_secs(&self) -> u64 {
        self.ts_ms / 1000
    }
}

impl fmt::Display for PhysicalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.ts_ms)
    }
}
