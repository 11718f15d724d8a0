//! Reentrancy guard for mutating ledger operations
//!
//! Every call into an effect handler is a potential re-entry point. A
//! mutating operation acquires an [`OperationGuard`] before its first read and
//! holds it until it returns; any other mutating operation started meanwhile,
//! from a handler callback or another thread, fails fast instead of observing
//! half-applied state. The guard is released on every exit path by `Drop`.

use crate::error::LedgerError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Mutating ledger operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Issue,
    Retire,
    Transform,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Issue => "issue",
            Operation::Retire => "retire",
            Operation::Transform => "transform",
        };
        f.write_str(name)
    }
}

/// Tracks the single mutating operation allowed in flight
#[derive(Debug, Default)]
pub struct ReentrancyLock {
    active: Mutex<Option<Operation>>,
}

impl ReentrancyLock {
    /// Create an unheld lock
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter `operation`, failing if another operation holds the lock
    pub fn acquire(&self, operation: Operation) -> Result<OperationGuard<'_>, LedgerError> {
        let mut active = self.active.lock();
        if let Some(current) = *active {
            warn!(%current, attempted = %operation, "reentrant ledger call rejected");
            return Err(LedgerError::Reentrancy {
                active: current,
                attempted: operation,
            });
        }
        *active = Some(operation);
        Ok(OperationGuard {
            lock: self,
            operation,
        })
    }

    /// Operation currently holding the lock
    pub fn active(&self) -> Option<Operation> {
        *self.active.lock()
    }
}

/// Scoped hold on a [`ReentrancyLock`]
#[derive(Debug)]
pub struct OperationGuard<'a> {
    lock: &'a ReentrancyLock,
    operation: Operation,
}

impl OperationGuard<'_> {
    /// Operation this guard was acquired for
    pub fn operation(&self) -> Operation {
        self.operation
    }
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        *self.lock.active.lock() = None;
    }
}
