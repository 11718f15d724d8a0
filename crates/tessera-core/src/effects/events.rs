//! Event delivery interface
//!
//! Handlers receive each [`LedgerEvent`] after the operation that raised it
//! has committed. Delivery cannot fail the operation.

use crate::events::LedgerEvent;
use std::sync::Arc;

/// Sink for committed ledger events.
pub trait EventEffects: Send + Sync {
    fn emit(&self, event: LedgerEvent);
}

impl<T: EventEffects + ?Sized> EventEffects for Arc<T> {
    fn emit(&self, event: LedgerEvent) {
        (**self).emit(event);
    }
}
