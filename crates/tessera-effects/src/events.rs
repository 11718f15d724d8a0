//! Event sink handlers

use parking_lot::Mutex;
use tessera_core::effects::EventEffects;
use tessera_core::LedgerEvent;
use tracing::info;

/// Logs every event through `tracing` and keeps nothing.
#[derive(Debug, Clone, Default)]
pub struct TracingEventHandler;

impl TracingEventHandler {
    /// Create a new tracing event handler
    pub fn new() -> Self {
        Self
    }
}

impl EventEffects for TracingEventHandler {
    fn emit(&self, event: LedgerEvent) {
        match &event {
            LedgerEvent::FragmentIssued {
                caller,
                unit,
                item,
                slot,
            } => info!(%caller, %unit, %item, %slot, "fragment issued"),
            LedgerEvent::RemovedFromCirculation { item, at } => {
                info!(%item, at_ms = at.ts_ms, "item removed from circulation");
            }
            LedgerEvent::SetRetired { caller, item } => info!(%caller, %item, "set retired"),
            LedgerEvent::ItemTransformed {
                caller,
                item,
                fusion,
                at,
            } => info!(%caller, %item, %fusion, at_ms = at.ts_ms, "item transformed"),
        }
    }
}

/// Buffers events in memory for an indexer to drain.
#[derive(Debug, Default)]
pub struct EventLogHandler {
    events: Mutex<Vec<LedgerEvent>>,
    tracing: Option<TracingEventHandler>,
}

impl EventLogHandler {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Also forward every event to [`TracingEventHandler`]
    pub fn with_tracing(mut self) -> Self {
        self.tracing = Some(TracingEventHandler::new());
        self
    }

    /// Copy of every buffered event, oldest first
    pub fn events(&self) -> Vec<LedgerEvent> {
        self.events.lock().clone()
    }

    /// Take every buffered event, oldest first
    pub fn drain(&self) -> Vec<LedgerEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Number of buffered events
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventEffects for EventLogHandler {
    fn emit(&self, event: LedgerEvent) {
        if let Some(tracing) = &self.tracing {
            tracing.emit(event.clone());
        }
        self.events.lock().push(event);
    }
}
