//! Time Effect Handlers - Production Only
//!
//! Stateless implementation of `PhysicalTimeEffects` delegating to the system
//! clock. The simulated clock lives in `tessera-testkit`.

use std::time::{SystemTime, UNIX_EPOCH};
use tessera_core::effects::{PhysicalTimeEffects, TimeError};
use tessera_core::PhysicalTime;

/// Real time handler for production use
#[derive(Debug, Clone, Default)]
pub struct SystemTimeHandler;

impl SystemTimeHandler {
    /// Create a new system time handler
    pub fn new() -> Self {
        Self
    }
}

impl PhysicalTimeEffects for SystemTimeHandler {
    #[allow(clippy::disallowed_methods)]
    fn physical_time(&self) -> Result<PhysicalTime, TimeError> {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| TimeError::BeforeEpoch)?;
        let ts_ms = u64::try_from(elapsed.as_millis()).map_err(|_| TimeError::ServiceUnavailable)?;
        Ok(PhysicalTime::from_millis(ts_ms))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn system_time_is_after_2020() {
        let now = SystemTimeHandler::new().physical_time().unwrap();
        assert!(now.ts_ms > 1_577_836_800_000);
    }
}
