//! Physical time effect interface
//!
//! Wall-clock timestamps for retirement facts, fusion records and events.

use crate::time::PhysicalTime;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Error type for time operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum TimeError {
    #[error("Time service unavailable")]
    ServiceUnavailable,
    #[error("Clock before Unix epoch")]
    BeforeEpoch,
}

pub trait PhysicalTimeEffects: Send + Sync {
    fn physical_time(&self) -> Result<PhysicalTime, TimeError>;
}

impl<T: PhysicalTimeEffects + ?Sized> PhysicalTimeEffects for Arc<T> {
    fn physical_time(&self) -> Result<PhysicalTime, TimeError> {
        (**self).physical_time()
    }
}
