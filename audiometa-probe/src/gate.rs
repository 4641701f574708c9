//! Admission gate limiting concurrent probe invocations
//!
//! A counting semaphore with a fixed number of permits. Each admitted request
//! holds one [`AdmissionToken`]; dropping the token returns the slot. Waiters
//! are not cancelled and do not time out. Ordering among waiters is whatever
//! tokio's semaphore provides.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// The gate was closed; never happens while the service is running
#[derive(Debug, Error)]
#[error("Admission gate closed")]
pub struct GateClosed;

/// Fixed-capacity concurrency limiter shared by all requests
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl AdmissionGate {
    /// Create a gate admitting at most `capacity` holders at once
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Wait for a free slot and reserve it
    pub async fn acquire(&self) -> Result<AdmissionToken, GateClosed> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| GateClosed)?;
        Ok(AdmissionToken { _permit: permit })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently free
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Slots currently held
    pub fn in_flight(&self) -> usize {
        self.capacity.saturating_sub(self.available())
    }
}

/// One reserved slot; released exactly once, on drop
#[derive(Debug)]
#[must_use = "the slot is released as soon as the token is dropped"]
pub struct AdmissionToken {
    _permit: OwnedSemaphorePermit,
}

impl AdmissionToken {
    /// Return the slot now rather than at end of scope
    pub fn release(self) {
        drop(self);
    }
}
