//! Admission control for page fetches
//!
//! This module handles:
//! - Bounding the number of pages fetched at once within a chapter
//! - Forcing one-at-a-time access for sites that block parallel clients
//! - Refusing further admissions once a chapter has failed

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Fixed-size gate shared by all page workers of one chapter
///
/// A worker holds its permit for the whole image lookup and download and
/// releases it when the permit is dropped, whatever the outcome.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl AdmissionGate {
    /// Creates a gate admitting `capacity` workers at a time (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Creates the gate for a site, honoring its sequential-only flag
    pub fn for_site(concurrency: usize, sequential_only: bool) -> Self {
        if sequential_only {
            Self::new(1)
        } else {
            Self::new(concurrency)
        }
    }

    /// Waits for a free slot
    ///
    /// # Returns
    ///
    /// * `Some(permit)` - The worker may proceed until the permit is dropped
    /// * `None` - The gate was closed; the worker must not start
    pub async fn admit(&self) -> Option<OwnedSemaphorePermit> {
        self.semaphore.clone().acquire_owned().await.ok()
    }

    /// Stops admitting workers; those already admitted keep running
    pub fn close(&self) {
        self.semaphore.close();
    }

    pub fn is_closed(&self) -> bool {
        self.semaphore.is_closed()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of free slots right now
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}
