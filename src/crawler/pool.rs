//! Worker pool bounding concurrent fetches
//!
//! The pool is created once per crawl with a fixed number of worker ids and
//! never resized. A [`WorkerToken`] is the right to run one fetch; dropping
//! it hands the id back and releases the slot, so a token can be returned
//! neither twice nor never.

use std::sync::{Arc, Mutex};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Fixed-size pool of worker tokens
#[derive(Debug, Clone)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    free_ids: Arc<Mutex<Vec<usize>>>,
    capacity: usize,
}

/// Permit to run one fetch, carrying the worker id used in logs
#[derive(Debug)]
pub struct WorkerToken {
    id: usize,
    free_ids: Arc<Mutex<Vec<usize>>>,
    _permit: OwnedSemaphorePermit,
}

impl WorkerPool {
    /// Creates a pool pre-loaded with worker ids `1..=capacity`
    ///
    /// A capacity of zero is bumped to one so the pool can always make
    /// progress.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        // Reversed so ids are handed out lowest first
        let free_ids: Vec<usize> = (1..=capacity).rev().collect();

        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            free_ids: Arc::new(Mutex::new(free_ids)),
            capacity,
        }
    }

    /// Waits until a worker slot is free and takes it
    ///
    /// Returns `None` only once the pool has been closed.
    pub async fn acquire(&self) -> Option<WorkerToken> {
        let permit = self.semaphore.clone().acquire_owned().await.ok()?;
        Some(self.token_for(permit))
    }

    /// Takes a worker slot if one is free right now
    pub fn try_acquire(&self) -> Option<WorkerToken> {
        let permit = self.semaphore.clone().try_acquire_owned().ok()?;
        Some(self.token_for(permit))
    }

    /// Stops handing out tokens; pending and future acquires return `None`
    pub fn close(&self) {
        self.semaphore.close();
    }

    fn token_for(&self, permit: OwnedSemaphorePermit) -> WorkerToken {
        let id = self
            .free_ids
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop()
            .unwrap_or_default();

        WorkerToken {
            id,
            free_ids: self.free_ids.clone(),
            _permit: permit,
        }
    }

    /// Total number of worker slots
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots currently free
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Number of tokens currently held by tasks
    pub fn in_use(&self) -> usize {
        self.capacity - self.available()
    }
}

impl WorkerToken {
    /// Worker id, in `1..=capacity`
    pub fn id(&self) -> usize {
        self.id
    }
}

impl Drop for WorkerToken {
    fn drop(&mut self) {
        // The id goes back before the permit field is dropped, so a waiter
        // woken by the permit always finds an id.
        self.free_ids
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(self.id);
    }
}
