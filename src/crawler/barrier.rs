//! Completion barrier for a crawl run
//!
//! The barrier tracks how many URLs have been accepted into the link queue
//! (`discovered`) and how many crawl tasks have ended (`finished`). Both
//! counters live in one struct behind one lock. The first time they meet
//! after at least one discovery, the run is complete and the single waiter
//! is woken.
//!
//! Completion is terminal. A discovery reported afterwards is rejected and
//! leaves the counts untouched.

use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::Notify;

/// Snapshot of the barrier counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlCounts {
    /// URLs accepted into the link queue, seed included
    pub discovered: u64,
    /// Crawl tasks that have ended, success or failure
    pub finished: u64,
}

impl CrawlCounts {
    /// URLs accepted but not yet finished
    pub fn outstanding(&self) -> u64 {
        self.discovered.saturating_sub(self.finished)
    }
}

/// Protocol violations reported by the barrier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BarrierError {
    #[error("discovery reported after the crawl completed")]
    AlreadyComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Running,
    Complete,
}

#[derive(Debug)]
struct BarrierState {
    counts: CrawlCounts,
    phase: Phase,
}

/// Shared discovered/finished accounting with a one-shot completion signal
#[derive(Debug)]
pub struct CompletionBarrier {
    state: Mutex<BarrierState>,
    notify: Notify,
}

impl Default for CompletionBarrier {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionBarrier {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BarrierState {
                counts: CrawlCounts::default(),
                phase: Phase::Running,
            }),
            notify: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BarrierState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records one URL accepted into the link queue
    ///
    /// Must be called before the URL becomes visible to the dispatcher.
    pub fn on_discovered(&self) -> Result<(), BarrierError> {
        let mut state = self.lock();
        if state.phase == Phase::Complete {
            tracing::warn!(
                discovered = state.counts.discovered,
                finished = state.counts.finished,
                "Discovery reported after crawl completion, ignoring"
            );
            return Err(BarrierError::AlreadyComplete);
        }
        state.counts.discovered += 1;
        Ok(())
    }

    /// Records one crawl task ending
    ///
    /// Wakes the waiter if this brings `finished` level with `discovered`.
    pub fn on_finished(&self) {
        let mut state = self.lock();
        if state.phase == Phase::Complete {
            tracing::warn!("Task finish reported after crawl completion");
            return;
        }

        state.counts.finished += 1;
        if state.counts.finished > state.counts.discovered {
            tracing::warn!(
                discovered = state.counts.discovered,
                finished = state.counts.finished,
                "More tasks finished than URLs discovered"
            );
        }

        if state.counts.discovered > 0 && state.counts.finished >= state.counts.discovered {
            state.phase = Phase::Complete;
            drop(state);
            // notify_one stores a permit when nobody is waiting yet
            self.notify.notify_one();
        }
    }

    /// Waits until the crawl completes and returns the final counts
    pub async fn wait(&self) -> CrawlCounts {
        loop {
            {
                let state = self.lock();
                if state.phase == Phase::Complete {
                    return state.counts;
                }
            }
            self.notify.notified().await;
        }
    }

    /// Current counters
    pub fn counts(&self) -> CrawlCounts {
        self.lock().counts
    }

    pub fn is_complete(&self) -> bool {
        self.lock().phase == Phase::Complete
    }
}
