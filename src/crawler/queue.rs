//! Link queue between crawl tasks and the dispatcher
//!
//! The only way onto the queue is [`LinkSink::push`], which reports the
//! discovery to the [`CompletionBarrier`] before the URL is sent. A URL that
//! the dispatcher can see has therefore always been counted.

use crate::crawler::barrier::{BarrierError, CompletionBarrier};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use url::Url;

/// Reasons a push did not reach the queue
#[derive(Debug, Error)]
pub enum PushError {
    #[error(transparent)]
    Barrier(#[from] BarrierError),

    #[error("link queue closed")]
    Closed,
}

/// Sending half of the link queue
#[derive(Debug, Clone)]
pub struct LinkSink {
    sender: UnboundedSender<Url>,
    barrier: Arc<CompletionBarrier>,
    pushed: Arc<AtomicU64>,
}

/// Receiving half of the link queue, owned by the dispatcher
#[derive(Debug)]
pub struct LinkReceiver {
    receiver: UnboundedReceiver<Url>,
}

/// Creates a link queue whose pushes are counted by `barrier`
pub fn link_queue(barrier: Arc<CompletionBarrier>) -> (LinkSink, LinkReceiver) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (
        LinkSink {
            sender,
            barrier,
            pushed: Arc::new(AtomicU64::new(0)),
        },
        LinkReceiver { receiver },
    )
}

impl LinkSink {
    /// Records the discovery of `url` and enqueues it
    pub fn push(&self, url: Url) -> Result<(), PushError> {
        self.barrier.on_discovered()?;
        if self.sender.send(url).is_err() {
            // The dispatcher is gone; nothing will ever run this URL.
            self.barrier.on_finished();
            return Err(PushError::Closed);
        }
        self.pushed.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Total URLs pushed through any clone of this sink
    pub fn pushed(&self) -> u64 {
        self.pushed.load(Ordering::Relaxed)
    }

    pub fn barrier(&self) -> &Arc<CompletionBarrier> {
        &self.barrier
    }
}

impl LinkReceiver {
    /// Waits for the next queued URL
    ///
    /// Returns `None` once every sink has been dropped and the queue is empty.
    pub async fn recv(&mut self) -> Option<Url> {
        self.receiver.recv().await
    }
}
