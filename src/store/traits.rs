//! Store traits and error types
//!
//! This module defines the dedup store interface used by crawl tasks, the
//! byte-level ledger handle the JSON store persists through, and the
//! associated error types.

use std::io;
use thiserror::Error;

/// Errors that can occur during dedup store operations
///
/// None of these are retried. A caller that gets one back must treat the URL
/// as not recorded.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read visited data: {0}")]
    Read(#[source] io::Error),

    #[error("Failed to decode visited data: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Failed to encode visited data: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Failed to truncate visited data: {0}")]
    Truncate(#[source] io::Error),

    #[error("Failed to write visited data: {0}")]
    Write(#[source] io::Error),

    #[error("Short write of visited data: wrote {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Ledger lock poisoned")]
    Poisoned,
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for the visited-site dedup store
///
/// Implementations are shared between every crawl task, so they must be
/// thread-safe and perform the check-and-mark as a single atomic step.
pub trait DedupStore: Send + Sync {
    /// Reports whether `url` has been visited, marking it visited if not
    ///
    /// Returns `Ok(true)` if the normalized identifier was already present.
    /// Otherwise the identifier is recorded and `Ok(false)` is returned; the
    /// caller is then the only one that will ever see `false` for it.
    fn was_already_visited(&self, url: &str) -> StoreResult<bool>;

    /// Returns the number of distinct identifiers recorded
    fn visited_count(&self) -> StoreResult<usize>;

    /// Returns every recorded identifier in sorted order
    fn visited_sites(&self) -> StoreResult<Vec<String>>;

    /// Drops every recorded identifier
    fn clear(&self) -> StoreResult<()>;
}

/// Byte-level storage a ledger blob is persisted through
///
/// Modeled on a random-access file: the whole blob can be read back,
/// truncated to a length, and overwritten at an offset.
pub trait LedgerHandle: Send {
    /// Reads the whole blob
    fn read_all(&mut self) -> io::Result<Vec<u8>>;

    /// Truncates (or zero-extends) the blob to `size` bytes
    fn truncate(&mut self, size: u64) -> io::Result<()>;

    /// Writes `bytes` starting at `offset`, returning the number written
    fn write_at(&mut self, bytes: &[u8], offset: u64) -> io::Result<usize>;
}

impl<H: LedgerHandle + ?Sized> LedgerHandle for Box<H> {
    fn read_all(&mut self) -> io::Result<Vec<u8>> {
        (**self).read_all()
    }

    fn truncate(&mut self, size: u64) -> io::Result<()> {
        (**self).truncate(size)
    }

    fn write_at(&mut self, bytes: &[u8], offset: u64) -> io::Result<usize> {
        (**self).write_at(bytes, offset)
    }
}
