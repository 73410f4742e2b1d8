//! Dedup store module for recording visited sites
//!
//! This module handles the visited-site ledger shared by all crawl tasks:
//! - The `DedupStore` interface with its atomic check-and-mark
//! - The JSON ledger store and its full-rewrite persistence
//! - Ledger handles backed by memory, plain files and SQLite

mod handle;
mod ledger;
mod schema;
mod sqlite;
mod traits;

pub use handle::{FileLedger, MemoryLedger};
pub use ledger::{JsonLedgerStore, SiteLedger};
pub use sqlite::SqliteLedger;
pub use traits::{DedupStore, LedgerHandle, StoreError, StoreResult};

use crate::config::{LedgerBackend, LedgerConfig};
use std::path::Path;

/// Opens the dedup store described by the ledger configuration
///
/// # Arguments
///
/// * `config` - Which backend to use and where it lives
///
/// # Returns
///
/// * `Ok(JsonLedgerStore)` - Store ready for use, prior visits loaded
/// * `Err(StoreError)` - The ledger could not be opened or is corrupt
pub fn open_store(config: &LedgerConfig) -> StoreResult<JsonLedgerStore> {
    match config.backend {
        LedgerBackend::Memory => JsonLedgerStore::open(MemoryLedger::new()),
        LedgerBackend::File => {
            let path = ledger_path(config)?;
            tracing::info!("Using ledger file: {}", path.display());
            let handle = FileLedger::open(path).map_err(StoreError::Read)?;
            JsonLedgerStore::open(handle)
        }
        LedgerBackend::Sqlite => {
            let path = ledger_path(config)?;
            tracing::info!("Using ledger database: {}", path.display());
            JsonLedgerStore::open(SqliteLedger::open(path)?)
        }
    }
}

fn ledger_path(config: &LedgerConfig) -> StoreResult<&Path> {
    config.path.as_deref().map(Path::new).ok_or_else(|| {
        StoreError::Read(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "ledger backend requires a path",
        ))
    })
}
