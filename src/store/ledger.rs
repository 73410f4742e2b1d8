//! JSON ledger implementation of the dedup store
//!
//! The visited set is persisted as a JSON document of the form
//! `{"sites": {"<site-id>": true, ...}}` through a [`LedgerHandle`].
//!
//! Every mutation reads the whole blob, updates it, truncates the handle and
//! writes the whole blob back, all under one lock. Cost per call grows with
//! the number of distinct sites, which is fine for single-site crawls but is
//! the first thing to replace (in-memory set with periodic snapshots, or an
//! append-only log) for large ones.

use crate::store::traits::{DedupStore, LedgerHandle, StoreError, StoreResult};
use crate::url::site_id;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Logical content of the ledger blob
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteLedger {
    #[serde(default)]
    pub sites: BTreeMap<String, bool>,
}

impl SiteLedger {
    /// Decodes a ledger blob
    pub fn decode(bytes: &[u8]) -> StoreResult<Self> {
        serde_json::from_slice(bytes).map_err(StoreError::Decode)
    }

    /// Encodes the ledger into its blob form
    pub fn encode(&self) -> StoreResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(StoreError::Encode)
    }
}

/// Dedup store persisting a [`SiteLedger`] through a ledger handle
pub struct JsonLedgerStore {
    handle: Mutex<Box<dyn LedgerHandle>>,
}

impl JsonLedgerStore {
    /// Opens a store over `handle`
    ///
    /// An empty blob is initialized to an empty ledger. A non-empty blob must
    /// decode, otherwise the store refuses to open: its integrity is unknown.
    pub fn open(handle: impl LedgerHandle + 'static) -> StoreResult<Self> {
        let mut handle: Box<dyn LedgerHandle> = Box::new(handle);

        let bytes = handle.read_all().map_err(StoreError::Read)?;
        if bytes.is_empty() {
            write_ledger(handle.as_mut(), &SiteLedger::default(), &bytes)?;
        } else {
            let ledger = SiteLedger::decode(&bytes)?;
            tracing::debug!("Loaded ledger with {} visited sites", ledger.sites.len());
        }

        Ok(Self {
            handle: Mutex::new(handle),
        })
    }

    fn with_handle<T>(
        &self,
        f: impl FnOnce(&mut dyn LedgerHandle) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut handle = self.handle.lock().map_err(|_| StoreError::Poisoned)?;
        f(handle.as_mut())
    }
}

fn read_ledger(handle: &mut dyn LedgerHandle) -> StoreResult<(SiteLedger, Vec<u8>)> {
    let bytes = handle.read_all().map_err(StoreError::Read)?;
    let ledger = SiteLedger::decode(&bytes)?;
    Ok((ledger, bytes))
}

/// Rewrites the whole blob with `ledger`
///
/// `previous` is the blob as last read. If the write fails after the
/// truncate, `previous` is put back so recorded sites survive, and the
/// write error is returned.
fn write_ledger(
    handle: &mut dyn LedgerHandle,
    ledger: &SiteLedger,
    previous: &[u8],
) -> StoreResult<()> {
    let payload = ledger.encode()?;

    handle.truncate(0).map_err(StoreError::Truncate)?;
    if let Err(e) = write_blob(handle, &payload) {
        tracing::error!(error = %e, "Ledger write failed, restoring previous contents");
        if let Err(restore_err) = restore_blob(handle, previous) {
            tracing::error!(error = %restore_err, "Failed to restore ledger contents");
        }
        return Err(e);
    }

    Ok(())
}

fn write_blob(handle: &mut dyn LedgerHandle, payload: &[u8]) -> StoreResult<()> {
    let written = handle.write_at(payload, 0).map_err(StoreError::Write)?;
    if written != payload.len() {
        return Err(StoreError::ShortWrite {
            written,
            expected: payload.len(),
        });
    }
    Ok(())
}

fn restore_blob(handle: &mut dyn LedgerHandle, previous: &[u8]) -> StoreResult<()> {
    handle.truncate(0).map_err(StoreError::Truncate)?;
    write_blob(handle, previous)
}

impl DedupStore for JsonLedgerStore {
    fn was_already_visited(&self, url: &str) -> StoreResult<bool> {
        let id = site_id(url);

        self.with_handle(|handle| {
            let (mut ledger, previous) = read_ledger(handle)?;
            if ledger.sites.contains_key(&id) {
                return Ok(true);
            }

            ledger.sites.insert(id, true);
            write_ledger(handle, &ledger, &previous)?;
            Ok(false)
        })
    }

    fn visited_count(&self) -> StoreResult<usize> {
        self.with_handle(|handle| Ok(read_ledger(handle)?.0.sites.len()))
    }

    fn visited_sites(&self) -> StoreResult<Vec<String>> {
        self.with_handle(|handle| Ok(read_ledger(handle)?.0.sites.into_keys().collect()))
    }

    fn clear(&self) -> StoreResult<()> {
        self.with_handle(|handle| {
            // Raw read: clearing must also work on a blob that no longer decodes
            let previous = handle.read_all().map_err(StoreError::Read)?;
            write_ledger(handle, &SiteLedger::default(), &previous)
        })
    }
}
