//! SQLite ledger handle
//!
//! This module stores the ledger blob inside a SQLite database so the
//! visited set can live alongside other tooling that already speaks SQLite.

use crate::store::schema::initialize_schema;
use crate::store::traits::{LedgerHandle, StoreResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::io;
use std::path::Path;

/// Ledger blob stored in a single-row SQLite table
pub struct SqliteLedger {
    conn: Connection,
}

impl SqliteLedger {
    /// Opens (or creates) the ledger database at `path`
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory ledger database
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn load(&self) -> rusqlite::Result<Vec<u8>> {
        let blob = self
            .conn
            .query_row("SELECT blob FROM ledger WHERE id = 1", [], |row| {
                row.get::<_, Vec<u8>>(0)
            })
            .optional()?;
        Ok(blob.unwrap_or_default())
    }

    fn save(&self, blob: &[u8]) -> rusqlite::Result<()> {
        self.conn.execute(
            "INSERT INTO ledger (id, blob) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET blob = excluded.blob",
            params![blob],
        )?;
        Ok(())
    }
}

fn to_io(e: rusqlite::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e)
}

impl LedgerHandle for SqliteLedger {
    fn read_all(&mut self) -> io::Result<Vec<u8>> {
        self.load().map_err(to_io)
    }

    fn truncate(&mut self, size: u64) -> io::Result<()> {
        let size = usize::try_from(size)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "size out of range"))?;
        let mut blob = self.load().map_err(to_io)?;
        blob.resize(size, 0);
        self.save(&blob).map_err(to_io)
    }

    fn write_at(&mut self, bytes: &[u8], offset: u64) -> io::Result<usize> {
        let start = usize::try_from(offset)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "offset out of range"))?;
        let end = start
            .checked_add(bytes.len())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "write past end of range"))?;

        let mut blob = self.load().map_err(to_io)?;
        if blob.len() < end {
            blob.resize(end, 0);
        }
        blob[start..end].copy_from_slice(bytes);

        self.save(&blob).map_err(to_io)?;
        Ok(bytes.len())
    }
}
