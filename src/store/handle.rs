//! Ledger handles backed by memory and by plain files

use crate::store::traits::LedgerHandle;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Ledger blob held in process memory
///
/// Nothing survives the process; this is the default when no ledger path is
/// configured.
#[derive(Debug, Default, Clone)]
pub struct MemoryLedger {
    buf: Vec<u8>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ledger pre-filled with `bytes`
    pub fn with_contents(bytes: impl Into<Vec<u8>>) -> Self {
        Self { buf: bytes.into() }
    }
}

impl LedgerHandle for MemoryLedger {
    fn read_all(&mut self) -> io::Result<Vec<u8>> {
        Ok(self.buf.clone())
    }

    fn truncate(&mut self, size: u64) -> io::Result<()> {
        let size = usize::try_from(size)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "size out of range"))?;
        self.buf.resize(size, 0);
        Ok(())
    }

    fn write_at(&mut self, bytes: &[u8], offset: u64) -> io::Result<usize> {
        let start = usize::try_from(offset)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "offset out of range"))?;
        let end = start
            .checked_add(bytes.len())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "write past end of range"))?;
        if self.buf.len() < end {
            self.buf.resize(end, 0);
        }
        self.buf[start..end].copy_from_slice(bytes);
        Ok(bytes.len())
    }
}

/// Ledger blob stored in a file on disk
#[derive(Debug)]
pub struct FileLedger {
    file: File,
    path: PathBuf,
}

impl FileLedger {
    /// Opens the ledger file at `path`, creating it empty if missing
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerHandle for FileLedger {
    fn read_all(&mut self) -> io::Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.file.seek(SeekFrom::Start(0))?;
        self.file.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    fn truncate(&mut self, size: u64) -> io::Result<()> {
        self.file.set_len(size)
    }

    fn write_at(&mut self, bytes: &[u8], offset: u64) -> io::Result<usize> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(bytes)?;
        self.file.flush()?;
        Ok(bytes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_write_and_truncate() {
        let mut ledger = MemoryLedger::new();
        ledger.write_at(b"hello world", 0).unwrap();
        assert_eq!(ledger.read_all().unwrap(), b"hello world");

        ledger.truncate(5).unwrap();
        assert_eq!(ledger.read_all().unwrap(), b"hello");

        ledger.write_at(b"!", 7).unwrap();
        assert_eq!(ledger.read_all().unwrap(), b"hello\0\0!");
    }

    #[test]
    fn test_memory_write_past_addressable_range() {
        let mut ledger = MemoryLedger::with_contents("abc");
        let err = ledger.write_at(b"xy", u64::MAX).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(ledger.read_all().unwrap(), b"abc");
    }

    #[test]
    fn test_memory_overwrite_in_place() {
        let mut ledger = MemoryLedger::with_contents("abcdef");
        ledger.write_at(b"XY", 2).unwrap();
        assert_eq!(ledger.read_all().unwrap(), b"abXYef");
    }

    #[test]
    fn test_file_creates_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("visited.json");

        let mut ledger = FileLedger::open(&path).unwrap();
        assert!(path.exists());
        assert!(ledger.read_all().unwrap().is_empty());
        assert_eq!(ledger.path(), path.as_path());
    }

    #[test]
    fn test_file_rewrite_shorter_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("visited.json");

        let mut ledger = FileLedger::open(&path).unwrap();
        ledger.write_at(b"a much longer payload", 0).unwrap();
        ledger.truncate(0).unwrap();
        ledger.write_at(b"short", 0).unwrap();

        assert_eq!(ledger.read_all().unwrap(), b"short");
        assert_eq!(std::fs::read(&path).unwrap(), b"short");
    }

    #[test]
    fn test_file_reopen_keeps_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("visited.json");

        {
            let mut ledger = FileLedger::open(&path).unwrap();
            ledger.write_at(b"persisted", 0).unwrap();
        }

        let mut ledger = FileLedger::open(&path).unwrap();
        assert_eq!(ledger.read_all().unwrap(), b"persisted");
    }
}
